//! Stereo feedback delay with a lowpass in the loop and a stereo offset.
//!
//! The kernel behind feedback delay nodes. It produces only the wet signal;
//! dry/wet balance is built with gain nodes around it.
//!
//! Per sample:
//!
//! ```text
//! wet_l = lowpass(delay_l.read(time + max(-offset, 0)))
//! wet_r = lowpass(delay_r.read(time + max(offset, 0)))
//! delay_l.write(in_l ± feedback * wet_x)
//! delay_r.write(in_r ± feedback * wet_y)
//! ```
//!
//! where the sign and channel crossing depend on [`DelayType`].

use crate::biquad::{Biquad, lowpass_coefficients};
use crate::delay::InterpolatedDelay;
use crate::math::{flush_denormal, seconds_to_samples};

/// Q of the feedback-path lowpass (Butterworth).
const LOOP_FILTER_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// Largest stereo offset (either sign) the delay lines have headroom for.
pub const MAX_OFFSET_SECONDS: f32 = 1.0;

/// How the delayed signal is fed back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DelayType {
    /// Each channel feeds back into itself.
    #[default]
    Normal,
    /// Like `Normal`, with the feedback polarity flipped on every repeat.
    Inverted,
    /// Input enters the left line, repeats alternate between channels.
    PingPong,
}

impl DelayType {
    /// Every delay type, in declaration order.
    pub const ALL: [DelayType; 3] = [DelayType::Normal, DelayType::Inverted, DelayType::PingPong];

    /// Lowercase name, as used in preset files.
    pub fn name(self) -> &'static str {
        match self {
            DelayType::Normal => "normal",
            DelayType::Inverted => "inverted",
            DelayType::PingPong => "pingpong",
        }
    }

    /// Parses a name produced by [`name()`](Self::name), case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Maps a numeric type selector (0, 1, 2) to a delay type.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }
}

impl core::fmt::Display for DelayType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Stereo feedback delay kernel.
///
/// # Example
///
/// ```rust
/// use efflux_core::{DelayType, FeedbackDelay};
///
/// let mut delay = FeedbackDelay::new(48000.0, 2.0);
/// delay.set_delay_type(DelayType::PingPong);
/// let (wet_l, wet_r) = delay.process(1.0, 1.0, 0.25, 0.4, 1200.0, 0.0);
/// assert_eq!((wet_l, wet_r), (0.0, 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct FeedbackDelay {
    line_l: InterpolatedDelay,
    line_r: InterpolatedDelay,
    filter_l: Biquad,
    filter_r: Biquad,
    delay_type: DelayType,
    sample_rate: f32,
    /// Cutoff the loop filters were last designed for.
    designed_cutoff: f32,
}

impl FeedbackDelay {
    /// Creates a delay that can hold up to `max_seconds` plus
    /// [`MAX_OFFSET_SECONDS`] of stereo offset.
    pub fn new(sample_rate: f32, max_seconds: f32) -> Self {
        let capacity = max_seconds + MAX_OFFSET_SECONDS;
        Self {
            line_l: InterpolatedDelay::from_time(sample_rate, capacity),
            line_r: InterpolatedDelay::from_time(sample_rate, capacity),
            filter_l: Biquad::new(),
            filter_r: Biquad::new(),
            delay_type: DelayType::Normal,
            sample_rate,
            designed_cutoff: f32::NAN,
        }
    }

    /// Current delay type.
    pub fn delay_type(&self) -> DelayType {
        self.delay_type
    }

    /// Changes how repeats are fed back. The delay lines are kept.
    pub fn set_delay_type(&mut self, delay_type: DelayType) {
        self.delay_type = delay_type;
    }

    /// Processes one stereo frame and returns the wet signal.
    ///
    /// # Arguments
    ///
    /// * `delay_seconds` - Base delay time
    /// * `feedback` - Amount of the wet signal written back (0..=1)
    /// * `cutoff` - Feedback-path lowpass cutoff in Hz
    /// * `offset_seconds` - Positive delays the right channel further,
    ///   negative delays the left channel further
    #[inline]
    pub fn process(
        &mut self,
        left: f32,
        right: f32,
        delay_seconds: f32,
        feedback: f32,
        cutoff: f32,
        offset_seconds: f32,
    ) -> (f32, f32) {
        self.design_loop_filter(cutoff);

        let delay_l = seconds_to_samples(delay_seconds + (-offset_seconds).max(0.0), self.sample_rate);
        let delay_r = seconds_to_samples(delay_seconds + offset_seconds.max(0.0), self.sample_rate);

        let wet_l = self.filter_l.process(self.line_l.read(delay_l - 1.0));
        let wet_r = self.filter_r.process(self.line_r.read(delay_r - 1.0));

        let feedback = feedback.clamp(0.0, 1.0);
        let (write_l, write_r) = match self.delay_type {
            DelayType::Normal => (left + wet_l * feedback, right + wet_r * feedback),
            DelayType::Inverted => (left - wet_l * feedback, right - wet_r * feedback),
            DelayType::PingPong => ((left + right) * 0.5 + wet_r * feedback, wet_l * feedback),
        };
        self.line_l.write(flush_denormal(write_l));
        self.line_r.write(flush_denormal(write_r));

        (wet_l, wet_r)
    }

    /// Clears delay lines and filter state.
    pub fn clear(&mut self) {
        self.line_l.clear();
        self.line_r.clear();
        self.filter_l.clear();
        self.filter_r.clear();
    }

    fn design_loop_filter(&mut self, cutoff: f32) {
        let cutoff = cutoff.clamp(10.0, self.sample_rate * 0.49);
        if (cutoff - self.designed_cutoff).abs() < 0.01 {
            return;
        }
        let coeffs = lowpass_coefficients(cutoff, LOOP_FILTER_Q, self.sample_rate);
        self.filter_l.set_coefficient_tuple(coeffs);
        self.filter_r.set_coefficient_tuple(coeffs);
        self.designed_cutoff = cutoff;
    }
}
