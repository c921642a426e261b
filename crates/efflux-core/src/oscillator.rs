//! One-shot oscillator for sources and low-frequency modulation.
//!
//! An [`Oscillator`] is a phase accumulator with a lifecycle:
//!
//! ```text
//! Unstarted --start(t)--> Running --stop(t)--> Stopped
//! ```
//!
//! Both transitions happen at most once. A stopped oscillator is spent: it
//! outputs silence forever and cannot be restarted. Code that needs the
//! source again must allocate a fresh oscillator.

use core::f32::consts::PI;
use libm::sinf;

/// Oscillator waveform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// Pure sine.
    #[default]
    Sine,
    /// Bipolar square, +1 for the first half of the cycle.
    Square,
    /// Rising ramp from -1 to +1.
    Sawtooth,
    /// Linear ramps between -1 and +1.
    Triangle,
}

impl Waveform {
    /// Every waveform, in declaration order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    /// Lowercase name, as used in preset files.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }

    /// Parses a name produced by [`name()`](Self::name), case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|w| w.name().eq_ignore_ascii_case(name))
    }

    /// Evaluates the waveform at `phase` in [0, 1).
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => sinf(phase * 2.0 * PI),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }
        }
    }
}

impl core::fmt::Display for Waveform {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle state of an [`Oscillator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OscillatorState {
    /// Created, never started. Outputs silence.
    Unstarted,
    /// Started. Outputs the waveform from its start frame on.
    Running,
    /// Stop requested. Terminal: outputs silence from its stop frame on.
    Stopped,
}

/// Phase-accumulating oscillator with one-shot start/stop.
///
/// Start and stop are scheduled in frames on the owning graph's clock; the
/// state changes as soon as the call is made, the audible effect happens at
/// the scheduled frame.
#[derive(Debug, Clone)]
pub struct Oscillator {
    phase: f32,
    sample_rate: f32,
    waveform: Waveform,
    state: OscillatorState,
    start_frame: u64,
    stop_frame: u64,
}

impl Oscillator {
    /// Creates an unstarted oscillator.
    pub fn new(sample_rate: f32, waveform: Waveform) -> Self {
        Self {
            phase: 0.0,
            sample_rate,
            waveform,
            state: OscillatorState::Unstarted,
            start_frame: 0,
            stop_frame: u64::MAX,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> OscillatorState {
        self.state
    }

    /// Current waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Changes the waveform without resetting phase.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Schedules the start. Returns `false` unless the oscillator is unstarted.
    pub fn start(&mut self, frame: u64) -> bool {
        if self.state != OscillatorState::Unstarted {
            return false;
        }
        self.state = OscillatorState::Running;
        self.start_frame = frame;
        true
    }

    /// Schedules the stop. Returns `false` unless the oscillator is running.
    pub fn stop(&mut self, frame: u64) -> bool {
        if self.state != OscillatorState::Running {
            return false;
        }
        self.state = OscillatorState::Stopped;
        self.stop_frame = frame.max(self.start_frame);
        true
    }

    /// True if the oscillator produces sound at `frame`.
    #[inline]
    pub fn is_sounding(&self, frame: u64) -> bool {
        self.state != OscillatorState::Unstarted
            && frame >= self.start_frame
            && frame < self.stop_frame
    }

    /// Produces the sample for `frame` at `frequency` Hz and advances phase.
    ///
    /// Outside the sounding window the output is 0 and phase holds.
    #[inline]
    pub fn next(&mut self, frame: u64, frequency: f32) -> f32 {
        if !self.is_sounding(frame) {
            return 0.0;
        }
        let output = self.waveform.sample(self.phase);
        self.phase += frequency / self.sample_rate;
        self.phase -= libm::floorf(self.phase);
        output
    }

    /// Updates the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }
}
