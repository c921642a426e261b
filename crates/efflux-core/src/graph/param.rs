//! Node control parameters.
//!
//! Every node exposes a fixed set of [`ParamKind`]s. A parameter has a base
//! value written by the control layer and smoothed per sample, plus any
//! number of modulation edges whose signals are added on top. The sum is
//! clamped to the parameter's range.

use crate::param::SmoothedParam;

/// A control input on a graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Linear gain (gain nodes).
    Gain,
    /// Boost/cut in dB (shelf and peaking filters).
    GainDb,
    /// Frequency in Hz (filter cutoff/center, oscillator pitch).
    Frequency,
    /// Detune in cents, applied on top of `Frequency`.
    Detune,
    /// Filter resonance / bandwidth.
    Q,
    /// Delay time in seconds.
    DelayTime,
    /// Feedback amount, 0..=1.
    Feedback,
    /// Feedback-path lowpass cutoff in Hz.
    Cutoff,
    /// Stereo offset in seconds; the sign picks the channel delayed further.
    Offset,
}

impl ParamKind {
    /// Lowercase name for logs and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ParamKind::Gain => "gain",
            ParamKind::GainDb => "gain_db",
            ParamKind::Frequency => "frequency",
            ParamKind::Detune => "detune",
            ParamKind::Q => "q",
            ParamKind::DelayTime => "delay_time",
            ParamKind::Feedback => "feedback",
            ParamKind::Cutoff => "cutoff",
            ParamKind::Offset => "offset",
        }
    }

    /// Nominal (default, min, max) for this kind.
    pub(crate) fn nominal(self) -> (f32, f32, f32) {
        match self {
            ParamKind::Gain => (1.0, f32::MIN, f32::MAX),
            ParamKind::GainDb => (0.0, -40.0, 40.0),
            ParamKind::Frequency => (440.0, 0.0, 24000.0),
            ParamKind::Detune => (0.0, -4800.0, 4800.0),
            ParamKind::Q => (1.0, 0.0001, 1000.0),
            ParamKind::DelayTime => (0.0, 0.0, 1.0),
            ParamKind::Feedback => (0.0, 0.0, 1.0),
            ParamKind::Cutoff => (1200.0, 10.0, 24000.0),
            ParamKind::Offset => (0.0, -1.0, 1.0),
        }
    }
}

impl core::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A parameter slot on a node.
#[derive(Debug, Clone)]
pub(crate) struct AudioParam {
    pub kind: ParamKind,
    value: SmoothedParam,
    min: f32,
    max: f32,
}

impl AudioParam {
    /// Creates a parameter at the kind's nominal default.
    pub fn new(kind: ParamKind, sample_rate: f32) -> Self {
        let (default, min, max) = kind.nominal();
        Self {
            kind,
            value: SmoothedParam::standard(default, sample_rate),
            min,
            max,
        }
    }

    /// Overrides the default value (snapped, no smoothing).
    pub fn with_default(mut self, value: f32) -> Self {
        self.value.set_immediate(value.clamp(self.min, self.max));
        self
    }

    /// Overrides the upper bound.
    pub fn with_max(mut self, max: f32) -> Self {
        self.max = max;
        self
    }

    /// The base value last written (the smoothing target).
    pub fn value(&self) -> f32 {
        self.value.target()
    }

    /// Writes a new base value, clamped to the range.
    pub fn set_value(&mut self, value: f32) {
        self.value.set_target(value.clamp(self.min, self.max));
    }

    /// Advances smoothing and returns base + `modulation`, clamped.
    #[inline]
    pub fn next(&mut self, modulation: f32) -> f32 {
        (self.value.advance() + modulation).clamp(self.min, self.max)
    }

    /// Jumps to the base value.
    pub fn snap(&mut self) {
        self.value.snap_to_target();
    }
}
