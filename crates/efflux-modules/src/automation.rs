//! Tracker module-parameter automation.
//!
//! A pattern step can carry an automation event: a target and a value in
//! percent. The percentage is mapped linearly onto the target's range and
//! written through the voice chain's setters, so automation never bypasses
//! the modules' own bookkeeping (a frequency change still rescales LFO
//! depth).
//!
//! Delay targets map onto their raw control ranges.

use std::fmt;
use std::str::FromStr;

use efflux_core::AudioGraph;

use crate::error::{ModuleError, Result};
use crate::voice::VoiceChain;

/// A parameter automation can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutomationTarget {
    /// Voice bus gain, 0..=1.
    Volume,
    /// Filter base cutoff, 40..=24000 Hz.
    FilterFrequency,
    /// Filter resonance, 0.1..=40.
    FilterQ,
    /// LFO rate, 0.1..=25 Hz.
    FilterLfoSpeed,
    /// LFO depth, 0..=100 % of the base cutoff.
    FilterLfoDepth,
    /// Delay time, 0..=1 s.
    DelayTime,
    /// Delay feedback, 0..=1.
    DelayFeedback,
    /// Delay feedback-path cutoff, 40..=24000 Hz.
    DelayCutoff,
    /// Delay stereo offset, -1..=1 s.
    DelayOffset,
}

impl AutomationTarget {
    /// Every target, in declaration order.
    pub const ALL: [AutomationTarget; 9] = [
        AutomationTarget::Volume,
        AutomationTarget::FilterFrequency,
        AutomationTarget::FilterQ,
        AutomationTarget::FilterLfoSpeed,
        AutomationTarget::FilterLfoDepth,
        AutomationTarget::DelayTime,
        AutomationTarget::DelayFeedback,
        AutomationTarget::DelayCutoff,
        AutomationTarget::DelayOffset,
    ];

    /// Short name, as used in pattern files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            AutomationTarget::Volume => "volume",
            AutomationTarget::FilterFrequency => "filter-freq",
            AutomationTarget::FilterQ => "filter-q",
            AutomationTarget::FilterLfoSpeed => "filter-lfo-speed",
            AutomationTarget::FilterLfoDepth => "filter-lfo-depth",
            AutomationTarget::DelayTime => "delay-time",
            AutomationTarget::DelayFeedback => "delay-feedback",
            AutomationTarget::DelayCutoff => "delay-cutoff",
            AutomationTarget::DelayOffset => "delay-offset",
        }
    }

    /// (min, max) the 0..=100 % range maps onto.
    pub fn range(self) -> (f32, f32) {
        match self {
            AutomationTarget::Volume
            | AutomationTarget::DelayTime
            | AutomationTarget::DelayFeedback => (0.0, 1.0),
            AutomationTarget::FilterFrequency | AutomationTarget::DelayCutoff => (40.0, 24000.0),
            AutomationTarget::FilterQ => (0.1, 40.0),
            AutomationTarget::FilterLfoSpeed => (0.1, 25.0),
            AutomationTarget::FilterLfoDepth => (0.0, 100.0),
            AutomationTarget::DelayOffset => (-1.0, 1.0),
        }
    }
}

impl fmt::Display for AutomationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AutomationTarget {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModuleError::UnknownTarget(s.to_string()))
    }
}

/// One automation step: a target and a value in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationEvent {
    /// Parameter to drive.
    pub target: AutomationTarget,
    /// Position within the target's range, 0..=100. Out-of-range values
    /// are clamped.
    pub percent: f32,
}

impl AutomationEvent {
    /// Creates an event.
    pub fn new(target: AutomationTarget, percent: f32) -> Self {
        Self { target, percent }
    }

    /// The value in the target's own units.
    pub fn scaled_value(&self) -> f32 {
        let (min, max) = self.target.range();
        let t = (self.percent / 100.0).clamp(0.0, 1.0);
        min + t * (max - min)
    }

    /// Writes the event's value into `voice`.
    pub fn apply(&self, voice: &mut VoiceChain, graph: &mut AudioGraph) -> Result<()> {
        let value = self.scaled_value();
        match self.target {
            AutomationTarget::Volume => voice.set_volume(graph, value),
            AutomationTarget::FilterFrequency => voice.filter_mut().set_frequency(graph, value),
            AutomationTarget::FilterQ => voice.filter_mut().set_q(graph, value),
            AutomationTarget::FilterLfoSpeed => voice.filter_mut().set_lfo_speed(graph, value),
            AutomationTarget::FilterLfoDepth => voice.filter_mut().set_lfo_depth(graph, value),
            AutomationTarget::DelayTime => voice.delay_mut().set_delay_time(graph, value),
            AutomationTarget::DelayFeedback => voice.delay_mut().set_feedback(graph, value),
            AutomationTarget::DelayCutoff => voice.delay_mut().set_cutoff(graph, value),
            AutomationTarget::DelayOffset => voice.delay_mut().set_stereo_offset(graph, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::DelayParams;
    use efflux_core::ParamKind;

    fn setup() -> (AudioGraph, VoiceChain) {
        let mut graph = AudioGraph::new(48000.0, 128);
        let sink = graph.destination();
        let voice = VoiceChain::new(&mut graph, sink, DelayParams::default()).unwrap();
        (graph, voice)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= b.abs() * 1e-5 + 1e-6
    }

    #[test]
    fn test_scaling_endpoints() {
        for target in AutomationTarget::ALL {
            let (min, max) = target.range();
            assert_eq!(AutomationEvent::new(target, 0.0).scaled_value(), min);
            assert_eq!(AutomationEvent::new(target, -5.0).scaled_value(), min);
            assert!(close(AutomationEvent::new(target, 100.0).scaled_value(), max));
            assert!(close(AutomationEvent::new(target, 150.0).scaled_value(), max));
        }
    }

    #[test]
    fn test_delay_offset_midpoint_is_zero() {
        let event = AutomationEvent::new(AutomationTarget::DelayOffset, 50.0);
        assert_eq!(event.scaled_value(), 0.0);
    }

    #[test]
    fn test_names_round_trip() {
        for target in AutomationTarget::ALL {
            assert_eq!(target.name().parse::<AutomationTarget>().unwrap(), target);
        }
        assert!(matches!(
            "pitch".parse::<AutomationTarget>(),
            Err(ModuleError::UnknownTarget(_))
        ));
    }

    #[test]
    fn test_filter_frequency_rescales_depth() {
        let (mut graph, mut voice) = setup();
        AutomationEvent::new(AutomationTarget::FilterLfoDepth, 50.0)
            .apply(&mut voice, &mut graph)
            .unwrap();
        AutomationEvent::new(AutomationTarget::FilterFrequency, 100.0)
            .apply(&mut voice, &mut graph)
            .unwrap();

        assert_eq!(voice.filter().frequency(), 24000.0);
        let depth = graph
            .param(voice.filter().lfo_gain_node(), ParamKind::Gain)
            .unwrap();
        assert!((depth - 12000.0).abs() < 1e-2);
    }

    #[test]
    fn test_delay_targets_use_raw_units() {
        let (mut graph, mut voice) = setup();
        AutomationEvent::new(AutomationTarget::DelayFeedback, 25.0)
            .apply(&mut voice, &mut graph)
            .unwrap();
        AutomationEvent::new(AutomationTarget::DelayTime, 10.0)
            .apply(&mut voice, &mut graph)
            .unwrap();

        let params = voice.delay().params();
        assert_eq!(params.feedback, 0.25);
        assert!((params.delay_time - 0.1).abs() < 1e-6);
        assert!(!voice.delay().is_enabled(), "automation never toggles stages");
    }

    #[test]
    fn test_volume() {
        let (mut graph, mut voice) = setup();
        AutomationEvent::new(AutomationTarget::Volume, 40.0)
            .apply(&mut voice, &mut graph)
            .unwrap();
        assert!((voice.volume(&graph).unwrap() - 0.4).abs() < 1e-6);
    }
}
