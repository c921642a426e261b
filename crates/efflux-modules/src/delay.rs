//! Delay module: a stereo feedback delay with separate input and output ports.
//!
//! ```text
//!          ┌────────────── dry ──────────────┐
//!          │                                 ▼
//!   ──► input ──► feedback delay (wet) ──► output ──►
//! ```
//!
//! Unlike the filter, the delay cannot be a single pass-through node: the
//! routing engine connects into `input` and forwards from `output`. The
//! internal edges are made once at construction and never touched by
//! routing.

use efflux_core::{AudioGraph, DelayType, NodeId, ParamKind};
use tracing::debug;

use crate::error::Result;
use crate::factory::{MAX_DELAY_SECONDS, create_gain_node};

/// Delay configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayParams {
    /// How repeats are fed back.
    pub kind: DelayType,
    /// Delay time in seconds.
    pub delay_time: f32,
    /// Feedback amount, 0..=1.
    pub feedback: f32,
    /// Stereo offset in seconds. Positive delays the right channel further,
    /// negative the left.
    pub stereo_offset: f32,
    /// Feedback-path lowpass cutoff in Hz.
    pub cutoff: f32,
}

impl Default for DelayParams {
    fn default() -> Self {
        Self {
            kind: DelayType::Normal,
            delay_time: 0.5,
            feedback: 0.42,
            stereo_offset: -0.027,
            cutoff: 1200.0,
        }
    }
}

/// Delay configuration plus the stage's enable flag, as stored in a preset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DelaySettings {
    /// Whether the delay stage is in the route.
    pub enabled: bool,
    /// Delay parameters.
    pub params: DelayParams,
}

/// Feedback delay stage.
#[derive(Debug)]
pub struct DelayModule {
    input: NodeId,
    output: NodeId,
    delay: NodeId,
    params: DelayParams,
    enabled: bool,
}

impl DelayModule {
    pub(crate) fn new(graph: &mut AudioGraph, params: DelayParams) -> Result<Self> {
        let input = create_gain_node(graph);
        let output = create_gain_node(graph);
        let delay = graph.add_feedback_delay(MAX_DELAY_SECONDS);

        graph.connect(input, output)?;
        graph.connect(input, delay)?;
        graph.connect(delay, output)?;

        graph.set_delay_type(delay, params.kind)?;
        graph.set_param_immediate(delay, ParamKind::DelayTime, params.delay_time)?;
        graph.set_param_immediate(delay, ParamKind::Feedback, params.feedback)?;
        graph.set_param_immediate(delay, ParamKind::Cutoff, params.cutoff)?;
        graph.set_param_immediate(delay, ParamKind::Offset, params.stereo_offset)?;

        debug!(input = %input, output = %output, ?params, "delay module created");
        Ok(Self {
            input,
            output,
            delay,
            params,
            enabled: false,
        })
    }

    /// Port the previous stage connects into.
    pub fn input(&self) -> NodeId {
        self.input
    }

    /// Port that forwards to the next stage.
    pub fn output(&self) -> NodeId {
        self.output
    }

    /// The feedback delay node between the ports.
    pub fn delay_node(&self) -> NodeId {
        self.delay
    }

    /// Whether the delay stage is in the route.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Only the voice chain flips this, and it always reroutes afterwards.
    /// Parameters are kept either way.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Current parameters.
    pub fn params(&self) -> DelayParams {
        self.params
    }

    /// Sets the delay time in seconds.
    pub fn set_delay_time(&mut self, graph: &mut AudioGraph, seconds: f32) -> Result<()> {
        self.params.delay_time = seconds;
        graph.set_param(self.delay, ParamKind::DelayTime, seconds)?;
        Ok(())
    }

    /// Sets the feedback amount.
    pub fn set_feedback(&mut self, graph: &mut AudioGraph, feedback: f32) -> Result<()> {
        self.params.feedback = feedback;
        graph.set_param(self.delay, ParamKind::Feedback, feedback)?;
        Ok(())
    }

    /// Sets the feedback-path cutoff in Hz.
    pub fn set_cutoff(&mut self, graph: &mut AudioGraph, cutoff: f32) -> Result<()> {
        self.params.cutoff = cutoff;
        graph.set_param(self.delay, ParamKind::Cutoff, cutoff)?;
        Ok(())
    }

    /// Sets the stereo offset in seconds.
    pub fn set_stereo_offset(&mut self, graph: &mut AudioGraph, seconds: f32) -> Result<()> {
        self.params.stereo_offset = seconds;
        graph.set_param(self.delay, ParamKind::Offset, seconds)?;
        Ok(())
    }

    /// Sets how repeats are fed back.
    pub fn set_delay_type(&mut self, graph: &mut AudioGraph, kind: DelayType) -> Result<()> {
        self.params.kind = kind;
        graph.set_delay_type(self.delay, kind)?;
        Ok(())
    }

    /// Applies every parameter.
    pub fn apply_params(&mut self, graph: &mut AudioGraph, params: &DelayParams) -> Result<()> {
        self.set_delay_type(graph, params.kind)?;
        self.set_delay_time(graph, params.delay_time)?;
        self.set_feedback(graph, params.feedback)?;
        self.set_cutoff(graph, params.cutoff)?;
        self.set_stereo_offset(graph, params.stereo_offset)
    }

    /// Removes every node the module owns.
    pub(crate) fn destroy(self, graph: &mut AudioGraph) -> Result<()> {
        graph.remove_node(self.delay)?;
        graph.remove_node(self.input)?;
        graph.remove_node(self.output)?;
        Ok(())
    }
}
