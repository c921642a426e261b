//! Node factory: primitive nodes with engine defaults, and the two modules.
//!
//! Everything that allocates graph nodes for a voice goes through here, so
//! default parameter values live in one place. Modules are built once per
//! voice; routing never calls back into the factory.

use efflux_core::{AudioGraph, FilterType, NodeId, OscillatorState, ParamKind, Waveform};

use crate::delay::{DelayModule, DelayParams};
use crate::error::Result;
use crate::filter::FilterModule;

/// Base cutoff of a new filter node, in Hz.
pub const DEFAULT_FILTER_FREQUENCY: f32 = 880.0;
/// Resonance of a new filter node.
pub const DEFAULT_FILTER_Q: f32 = 5.0;
/// Response of a new filter node.
pub const DEFAULT_FILTER_TYPE: FilterType = FilterType::Lowpass;
/// Rate of a new filter LFO, in Hz.
pub const DEFAULT_LFO_SPEED: f32 = 0.1;
/// Depth of a new filter LFO, in percent of the base cutoff.
pub const DEFAULT_LFO_DEPTH: f32 = 60.0;
/// Waveform of a new filter LFO.
pub const DEFAULT_LFO_WAVEFORM: Waveform = Waveform::Sine;
/// Longest delay time a delay module accepts, in seconds.
pub const MAX_DELAY_SECONDS: f32 = 1.0;

/// Creates a unity gain node.
pub fn create_gain_node(graph: &mut AudioGraph) -> NodeId {
    graph.add_gain()
}

/// Creates a plain delay node sized for `max_seconds` and set to delay by
/// exactly that much.
pub fn create_delay_node(graph: &mut AudioGraph, max_seconds: f32) -> Result<NodeId> {
    let delay = graph.add_delay(max_seconds);
    graph.set_param_immediate(delay, ParamKind::DelayTime, max_seconds)?;
    Ok(delay)
}

/// Creates a filter node at the default type, cutoff and Q.
pub fn create_filter_node(graph: &mut AudioGraph) -> Result<NodeId> {
    let filter = graph.add_filter(DEFAULT_FILTER_TYPE);
    graph.set_param_immediate(filter, ParamKind::Frequency, DEFAULT_FILTER_FREQUENCY)?;
    graph.set_param_immediate(filter, ParamKind::Q, DEFAULT_FILTER_Q)?;
    Ok(filter)
}

/// Creates an unstarted oscillator.
pub fn create_oscillator(graph: &mut AudioGraph, waveform: Waveform) -> NodeId {
    graph.add_oscillator(waveform)
}

/// Starts an oscillator now.
///
/// Fails if the oscillator was already started; a one-shot source cannot be
/// started twice.
pub fn start_oscillation(graph: &mut AudioGraph, oscillator: NodeId) -> Result<()> {
    let now = graph.current_time();
    graph.start(oscillator, now)?;
    Ok(())
}

/// Stops an oscillator now if it is running. Returns whether it was.
///
/// Stopping spends the oscillator for good.
pub fn stop_oscillation(graph: &mut AudioGraph, oscillator: NodeId) -> Result<bool> {
    if graph.oscillator_state(oscillator)? != OscillatorState::Running {
        return Ok(false);
    }
    let now = graph.current_time();
    graph.stop(oscillator, now)?;
    Ok(true)
}

/// Creates a filter module with its LFO wired to the cutoff and already
/// oscillating, both enable flags off.
pub fn create_filter_module(graph: &mut AudioGraph) -> Result<FilterModule> {
    FilterModule::new(graph)
}

/// Creates a delay module configured with `params`, disabled.
pub fn create_delay_module(graph: &mut AudioGraph, params: DelayParams) -> Result<DelayModule> {
    DelayModule::new(graph, params)
}
