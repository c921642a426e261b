//! Per-instrument voice chain.
//!
//! A [`VoiceChain`] owns the voice output bus, the filter and delay modules
//! and a fixed sink. Note sources connect into the bus; the bus feeds the
//! effects path. The chain is the only place the stage enable flags change,
//! and every change that affects routing re-runs the full rebuild.

use efflux_core::{AudioGraph, NodeId, ParamKind};
use tracing::debug;

use crate::delay::{DelayModule, DelayParams, DelaySettings};
use crate::error::Result;
use crate::factory::{create_delay_module, create_filter_module, create_gain_node};
use crate::filter::{FilterModule, FilterSettings};
use crate::routing::{Route, apply_routing};

/// Voice output bus → filter → delay → sink, with stage toggles.
#[derive(Debug)]
pub struct VoiceChain {
    output: NodeId,
    sink: NodeId,
    filter: FilterModule,
    delay: DelayModule,
    route: Route,
}

impl VoiceChain {
    /// Builds the modules and routes the bus straight to `sink`.
    pub fn new(graph: &mut AudioGraph, sink: NodeId, delay_params: DelayParams) -> Result<Self> {
        let output = create_gain_node(graph);
        let filter = create_filter_module(graph)?;
        let delay = create_delay_module(graph, delay_params)?;
        let route = apply_routing(graph, output, &filter, &delay, sink)?;
        Ok(Self {
            output,
            sink,
            filter,
            delay,
            route,
        })
    }

    /// The voice output bus note sources connect into.
    pub fn output(&self) -> NodeId {
        self.output
    }

    /// The sink the chain ends in.
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    /// The filter module.
    pub fn filter(&self) -> &FilterModule {
        &self.filter
    }

    /// The filter module, for parameter changes and LFO toggles.
    pub fn filter_mut(&mut self) -> &mut FilterModule {
        &mut self.filter
    }

    /// The delay module.
    pub fn delay(&self) -> &DelayModule {
        &self.delay
    }

    /// The delay module, for parameter changes.
    pub fn delay_mut(&mut self) -> &mut DelayModule {
        &mut self.delay
    }

    /// The route realized by the last rebuild.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Puts the filter stage in or out of the route.
    pub fn set_filter_enabled(&mut self, graph: &mut AudioGraph, enabled: bool) -> Result<()> {
        if self.filter.is_enabled() == enabled {
            return Ok(());
        }
        self.filter.set_enabled(enabled);
        self.rebuild(graph)
    }

    /// Puts the delay stage in or out of the route. Parameters are kept.
    pub fn set_delay_enabled(&mut self, graph: &mut AudioGraph, enabled: bool) -> Result<()> {
        if self.delay.is_enabled() == enabled {
            return Ok(());
        }
        self.delay.set_enabled(enabled);
        self.rebuild(graph)
    }

    /// Connects or disconnects the filter LFO. Routing is unaffected.
    pub fn set_lfo_enabled(&mut self, graph: &mut AudioGraph, enabled: bool) -> Result<()> {
        self.filter.toggle_lfo(graph, enabled)
    }

    /// Sets the voice bus gain.
    pub fn set_volume(&mut self, graph: &mut AudioGraph, volume: f32) -> Result<()> {
        graph.set_param(self.output, ParamKind::Gain, volume)?;
        Ok(())
    }

    /// Voice bus gain.
    pub fn volume(&self, graph: &AudioGraph) -> Result<f32> {
        Ok(graph.param(self.output, ParamKind::Gain)?)
    }

    /// Applies filter parameters, LFO state and the filter enable flag.
    pub fn apply_filter_settings(
        &mut self,
        graph: &mut AudioGraph,
        settings: &FilterSettings,
    ) -> Result<()> {
        self.filter.apply_settings(graph, settings)?;
        self.set_filter_enabled(graph, settings.enabled)
    }

    /// Applies delay parameters and the delay enable flag.
    pub fn apply_delay_settings(
        &mut self,
        graph: &mut AudioGraph,
        settings: &DelaySettings,
    ) -> Result<()> {
        self.delay.apply_params(graph, &settings.params)?;
        self.set_delay_enabled(graph, settings.enabled)
    }

    /// Connects a started note source into the voice bus.
    pub fn attach_source(&self, graph: &mut AudioGraph, source: NodeId) -> Result<()> {
        graph.connect(source, self.output)?;
        Ok(())
    }

    /// Disconnects a note source from the voice bus.
    pub fn detach_source(&self, graph: &mut AudioGraph, source: NodeId) -> Result<()> {
        graph.disconnect_from(source, self.output)?;
        Ok(())
    }

    /// Re-derives the whole route from the current flags.
    pub fn rebuild(&mut self, graph: &mut AudioGraph) -> Result<()> {
        self.route = apply_routing(graph, self.output, &self.filter, &self.delay, self.sink)?;
        Ok(())
    }

    /// Removes every node the chain owns. Attached sources and the sink stay.
    pub fn teardown(self, graph: &mut AudioGraph) -> Result<()> {
        graph.remove_node(self.output)?;
        self.filter.destroy(graph)?;
        self.delay.destroy(graph)?;
        debug!("voice chain torn down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use efflux_core::Waveform;

    fn setup() -> (AudioGraph, VoiceChain) {
        let mut graph = AudioGraph::new(48000.0, 128);
        let sink = graph.destination();
        let voice = VoiceChain::new(&mut graph, sink, DelayParams::default()).unwrap();
        (graph, voice)
    }

    #[test]
    fn test_initial_route_is_direct() {
        let (graph, voice) = setup();
        assert_eq!(voice.route().stages(), ["source", "output"]);
        assert!(graph.is_connected(voice.output(), voice.sink()));
    }

    #[test]
    fn test_toggles_rebuild_route() {
        let (mut graph, mut voice) = setup();
        voice.set_filter_enabled(&mut graph, true).unwrap();
        assert_eq!(voice.route().stages(), ["source", "filter", "output"]);

        voice.set_delay_enabled(&mut graph, true).unwrap();
        assert_eq!(voice.route().stages(), ["source", "filter", "delay", "output"]);

        voice.set_filter_enabled(&mut graph, false).unwrap();
        assert_eq!(voice.route().stages(), ["source", "delay", "output"]);
    }

    #[test]
    fn test_delay_toggle_keeps_filter_params() {
        let (mut graph, mut voice) = setup();
        voice.set_filter_enabled(&mut graph, true).unwrap();
        voice.filter_mut().set_frequency(&mut graph, 1234.0).unwrap();
        voice.filter_mut().set_q(&mut graph, 3.0).unwrap();

        voice.set_delay_enabled(&mut graph, true).unwrap();
        let filter = voice.filter().filter_node();
        assert_eq!(graph.param(filter, ParamKind::Frequency), Ok(1234.0));
        assert_eq!(graph.param(filter, ParamKind::Q), Ok(3.0));
        assert!(graph.is_connected(filter, voice.delay().input()));
    }

    #[test]
    fn test_apply_settings() {
        let (mut graph, mut voice) = setup();
        let filter = FilterSettings {
            enabled: true,
            lfo: Some(Waveform::Sine),
            ..FilterSettings::default()
        };
        let delay = DelaySettings {
            enabled: true,
            params: DelayParams {
                delay_time: 0.3,
                ..DelayParams::default()
            },
        };
        voice.apply_filter_settings(&mut graph, &filter).unwrap();
        voice.apply_delay_settings(&mut graph, &delay).unwrap();

        assert!(voice.filter().is_lfo_enabled());
        assert!(voice.route().contains("filter"));
        assert!(voice.route().contains("delay"));
        assert_eq!(voice.delay().params().delay_time, 0.3);
    }

    #[test]
    fn test_sources_attach_and_detach() {
        let (mut graph, voice) = setup();
        let osc = graph.add_oscillator(Waveform::Sawtooth);
        graph.start(osc, 0.0).unwrap();
        voice.attach_source(&mut graph, osc).unwrap();
        assert!(graph.is_connected(osc, voice.output()));

        voice.detach_source(&mut graph, osc).unwrap();
        assert!(!graph.is_connected(osc, voice.output()));
    }

    #[test]
    fn test_volume() {
        let (mut graph, mut voice) = setup();
        voice.set_volume(&mut graph, 0.25).unwrap();
        assert_eq!(voice.volume(&graph).unwrap(), 0.25);
    }

    #[test]
    fn test_teardown_leaves_only_sink() {
        let (mut graph, mut voice) = setup();
        voice.set_filter_enabled(&mut graph, true).unwrap();
        voice.set_delay_enabled(&mut graph, true).unwrap();
        voice.teardown(&mut graph).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }
}
