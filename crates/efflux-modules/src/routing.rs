//! Full-rebuild routing from a voice output to its sink.
//!
//! Every routing change tears down the whole effects path and rebuilds it
//! from the current enable flags. There is no diffing: after
//! [`apply_routing`] exactly one path exists,
//!
//! ```text
//! source ──► [filter] ──► [delay.input … delay.output] ──► output
//! ```
//!
//! visiting every enabled stage once in fixed order and no disabled stage.
//! Connect failures are caller invariant violations (a destroyed node) and
//! are returned as-is, never retried.

use std::fmt;

use efflux_core::{AudioGraph, NodeId};
use tracing::debug;

use crate::delay::DelayModule;
use crate::error::Result;
use crate::filter::FilterModule;

/// A module that can sit in the routing chain.
///
/// Single-port stages return the same node from [`input`](Stage::input)
/// and [`output`](Stage::output).
pub trait Stage {
    /// Node the previous stage connects into.
    fn input(&self) -> NodeId;
    /// Node that forwards to the next stage.
    fn output(&self) -> NodeId;
    /// Whether the stage belongs in the route.
    fn is_enabled(&self) -> bool;
    /// Short name for logs and realized routes.
    fn label(&self) -> &'static str;
}

impl Stage for FilterModule {
    fn input(&self) -> NodeId {
        self.filter_node()
    }

    fn output(&self) -> NodeId {
        self.filter_node()
    }

    fn is_enabled(&self) -> bool {
        FilterModule::is_enabled(self)
    }

    fn label(&self) -> &'static str {
        "filter"
    }
}

impl Stage for DelayModule {
    fn input(&self) -> NodeId {
        DelayModule::input(self)
    }

    fn output(&self) -> NodeId {
        DelayModule::output(self)
    }

    fn is_enabled(&self) -> bool {
        DelayModule::is_enabled(self)
    }

    fn label(&self) -> &'static str {
        "delay"
    }
}

/// The path realized by the last routing pass, as stage labels.
///
/// Always starts with `"source"` and ends with `"output"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route(Vec<&'static str>);

impl Route {
    /// Stage labels in signal order.
    pub fn stages(&self) -> &[&'static str] {
        &self.0
    }

    /// True if the route passes through the stage labelled `label`.
    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|s| *s == label)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" → "))
    }
}

/// Rebuilds the path `voice_output → [filter] → [delay] → final_output`.
///
/// Tears down the voice output, the filter node and the delay's output
/// port, then connects every enabled stage in order.
pub fn apply_routing(
    graph: &mut AudioGraph,
    voice_output: NodeId,
    filter: &FilterModule,
    delay: &DelayModule,
    final_output: NodeId,
) -> Result<Route> {
    let stages: [&dyn Stage; 2] = [filter, delay];
    apply_stages(graph, voice_output, &stages, final_output)
}

/// Rebuilds the path from `voice_output` through the enabled `stages`, in
/// slice order, to `final_output`.
///
/// Every stage's output is disconnected first, enabled or not, so a stage
/// that was just disabled leaves nothing behind.
pub fn apply_stages(
    graph: &mut AudioGraph,
    voice_output: NodeId,
    stages: &[&dyn Stage],
    final_output: NodeId,
) -> Result<Route> {
    graph.disconnect(voice_output)?;
    for stage in stages {
        graph.disconnect(stage.output())?;
    }

    let mut route = vec!["source"];
    let mut previous = voice_output;
    for stage in stages.iter().filter(|s| s.is_enabled()) {
        graph.connect(previous, stage.input())?;
        previous = stage.output();
        route.push(stage.label());
    }
    graph.connect(previous, final_output)?;
    route.push("output");

    let route = Route(route);
    debug!(route = %route, "routing applied");
    Ok(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::DelayParams;
    use crate::factory::{create_delay_module, create_filter_module, create_gain_node};

    struct Fixture {
        graph: AudioGraph,
        voice: NodeId,
        filter: FilterModule,
        delay: DelayModule,
        sink: NodeId,
    }

    fn fixture(filter_on: bool, delay_on: bool) -> Fixture {
        let mut graph = AudioGraph::new(48000.0, 128);
        let voice = create_gain_node(&mut graph);
        let mut filter = create_filter_module(&mut graph).unwrap();
        let mut delay = create_delay_module(&mut graph, DelayParams::default()).unwrap();
        filter.set_enabled(filter_on);
        delay.set_enabled(delay_on);
        let sink = graph.destination();
        Fixture {
            graph,
            voice,
            filter,
            delay,
            sink,
        }
    }

    impl Fixture {
        fn route(&mut self) -> Route {
            apply_routing(
                &mut self.graph,
                self.voice,
                &self.filter,
                &self.delay,
                self.sink,
            )
            .unwrap()
        }
    }

    #[test]
    fn test_both_off_direct() {
        let mut f = fixture(false, false);
        let route = f.route();
        assert_eq!(route.stages(), ["source", "output"]);
        assert_eq!(f.graph.connections_from(f.voice).len(), 1);
        assert!(f.graph.is_connected(f.voice, f.sink));
    }

    #[test]
    fn test_filter_only() {
        let mut f = fixture(true, false);
        let route = f.route();
        assert_eq!(route.stages(), ["source", "filter", "output"]);
        assert!(f.graph.is_connected(f.voice, f.filter.filter_node()));
        assert!(f.graph.is_connected(f.filter.filter_node(), f.sink));
        assert!(!f.graph.is_connected(f.voice, f.sink));
    }

    #[test]
    fn test_delay_only_uses_both_ports() {
        let mut f = fixture(false, true);
        let route = f.route();
        assert_eq!(route.stages(), ["source", "delay", "output"]);
        assert!(f.graph.is_connected(f.voice, f.delay.input()));
        assert!(f.graph.is_connected(f.delay.output(), f.sink));
    }

    #[test]
    fn test_both_on_fixed_order() {
        let mut f = fixture(true, true);
        let route = f.route();
        assert_eq!(route.stages(), ["source", "filter", "delay", "output"]);
        assert!(f.graph.is_connected(f.filter.filter_node(), f.delay.input()));
        assert!(f.graph.is_connected(f.delay.output(), f.sink));
        assert_eq!(route.to_string(), "source → filter → delay → output");
    }

    #[test]
    fn test_disabling_leaves_no_stale_edges() {
        let mut f = fixture(true, true);
        f.route();
        f.filter.set_enabled(false);
        f.delay.set_enabled(false);
        f.route();

        assert!(f.graph.connections_from(f.filter.filter_node()).is_empty());
        assert!(f.graph.connections_from(f.delay.output()).is_empty());
        assert_eq!(f.graph.connections_from(f.voice).len(), 1);
    }

    #[test]
    fn test_repeated_routing_is_stable() {
        let mut f = fixture(true, true);
        let first = f.route();
        let edges = f.graph.edge_count();
        for _ in 0..5 {
            assert_eq!(f.route(), first);
        }
        assert_eq!(f.graph.edge_count(), edges);
    }

    #[test]
    fn test_destroyed_stage_propagates_error() {
        let mut f = fixture(true, false);
        f.graph.remove_node(f.filter.filter_node()).unwrap();
        let result = apply_routing(&mut f.graph, f.voice, &f.filter, &f.delay, f.sink);
        assert!(result.is_err());
    }
}
