//! Audio graph mutation, cycle detection and block rendering.
//!
//! [`AudioGraph`] owns the node arena and edge list, validates every
//! mutation, and renders blocks by walking the nodes in topological order.
//! The order is recomputed lazily on the first render after a topology
//! change, and that render fades from the last frame actually output over
//! ~5ms so a reconnection does not click.

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec, vec::Vec};

use crate::biquad::FilterType;
use crate::feedback_delay::DelayType;
use crate::oscillator::{OscillatorState, Waveform};
use crate::param::SmoothedParam;

use super::buffer::StereoBuffer;
use super::edge::{Edge, EdgeId, EdgeTarget};
use super::node::{NodeData, NodeId, NodeKind};
use super::param::ParamKind;
use super::processor::{MAX_PARAMS, Processor, RenderContext};

/// Errors that can occur during graph operations.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// The node does not exist (never created, or removed).
    NodeNotFound(NodeId),
    /// The edge does not exist.
    EdgeNotFound(EdgeId),
    /// No audio edge runs between these nodes.
    NotConnected(NodeId, NodeId),
    /// Adding this edge would create a cycle.
    CycleDetected,
    /// The same edge already exists.
    DuplicateEdge(NodeId, NodeId),
    /// The connection is structurally invalid (e.g. out of the destination).
    InvalidConnection(String),
    /// The node does not expose this parameter.
    UnknownParam(NodeId, ParamKind),
    /// The operation is not legal in the node's current state.
    InvalidState(NodeId, &'static str),
    /// The operation needs a different kind of node.
    WrongKind {
        /// Node the operation was applied to.
        node: NodeId,
        /// Kind the operation requires.
        expected: NodeKind,
        /// Kind the node actually has.
        found: NodeKind,
    },
}

#[cfg(feature = "std")]
impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node {id} not found"),
            Self::EdgeNotFound(id) => write!(f, "edge {id} not found"),
            Self::NotConnected(a, b) => write!(f, "{a} is not connected to {b}"),
            Self::CycleDetected => write!(f, "adding this edge would create a cycle"),
            Self::DuplicateEdge(a, b) => write!(f, "edge from {a} to {b} already exists"),
            Self::InvalidConnection(msg) => write!(f, "invalid connection: {msg}"),
            Self::UnknownParam(id, param) => write!(f, "{id} has no '{param}' parameter"),
            Self::InvalidState(id, msg) => write!(f, "invalid state for {id}: {msg}"),
            Self::WrongKind {
                node,
                expected,
                found,
            } => write!(f, "{node} is a {found} node, expected {expected}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GraphError {}

/// Directed acyclic audio graph with modulation edges.
///
/// # Usage
///
/// 1. Create a graph with [`new()`](Self::new); it already holds the
///    [`destination()`](Self::destination) sink
/// 2. Add nodes: [`add_gain()`](Self::add_gain), [`add_delay()`](Self::add_delay),
///    [`add_feedback_delay()`](Self::add_feedback_delay),
///    [`add_filter()`](Self::add_filter), [`add_oscillator()`](Self::add_oscillator)
/// 3. Connect: [`connect()`](Self::connect) for audio,
///    [`connect_param()`](Self::connect_param) for modulation
/// 4. Render: [`render_block()`](Self::render_block)
pub struct AudioGraph {
    nodes: Vec<Option<NodeData>>,
    edges: Vec<Option<Edge>>,
    /// Last rendered block per node slot.
    outputs: Vec<StereoBuffer>,
    destination: NodeId,
    sample_rate: f32,
    block_size: usize,
    /// Render clock in frames.
    frame: u64,
    /// Topological order of live node slots.
    order: Vec<usize>,
    /// Topology changed since `order` was computed.
    dirty: bool,
    rendered: bool,
    input_scratch: StereoBuffer,
    modulation_scratch: Vec<Vec<f32>>,
    /// Crossfade envelope for click-free topology swaps.
    swap_fade: SmoothedParam,
    /// Last frame written to the caller, as (left, right).
    last_frame: (f32, f32),
    /// Frame the current swap fades out of.
    fade_from: (f32, f32),
}

impl AudioGraph {
    /// Creates a graph holding only the destination node.
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz (e.g., 48000.0)
    /// * `block_size` - Largest number of samples rendered per pass
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        let mut swap_fade = SmoothedParam::fast(1.0, sample_rate);
        swap_fade.snap_to_target();
        let mut graph = Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            outputs: Vec::new(),
            destination: NodeId::sentinel(),
            sample_rate,
            block_size,
            frame: 0,
            order: Vec::new(),
            dirty: true,
            rendered: false,
            input_scratch: StereoBuffer::new(block_size),
            modulation_scratch: (0..MAX_PARAMS).map(|_| vec![0.0; block_size]).collect(),
            swap_fade,
            last_frame: (0.0, 0.0),
            fade_from: (0.0, 0.0),
        };
        graph.destination = graph.add_node(NodeKind::Destination, Processor::Destination, Vec::new());
        graph
    }

    // --- Node mutations ---

    /// Adds a gain node (gain 1.0).
    pub fn add_gain(&mut self) -> NodeId {
        let (processor, params) = Processor::gain(self.sample_rate);
        self.add_node(NodeKind::Gain, processor, params)
    }

    /// Adds a plain delay node that can delay up to `max_seconds`.
    pub fn add_delay(&mut self, max_seconds: f32) -> NodeId {
        let (processor, params) = Processor::delay(self.sample_rate, max_seconds);
        self.add_node(NodeKind::Delay, processor, params)
    }

    /// Adds a stereo feedback delay node that can delay up to `max_seconds`.
    pub fn add_feedback_delay(&mut self, max_seconds: f32) -> NodeId {
        let (processor, params) = Processor::feedback_delay(self.sample_rate, max_seconds);
        self.add_node(NodeKind::FeedbackDelay, processor, params)
    }

    /// Adds a biquad filter node (350 Hz, Q 1).
    pub fn add_filter(&mut self, filter_type: FilterType) -> NodeId {
        let (processor, params) = Processor::filter(self.sample_rate, filter_type);
        self.add_node(NodeKind::Filter, processor, params)
    }

    /// Adds an unstarted oscillator node (440 Hz).
    pub fn add_oscillator(&mut self, waveform: Waveform) -> NodeId {
        let (processor, params) = Processor::oscillator(self.sample_rate, waveform);
        self.add_node(NodeKind::Oscillator, processor, params)
    }

    /// Removes a node and every edge touching it.
    ///
    /// The id is never reused; later operations on it fail with
    /// [`GraphError::NodeNotFound`]. The destination cannot be removed.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        if id == self.destination {
            return Err(GraphError::InvalidState(id, "the destination cannot be removed"));
        }
        let node = self.get_node(id)?;
        let edge_ids: Vec<EdgeId> = node
            .incoming
            .iter()
            .chain(node.outgoing.iter())
            .copied()
            .collect();

        for edge_id in edge_ids {
            self.disconnect_internal(edge_id);
        }

        let idx = id.0 as usize;
        self.nodes[idx] = None;
        self.outputs[idx] = StereoBuffer::default();
        self.dirty = true;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_remove: node {id}");
        Ok(())
    }

    /// Connects the output of `from` into the audio input of `to`.
    ///
    /// Returns the new edge's ID, or an error if:
    /// - Either node doesn't exist
    /// - `from` is the destination, or `to` has no audio input
    /// - A duplicate edge already exists
    /// - The edge would create a cycle
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<EdgeId, GraphError> {
        self.connect_target(from, to, EdgeTarget::Input)
    }

    /// Connects the output of `from` to parameter `param` of `to`.
    ///
    /// The mono sum of `from` is added to the parameter's base value every
    /// sample. Fails like [`connect()`](Self::connect), and with
    /// [`GraphError::UnknownParam`] if `to` has no such parameter.
    pub fn connect_param(
        &mut self,
        from: NodeId,
        to: NodeId,
        param: ParamKind,
    ) -> Result<EdgeId, GraphError> {
        self.connect_target(from, to, EdgeTarget::Param(param))
    }

    fn connect_target(
        &mut self,
        from: NodeId,
        to: NodeId,
        target: EdgeTarget,
    ) -> Result<EdgeId, GraphError> {
        self.validate_connection(from, to, target)?;

        if self.find_target_edge(from, to, target).is_some() {
            return Err(GraphError::DuplicateEdge(from, to));
        }

        // A cycle exists if `to` can already reach `from`.
        if self.can_reach(to, from) {
            return Err(GraphError::CycleDetected);
        }

        let edge_id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(Edge { from, to, target }));

        if let Some(Some(node)) = self.nodes.get_mut(from.0 as usize) {
            node.outgoing.push(edge_id);
        }
        if let Some(Some(node)) = self.nodes.get_mut(to.0 as usize) {
            node.incoming.push(edge_id);
        }
        self.dirty = true;

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_connect: {from} → {to} ({target})");
        Ok(edge_id)
    }

    /// Removes every outgoing edge of `node`, audio and param alike.
    ///
    /// Disconnecting a node with no outgoing edges is a no-op.
    pub fn disconnect(&mut self, node: NodeId) -> Result<(), GraphError> {
        let outgoing = self.get_node(node)?.outgoing.clone();
        if outgoing.is_empty() {
            return Ok(());
        }
        for edge_id in outgoing {
            self.disconnect_internal(edge_id);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: all outputs of {node}");
        Ok(())
    }

    /// Removes the audio edge `from → to`.
    pub fn disconnect_from(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.get_node(from)?;
        self.get_node(to)?;
        let edge_id = self
            .find_edge(from, to)
            .ok_or(GraphError::NotConnected(from, to))?;
        self.disconnect_internal(edge_id);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: {from} → {to}");
        Ok(())
    }

    /// Removes one edge by id.
    pub fn disconnect_edge(&mut self, id: EdgeId) -> Result<(), GraphError> {
        if self
            .edges
            .get(id.0 as usize)
            .and_then(|e| e.as_ref())
            .is_none()
        {
            return Err(GraphError::EdgeNotFound(id));
        }
        self.disconnect_internal(id);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: edge {id}");
        Ok(())
    }

    // --- Parameters and node state ---

    /// Base value of a parameter.
    pub fn param(&self, id: NodeId, param: ParamKind) -> Result<f32, GraphError> {
        let node = self.get_node(id)?;
        let slot = node
            .param_index(param)
            .ok_or(GraphError::UnknownParam(id, param))?;
        Ok(node.params[slot].value())
    }

    /// Sets a parameter's base value; rendering glides to it over ~10ms.
    pub fn set_param(&mut self, id: NodeId, param: ParamKind, value: f32) -> Result<(), GraphError> {
        let node = self.get_node_mut(id)?;
        let slot = node
            .param_index(param)
            .ok_or(GraphError::UnknownParam(id, param))?;
        node.params[slot].set_value(value);
        Ok(())
    }

    /// Sets a parameter's base value with no glide.
    pub fn set_param_immediate(
        &mut self,
        id: NodeId,
        param: ParamKind,
        value: f32,
    ) -> Result<(), GraphError> {
        let node = self.get_node_mut(id)?;
        let slot = node
            .param_index(param)
            .ok_or(GraphError::UnknownParam(id, param))?;
        node.params[slot].set_value(value);
        node.params[slot].snap();
        Ok(())
    }

    /// Response of a filter node.
    pub fn filter_type(&self, id: NodeId) -> Result<FilterType, GraphError> {
        match &self.get_node(id)?.processor {
            Processor::Filter(state) => Ok(state.filter_type),
            _ => Err(self.wrong_kind(id, NodeKind::Filter)),
        }
    }

    /// Changes the response of a filter node.
    pub fn set_filter_type(&mut self, id: NodeId, filter_type: FilterType) -> Result<(), GraphError> {
        let err = self.wrong_kind(id, NodeKind::Filter);
        match &mut self.get_node_mut(id)?.processor {
            Processor::Filter(state) => {
                state.filter_type = filter_type;
                state.invalidate();
                Ok(())
            }
            _ => Err(err),
        }
    }

    /// Waveform of an oscillator node.
    pub fn waveform(&self, id: NodeId) -> Result<Waveform, GraphError> {
        match &self.get_node(id)?.processor {
            Processor::Oscillator(osc) => Ok(osc.waveform()),
            _ => Err(self.wrong_kind(id, NodeKind::Oscillator)),
        }
    }

    /// Changes the waveform of an oscillator node, in any state.
    pub fn set_waveform(&mut self, id: NodeId, waveform: Waveform) -> Result<(), GraphError> {
        let err = self.wrong_kind(id, NodeKind::Oscillator);
        match &mut self.get_node_mut(id)?.processor {
            Processor::Oscillator(osc) => {
                osc.set_waveform(waveform);
                Ok(())
            }
            _ => Err(err),
        }
    }

    /// Feedback routing of a feedback delay node.
    pub fn delay_type(&self, id: NodeId) -> Result<DelayType, GraphError> {
        match &self.get_node(id)?.processor {
            Processor::FeedbackDelay(delay) => Ok(delay.delay_type()),
            _ => Err(self.wrong_kind(id, NodeKind::FeedbackDelay)),
        }
    }

    /// Changes the feedback routing of a feedback delay node.
    pub fn set_delay_type(&mut self, id: NodeId, delay_type: DelayType) -> Result<(), GraphError> {
        let err = self.wrong_kind(id, NodeKind::FeedbackDelay);
        match &mut self.get_node_mut(id)?.processor {
            Processor::FeedbackDelay(delay) => {
                delay.set_delay_type(delay_type);
                Ok(())
            }
            _ => Err(err),
        }
    }

    /// Lifecycle state of an oscillator node.
    pub fn oscillator_state(&self, id: NodeId) -> Result<OscillatorState, GraphError> {
        match &self.get_node(id)?.processor {
            Processor::Oscillator(osc) => Ok(osc.state()),
            _ => Err(self.wrong_kind(id, NodeKind::Oscillator)),
        }
    }

    /// Starts an oscillator at `when` seconds on the graph clock.
    ///
    /// Times in the past start at the next rendered frame. Fails with
    /// [`GraphError::InvalidState`] unless the oscillator is unstarted.
    pub fn start(&mut self, id: NodeId, when: f64) -> Result<(), GraphError> {
        let frame = self.frame_at(when);
        let err = self.wrong_kind(id, NodeKind::Oscillator);
        match &mut self.get_node_mut(id)?.processor {
            Processor::Oscillator(osc) => {
                if !osc.start(frame) {
                    return Err(GraphError::InvalidState(id, "oscillator can only be started once"));
                }
                #[cfg(feature = "tracing")]
                tracing::debug!("graph_start: {id} at frame {frame}");
                Ok(())
            }
            _ => Err(err),
        }
    }

    /// Stops a running oscillator at `when` seconds on the graph clock.
    ///
    /// The oscillator is spent from this call on and can never be restarted.
    pub fn stop(&mut self, id: NodeId, when: f64) -> Result<(), GraphError> {
        let frame = self.frame_at(when);
        let err = self.wrong_kind(id, NodeKind::Oscillator);
        match &mut self.get_node_mut(id)?.processor {
            Processor::Oscillator(osc) => {
                if !osc.stop(frame) {
                    return Err(GraphError::InvalidState(id, "oscillator is not running"));
                }
                #[cfg(feature = "tracing")]
                tracing::debug!("graph_stop: {id} at frame {frame}");
                Ok(())
            }
            _ => Err(err),
        }
    }

    // --- Introspection ---

    /// The graph's output sink.
    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// True if the node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get_node(id).is_ok()
    }

    /// Kind of a live node.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get_node(id).ok().map(|n| n.kind)
    }

    /// Number of live nodes, destination included.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// Finds the audio edge `from → to`, if one exists.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.find_target_edge(from, to, EdgeTarget::Input)
    }

    /// Finds the modulation edge `from → to.param`, if one exists.
    pub fn find_param_edge(&self, from: NodeId, to: NodeId, param: ParamKind) -> Option<EdgeId> {
        self.find_target_edge(from, to, EdgeTarget::Param(param))
    }

    /// True if an audio edge `from → to` exists.
    pub fn is_connected(&self, from: NodeId, to: NodeId) -> bool {
        self.find_edge(from, to).is_some()
    }

    /// Every edge leaving `id`, as (destination, target) pairs.
    pub fn connections_from(&self, id: NodeId) -> Vec<(NodeId, EdgeTarget)> {
        self.get_node(id)
            .map(|node| {
                node.outgoing
                    .iter()
                    .filter_map(|e| self.edges[e.0 as usize].as_ref())
                    .map(|edge| (edge.to, edge.target))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every edge arriving at `id`, as (source, target) pairs.
    pub fn connections_to(&self, id: NodeId) -> Vec<(NodeId, EdgeTarget)> {
        self.get_node(id)
            .map(|node| {
                node.incoming
                    .iter()
                    .filter_map(|e| self.edges[e.0 as usize].as_ref())
                    .map(|edge| (edge.from, edge.target))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Largest block rendered in one pass.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Render clock in frames.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Render clock in seconds.
    pub fn current_time(&self) -> f64 {
        self.frame as f64 / f64::from(self.sample_rate)
    }

    // --- Rendering ---

    /// Renders `min(left_out.len(), right_out.len())` frames.
    ///
    /// Longer requests are split into passes of at most
    /// [`block_size()`](Self::block_size) frames.
    pub fn render_block(
        &mut self,
        left_out: &mut [f32],
        right_out: &mut [f32],
    ) -> Result<(), GraphError> {
        let len = left_out.len().min(right_out.len());
        let mut offset = 0;
        while offset < len {
            let n = (len - offset).min(self.block_size);
            self.render_pass(
                &mut left_out[offset..offset + n],
                &mut right_out[offset..offset + n],
            )?;
            offset += n;
        }
        Ok(())
    }

    /// Renders `frames` frames into freshly allocated buffers.
    pub fn render(&mut self, frames: usize) -> Result<(Vec<f32>, Vec<f32>), GraphError> {
        let mut left = vec![0.0; frames];
        let mut right = vec![0.0; frames];
        self.render_block(&mut left, &mut right)?;
        Ok((left, right))
    }

    fn render_pass(&mut self, left_out: &mut [f32], right_out: &mut [f32]) -> Result<(), GraphError> {
        let len = left_out.len();
        if self.dirty {
            self.compile()?;
        }

        let ctx = RenderContext {
            frame: self.frame,
            len,
            sample_rate: self.sample_rate,
        };

        for pos in 0..self.order.len() {
            let idx = self.order[pos];
            let Some(node) = self.nodes[idx].as_ref() else {
                continue;
            };

            self.input_scratch.left[..len].fill(0.0);
            self.input_scratch.right[..len].fill(0.0);
            for buf in &mut self.modulation_scratch {
                buf[..len].fill(0.0);
            }

            for edge_id in &node.incoming {
                let Some(edge) = self.edges[edge_id.0 as usize] else {
                    continue;
                };
                let source = &self.outputs[edge.from.0 as usize];
                match edge.target {
                    EdgeTarget::Input => self.input_scratch.accumulate_from(source, len),
                    EdgeTarget::Param(kind) => {
                        if let Some(slot) = node.param_index(kind) {
                            let buf = &mut self.modulation_scratch[slot];
                            for (i, m) in buf[..len].iter_mut().enumerate() {
                                *m += source.mono(i);
                            }
                        }
                    }
                }
            }

            let mut output = core::mem::take(&mut self.outputs[idx]);
            if let Some(node) = self.nodes[idx].as_mut() {
                node.processor.process(
                    &ctx,
                    &self.input_scratch,
                    &mut node.params,
                    &self.modulation_scratch,
                    &mut output,
                );
            }
            self.outputs[idx] = output;
        }

        let dest = &self.outputs[self.destination.0 as usize];
        left_out.copy_from_slice(&dest.left[..len]);
        right_out.copy_from_slice(&dest.right[..len]);

        // The fade starts from the held frame, so the first sample after a
        // swap continues the stream instead of jumping to the new route.
        if !self.swap_fade.is_settled() {
            let (held_left, held_right) = self.fade_from;
            for i in 0..len {
                let fade = self.swap_fade.advance();
                left_out[i] = held_left * (1.0 - fade) + left_out[i] * fade;
                right_out[i] = held_right * (1.0 - fade) + right_out[i] * fade;
            }
        }

        if len > 0 {
            self.last_frame = (left_out[len - 1], right_out[len - 1]);
        }

        self.frame += len as u64;
        self.rendered = true;
        Ok(())
    }

    /// Recomputes the render order and arms the swap crossfade.
    fn compile(&mut self) -> Result<(), GraphError> {
        self.order = self.kahn_sort()?;
        self.dirty = false;

        if self.rendered {
            self.fade_from = self.last_frame;
            self.swap_fade = SmoothedParam::fast(0.0, self.sample_rate);
            self.swap_fade.set_target(1.0);
            #[cfg(feature = "tracing")]
            tracing::debug!("graph_swap: crossfade after topology change");
        }
        Ok(())
    }

    /// Kahn's algorithm over audio and param edges alike.
    fn kahn_sort(&self) -> Result<Vec<usize>, GraphError> {
        let n = self.nodes.len();
        let mut in_degree = vec![0u32; n];
        let mut active_count = 0usize;

        for (i, node_opt) in self.nodes.iter().enumerate() {
            if let Some(node) = node_opt {
                active_count += 1;
                in_degree[i] = node
                    .incoming
                    .iter()
                    .filter(|e| self.edges[e.0 as usize].is_some())
                    .count() as u32;
            }
        }

        let mut queue: Vec<usize> = (0..n)
            .filter(|&i| self.nodes[i].is_some() && in_degree[i] == 0)
            .collect();
        let mut sorted = Vec::with_capacity(active_count);

        while let Some(idx) = queue.pop() {
            sorted.push(idx);
            let Some(node) = self.nodes[idx].as_ref() else {
                continue;
            };
            for edge_id in &node.outgoing {
                if let Some(edge) = &self.edges[edge_id.0 as usize] {
                    let to_idx = edge.to.0 as usize;
                    in_degree[to_idx] -= 1;
                    if in_degree[to_idx] == 0 {
                        queue.push(to_idx);
                    }
                }
            }
        }

        if sorted.len() != active_count {
            return Err(GraphError::CycleDetected);
        }
        Ok(sorted)
    }

    // --- Internal helpers ---

    fn add_node(
        &mut self,
        kind: NodeKind,
        processor: Processor,
        params: Vec<super::param::AudioParam>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(NodeData::new(kind, processor, params)));
        self.outputs.push(StereoBuffer::new(self.block_size));
        self.dirty = true;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: {kind} node {id}");
        id
    }

    fn get_node(&self, id: NodeId) -> Result<&NodeData, GraphError> {
        self.nodes
            .get(id.0 as usize)
            .and_then(|n| n.as_ref())
            .ok_or(GraphError::NodeNotFound(id))
    }

    fn get_node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, GraphError> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(|n| n.as_mut())
            .ok_or(GraphError::NodeNotFound(id))
    }

    /// Builds a `WrongKind` error for `id`, or `NodeNotFound` if it is gone.
    fn wrong_kind(&self, id: NodeId, expected: NodeKind) -> GraphError {
        match self.get_node(id) {
            Ok(node) => GraphError::WrongKind {
                node: id,
                expected,
                found: node.kind,
            },
            Err(e) => e,
        }
    }

    fn frame_at(&self, when: f64) -> u64 {
        let frame = libm::round(when.max(0.0) * f64::from(self.sample_rate)) as u64;
        frame.max(self.frame)
    }

    /// DFS reachability check: can `from` reach `to` via existing edges?
    fn can_reach(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            let idx = current.0 as usize;
            if idx >= visited.len() || visited[idx] {
                continue;
            }
            visited[idx] = true;

            if let Some(Some(node)) = self.nodes.get(idx) {
                for edge_id in &node.outgoing {
                    if let Some(edge) = &self.edges[edge_id.0 as usize] {
                        stack.push(edge.to);
                    }
                }
            }
        }
        false
    }

    fn find_target_edge(&self, from: NodeId, to: NodeId, target: EdgeTarget) -> Option<EdgeId> {
        let node = self.nodes.get(from.0 as usize)?.as_ref()?;
        node.outgoing.iter().copied().find(|edge_id| {
            self.edges[edge_id.0 as usize]
                .as_ref()
                .is_some_and(|edge| edge.to == to && edge.target == target)
        })
    }

    /// Validates node existence and structural constraints for a connection.
    fn validate_connection(
        &self,
        from: NodeId,
        to: NodeId,
        target: EdgeTarget,
    ) -> Result<(), GraphError> {
        let from_node = self.get_node(from)?;
        let to_node = self.get_node(to)?;

        if !from_node.kind.has_output() {
            return Err(GraphError::InvalidConnection(format!(
                "cannot connect from {} node {from}",
                from_node.kind
            )));
        }

        match target {
            EdgeTarget::Input if !to_node.kind.has_input() => {
                Err(GraphError::InvalidConnection(format!(
                    "{} node {to} has no audio input",
                    to_node.kind
                )))
            }
            EdgeTarget::Param(param) if to_node.param_index(param).is_none() => {
                Err(GraphError::UnknownParam(to, param))
            }
            _ => Ok(()),
        }
    }

    /// Disconnects an edge without error checking.
    fn disconnect_internal(&mut self, id: EdgeId) {
        let idx = id.0 as usize;
        if let Some(edge) = self.edges.get_mut(idx).and_then(Option::take) {
            if let Some(Some(node)) = self.nodes.get_mut(edge.from.0 as usize) {
                node.outgoing.retain(|e| *e != id);
            }
            if let Some(Some(node)) = self.nodes.get_mut(edge.to.0 as usize) {
                node.incoming.retain(|e| *e != id);
            }
            self.dirty = true;
        }
    }
}
