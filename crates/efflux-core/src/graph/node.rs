//! Graph node types.
//!
//! Each node has a [`NodeId`] and a [`NodeKind`]. The internal `NodeData`
//! bundles the DSP state, the parameter slots and the adjacency lists.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::edge::EdgeId;
use super::param::{AudioParam, ParamKind};
use super::processor::Processor;

/// Unique identifier for a node in the audio graph.
///
/// Node IDs are assigned sequentially and never reused within a graph
/// instance, so a handle to a removed node stays invalid forever.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    /// Returns a sentinel value used for uninitialized node references.
    #[inline]
    pub fn sentinel() -> Self {
        Self(u32::MAX)
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// The role of a node in the audio graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Final output sink. Exactly one per graph, created with it.
    Destination,
    /// Multiplies its input by the `Gain` parameter.
    Gain,
    /// Plain delay line, `DelayTime` only.
    Delay,
    /// Biquad filter.
    Filter,
    /// One-shot source, no audio input.
    Oscillator,
    /// Stereo feedback delay kernel (wet output only).
    FeedbackDelay,
}

impl NodeKind {
    /// Lowercase name for logs and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Destination => "destination",
            NodeKind::Gain => "gain",
            NodeKind::Delay => "delay",
            NodeKind::Filter => "filter",
            NodeKind::Oscillator => "oscillator",
            NodeKind::FeedbackDelay => "feedback_delay",
        }
    }

    /// True if the node accepts audio edges into its input.
    pub fn has_input(self) -> bool {
        !matches!(self, NodeKind::Oscillator)
    }

    /// True if the node may be the source of an edge.
    pub fn has_output(self) -> bool {
        !matches!(self, NodeKind::Destination)
    }
}

impl core::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Internal bookkeeping for a node in the graph.
pub(crate) struct NodeData {
    pub kind: NodeKind,
    pub processor: Processor,
    pub params: Vec<AudioParam>,
    /// Edges arriving at this node (audio and param).
    pub incoming: Vec<EdgeId>,
    /// Edges leaving this node.
    pub outgoing: Vec<EdgeId>,
}

impl NodeData {
    pub fn new(kind: NodeKind, processor: Processor, params: Vec<AudioParam>) -> Self {
        Self {
            kind,
            processor,
            params,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Slot of `kind` in `params`, if the node exposes it.
    pub fn param_index(&self, kind: ParamKind) -> Option<usize> {
        self.params.iter().position(|p| p.kind == kind)
    }
}
