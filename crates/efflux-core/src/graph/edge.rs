//! Graph edge types.
//!
//! An edge carries the output of one node either into another node's audio
//! input or into one of its parameters, where it is summed onto the
//! parameter's base value every sample.

use super::node::NodeId;
use super::param::ParamKind;

/// Unique identifier for an edge in the audio graph.
///
/// Edge IDs are assigned sequentially and never reused within a graph instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

/// Where an edge lands on its destination node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeTarget {
    /// The node's audio input. All audio edges into a node are summed.
    Input,
    /// A control parameter. The source's mono output modulates the value.
    Param(ParamKind),
}

impl core::fmt::Display for EdgeTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EdgeTarget::Input => f.write_str("input"),
            EdgeTarget::Param(kind) => write!(f, "{kind}"),
        }
    }
}

/// A directed connection in the audio graph.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub target: EdgeTarget,
}
