//! Audio graph for the efflux engine.
//!
//! An [`AudioGraph`] is an arena of nodes joined by two kinds of edge:
//!
//! - **Audio edges** ([`EdgeTarget::Input`]) sum a node's output into
//!   another node's input.
//! - **Param edges** ([`EdgeTarget::Param`]) add the mono sum of a node's
//!   output to one of another node's parameters, per sample. This is how an
//!   LFO sweeps a filter cutoff.
//!
//! Every mutation is validated on the spot: unknown nodes, duplicate edges,
//! connections out of the destination or into an oscillator, and anything
//! that would close a cycle are rejected with a [`GraphError`].
//!
//! # Rendering
//!
//! The graph keeps a topological order of its nodes and recomputes it
//! lazily on the first render after a topology change. Each node renders a
//! whole block before the next one runs; the destination's block is the
//! graph's output.
//!
//! # Click-free Topology Changes
//!
//! The first block rendered after a topology change is crossfaded from the
//! previous block's output over ~5ms (via [`SmoothedParam`](crate::SmoothedParam)),
//! so tearing down and rebuilding a route mid-note does not click.
//!
//! # no_std Support
//!
//! This module is `no_std` compatible with `alloc`.

pub mod buffer;
pub mod edge;
pub mod node;
pub mod param;
mod processing;
mod processor;

pub use buffer::StereoBuffer;
pub use edge::{EdgeId, EdgeTarget};
pub use node::{NodeId, NodeKind};
pub use param::ParamKind;
pub use processing::{AudioGraph, GraphError};
