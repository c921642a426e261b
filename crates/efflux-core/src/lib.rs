//! Efflux Core - audio graph and DSP primitives
//!
//! This crate provides the processing substrate the efflux voice effects engine
//! drives: a node graph with audio and modulation connections, and the DSP
//! kernels that run inside its nodes.
//!
//! # Audio Graph
//!
//! - [`AudioGraph`] - Node arena with audio edges, parameter (modulation) edges,
//!   cycle rejection, lazy topological ordering and block rendering
//! - [`NodeId`] / [`EdgeId`] - Stable handles, never reused within a graph
//! - [`ParamKind`] - The control inputs a node can expose
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR filter with RBJ cookbook coefficients
//! - [`FilterType`] - The eight biquad responses a filter node can select
//!
//! ## Delay Lines
//!
//! - [`InterpolatedDelay`] - Variable-length delay with linear interpolation
//! - [`FeedbackDelay`] - Stereo feedback delay with a lowpass in the loop
//!
//! ## Sources
//!
//! - [`Oscillator`] - Phase-accumulating oscillator with one-shot start/stop
//!   semantics ([`OscillatorState`])
//!
//! ## Parameter Smoothing
//!
//! - [`SmoothedParam`] - Exponential smoothing (RC-like response)
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (with `alloc`). Disable the default `std`
//! feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! efflux-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use efflux_core::{AudioGraph, FilterType, ParamKind, Waveform};
//!
//! let mut graph = AudioGraph::new(48000.0, 128);
//! let osc = graph.add_oscillator(Waveform::Sawtooth);
//! let filter = graph.add_filter(FilterType::Lowpass);
//! let out = graph.destination();
//!
//! graph.connect(osc, filter).unwrap();
//! graph.connect(filter, out).unwrap();
//! graph.set_param(filter, ParamKind::Frequency, 1200.0).unwrap();
//! graph.start(osc, 0.0).unwrap();
//!
//! let (left, right) = graph.render(4800).unwrap();
//! assert_eq!(left.len(), right.len());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod delay;
pub mod feedback_delay;
pub mod graph;
pub mod math;
pub mod oscillator;
pub mod param;

// Re-export main types at crate root
pub use biquad::{
    Biquad, FilterType, allpass_coefficients, bandpass_coefficients, coefficients,
    highpass_coefficients, highshelf_coefficients, lowpass_coefficients, lowshelf_coefficients,
    notch_coefficients, peaking_coefficients,
};
pub use delay::InterpolatedDelay;
pub use feedback_delay::{DelayType, FeedbackDelay};
pub use graph::{AudioGraph, EdgeId, EdgeTarget, GraphError, NodeId, NodeKind, ParamKind};
pub use math::{flush_denormal, midi_to_hz, seconds_to_samples};
pub use oscillator::{Oscillator, OscillatorState, Waveform};
pub use param::SmoothedParam;
