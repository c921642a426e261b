//! Voice effect modules and routing for the efflux engine.
//!
//! Builds on the [`efflux_core`] audio graph. Each instrument voice runs its
//! note sources through a fixed effects path:
//!
//! ```text
//! sources ──► voice bus ──► [filter (+ LFO on cutoff)] ──► [delay] ──► sink
//! ```
//!
//! Stages in brackets are optional. Whenever a stage is switched on or off
//! the path is torn down and rebuilt from scratch, so the live graph always
//! matches the enable flags exactly.
//!
//! # Modules
//!
//! - [`factory`] - Node construction with engine defaults
//! - [`FilterModule`] - Biquad with a togglable, one-shot-safe LFO
//! - [`DelayModule`] - Stereo feedback delay with input and output ports
//! - [`routing`] - [`apply_routing`] and the [`Stage`] trait
//! - [`VoiceChain`] - Owner of the modules and the enable flags
//! - [`automation`] - Percentage-based parameter automation
//!
//! # Example
//!
//! ```rust
//! use efflux_core::{AudioGraph, Waveform};
//! use efflux_modules::{DelayParams, VoiceChain};
//!
//! let mut graph = AudioGraph::new(48000.0, 128);
//! let sink = graph.destination();
//! let mut voice = VoiceChain::new(&mut graph, sink, DelayParams::default())?;
//!
//! let note = graph.add_oscillator(Waveform::Sawtooth);
//! graph.start(note, 0.0)?;
//! voice.attach_source(&mut graph, note)?;
//!
//! voice.set_filter_enabled(&mut graph, true)?;
//! voice.set_lfo_enabled(&mut graph, true)?;
//! voice.set_delay_enabled(&mut graph, true)?;
//! assert_eq!(voice.route().to_string(), "source → filter → delay → output");
//!
//! let (left, _right) = graph.render(4800)?;
//! assert!(left.iter().all(|x| x.is_finite()));
//! # Ok::<(), efflux_modules::ModuleError>(())
//! ```

pub mod automation;
pub mod delay;
pub mod error;
pub mod factory;
pub mod filter;
pub mod routing;
pub mod voice;

pub use automation::{AutomationEvent, AutomationTarget};
pub use delay::{DelayModule, DelayParams, DelaySettings};
pub use error::{ModuleError, Result};
pub use filter::{FilterModule, FilterSettings};
pub use routing::{Route, Stage, apply_routing, apply_stages};
pub use voice::VoiceChain;
