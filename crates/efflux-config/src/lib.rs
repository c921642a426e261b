//! Instrument presets for the efflux voice effects engine.
//!
//! A preset captures everything a [`VoiceChain`](efflux_modules::VoiceChain)
//! needs: which stages are in the route, the filter and its LFO, the delay,
//! and the voice volume.
//!
//! # Features
//!
//! - **Presets**: Load and save instrument presets as TOML
//! - **Validation**: Range and name checks reporting every bad field
//! - **Factory Presets**: Built-in presets that need no files
//! - **Paths**: Platform user presets directory and name lookup
//!
//! # Example
//!
//! ```rust
//! use efflux_config::{get_factory_preset, InstrumentPreset};
//! use efflux_core::AudioGraph;
//! use efflux_modules::{DelayParams, VoiceChain};
//!
//! let mut graph = AudioGraph::new(48000.0, 128);
//! let sink = graph.destination();
//! let mut voice = VoiceChain::new(&mut graph, sink, DelayParams::default())?;
//!
//! let preset = get_factory_preset("dub_echo").unwrap();
//! preset.apply_to(&mut voice, &mut graph)?;
//! assert_eq!(voice.route().to_string(), "source → filter → delay → output");
//!
//! let toml = preset.to_toml()?;
//! assert_eq!(InstrumentPreset::from_toml(&toml)?, preset);
//! # Ok::<(), efflux_config::ConfigError>(())
//! ```

mod error;
mod preset;

/// Platform paths for user presets.
#[cfg(feature = "std")]
pub mod paths;

/// Preset validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
#[cfg(feature = "std")]
pub use paths::{
    ensure_user_presets_dir, find_preset, list_user_presets, preset_name_from_path,
    resolve_preset, user_presets_dir,
};
pub use preset::{DelayPreset, FilterPreset, InstrumentPreset, LFO_OFF};
pub use validation::{ValidationError, ValidationResult, check_range, validate_preset};
