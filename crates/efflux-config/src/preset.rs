//! Instrument preset file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use efflux_core::{AudioGraph, DelayType, FilterType, Waveform};
use efflux_modules::{DelayParams, DelaySettings, FilterSettings, VoiceChain};
use tracing::debug;

use crate::error::ConfigError;
use crate::validation::{ValidationError, validate_preset};

/// Value of the `lfo` key that leaves the cutoff unmodulated.
pub const LFO_OFF: &str = "off";

/// Effects configuration for one instrument.
///
/// Presets are stored as TOML files. Every key except `name` is optional and
/// falls back to the engine defaults.
///
/// # TOML Format
///
/// ```toml
/// name = "Wobble Bass"
/// description = "Resonant lowpass swept by a slow sine"
/// sample_rate = 48000
/// volume = 0.8
///
/// [filter]
/// enabled = true
/// type = "lowpass"
/// frequency = 600.0
/// q = 8.0
/// lfo = "sine"
/// lfo_speed = 2.0
/// lfo_depth = 70.0
///
/// [delay]
/// enabled = true
/// type = "pingpong"
/// time = 0.375
/// feedback = 0.4
/// stereo_offset = 0.0
/// cutoff = 2400.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstrumentPreset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate hint (defaults to 48000).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Voice bus gain, 0..=1.
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Filter stage.
    #[serde(default)]
    pub filter: FilterPreset,

    /// Delay stage.
    #[serde(default)]
    pub delay: DelayPreset,
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_volume() -> f32 {
    1.0
}

/// `[filter]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterPreset {
    /// Whether the filter stage is in the route.
    pub enabled: bool,
    /// Biquad response name, e.g. `"lowpass"`.
    #[serde(rename = "type")]
    pub filter_type: String,
    /// Base cutoff in Hz.
    pub frequency: f32,
    /// Resonance.
    pub q: f32,
    /// LFO waveform name, or `"off"`.
    pub lfo: String,
    /// LFO rate in Hz.
    pub lfo_speed: f32,
    /// LFO depth in percent of the base cutoff.
    pub lfo_depth: f32,
}

impl Default for FilterPreset {
    fn default() -> Self {
        Self::from(&FilterSettings::default())
    }
}

impl From<&FilterSettings> for FilterPreset {
    fn from(settings: &FilterSettings) -> Self {
        Self {
            enabled: settings.enabled,
            filter_type: settings.filter_type.name().to_string(),
            frequency: settings.frequency,
            q: settings.q,
            lfo: settings
                .lfo
                .map_or(LFO_OFF, Waveform::name)
                .to_string(),
            lfo_speed: settings.lfo_speed,
            lfo_depth: settings.lfo_depth,
        }
    }
}

impl FilterPreset {
    /// Resolved filter type.
    pub fn filter_type(&self) -> Result<FilterType, ValidationError> {
        FilterType::from_name(&self.filter_type).ok_or_else(|| ValidationError::InvalidFormat {
            param: "filter.type".to_string(),
            reason: format!("unknown filter type '{}'", self.filter_type),
        })
    }

    /// Resolved LFO waveform; `None` when the LFO is off.
    pub fn lfo_waveform(&self) -> Result<Option<Waveform>, ValidationError> {
        if self.lfo.eq_ignore_ascii_case(LFO_OFF) {
            return Ok(None);
        }
        Waveform::from_name(&self.lfo)
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidFormat {
                param: "filter.lfo".to_string(),
                reason: format!("unknown waveform '{}'", self.lfo),
            })
    }

    /// Converts to engine settings. Names must resolve; ranges are not checked.
    pub fn to_settings(&self) -> Result<FilterSettings, ValidationError> {
        Ok(FilterSettings {
            enabled: self.enabled,
            frequency: self.frequency,
            q: self.q,
            lfo: self.lfo_waveform()?,
            lfo_speed: self.lfo_speed,
            lfo_depth: self.lfo_depth,
            filter_type: self.filter_type()?,
        })
    }
}

/// `[delay]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DelayPreset {
    /// Whether the delay stage is in the route.
    pub enabled: bool,
    /// Feedback mode name: `"normal"`, `"inverted"` or `"pingpong"`.
    #[serde(rename = "type")]
    pub delay_type: String,
    /// Delay time in seconds.
    pub time: f32,
    /// Feedback amount, 0..=1.
    pub feedback: f32,
    /// Stereo offset in seconds.
    pub stereo_offset: f32,
    /// Feedback-path cutoff in Hz.
    pub cutoff: f32,
}

impl Default for DelayPreset {
    fn default() -> Self {
        Self::from(&DelaySettings::default())
    }
}

impl From<&DelaySettings> for DelayPreset {
    fn from(settings: &DelaySettings) -> Self {
        let params = &settings.params;
        Self {
            enabled: settings.enabled,
            delay_type: params.kind.name().to_string(),
            time: params.delay_time,
            feedback: params.feedback,
            stereo_offset: params.stereo_offset,
            cutoff: params.cutoff,
        }
    }
}

impl DelayPreset {
    /// Resolved delay type.
    pub fn delay_type(&self) -> Result<DelayType, ValidationError> {
        DelayType::from_name(&self.delay_type).ok_or_else(|| ValidationError::InvalidFormat {
            param: "delay.type".to_string(),
            reason: format!("unknown delay type '{}'", self.delay_type),
        })
    }

    /// Converts to engine settings. Names must resolve; ranges are not checked.
    pub fn to_settings(&self) -> Result<DelaySettings, ValidationError> {
        Ok(DelaySettings {
            enabled: self.enabled,
            params: DelayParams {
                kind: self.delay_type()?,
                delay_time: self.time,
                feedback: self.feedback,
                stereo_offset: self.stereo_offset,
                cutoff: self.cutoff,
            },
        })
    }
}

impl InstrumentPreset {
    /// Create a preset with engine defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: default_sample_rate(),
            volume: default_volume(),
            filter: FilterPreset::default(),
            delay: DelayPreset::default(),
        }
    }

    /// Snapshot of a live voice chain.
    pub fn capture(
        name: impl Into<String>,
        voice: &VoiceChain,
        graph: &AudioGraph,
    ) -> Result<Self, ConfigError> {
        let delay = DelaySettings {
            enabled: voice.delay().is_enabled(),
            params: voice.delay().params(),
        };
        Ok(Self {
            name: name.into(),
            description: None,
            sample_rate: graph.sample_rate() as u32,
            volume: voice.volume(graph)?,
            filter: FilterPreset::from(&voice.filter().settings()),
            delay: DelayPreset::from(&delay),
        })
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the sample rate hint.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the voice bus gain.
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Set the filter stage.
    pub fn with_filter(mut self, filter: &FilterSettings) -> Self {
        self.filter = FilterPreset::from(filter);
        self
    }

    /// Set the delay stage.
    pub fn with_delay(mut self, delay: &DelaySettings) -> Self {
        self.delay = DelayPreset::from(delay);
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::read_file(path, e))?;
        let preset: InstrumentPreset = toml::from_str(&content)?;
        debug!(path = %path.display(), name = %preset.name, "preset loaded");
        Ok(preset)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        debug!(path = %path.display(), name = %self.name, "preset saved");
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates the preset, then pushes every setting into `voice`.
    ///
    /// Nothing is applied if validation fails. Stage toggles go through the
    /// voice chain, so the route is rebuilt only when a flag changes.
    pub fn apply_to(&self, voice: &mut VoiceChain, graph: &mut AudioGraph) -> Result<(), ConfigError> {
        validate_preset(self)?;
        let filter = self.filter.to_settings()?;
        let delay = self.delay.to_settings()?;

        voice.set_volume(graph, self.volume)?;
        voice.apply_filter_settings(graph, &filter)?;
        voice.apply_delay_settings(graph, &delay)?;
        debug!(name = %self.name, route = %voice.route(), "preset applied");
        Ok(())
    }
}

impl Default for InstrumentPreset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
