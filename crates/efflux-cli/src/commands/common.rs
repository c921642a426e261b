//! Shared CLI helpers used across multiple commands.

use clap::Args;
use efflux_config::{InstrumentPreset, resolve_preset};
use efflux_core::AudioGraph;
use efflux_modules::{DelayParams, VoiceChain};
use tracing::info;

/// Stage toggles layered on top of a preset.
#[derive(Args, Debug, Clone, Default)]
pub struct StageFlags {
    /// Put the filter in the route
    #[arg(long, conflicts_with = "no_filter")]
    pub filter: bool,

    /// Take the filter out of the route
    #[arg(long)]
    pub no_filter: bool,

    /// Connect the filter's cutoff LFO
    #[arg(long, conflicts_with = "no_lfo")]
    pub lfo: bool,

    /// Disconnect the filter's cutoff LFO
    #[arg(long)]
    pub no_lfo: bool,

    /// Put the delay in the route
    #[arg(long, conflicts_with = "no_delay")]
    pub delay: bool,

    /// Take the delay out of the route
    #[arg(long)]
    pub no_delay: bool,
}

/// Folds an on/off flag pair into an override.
fn override_of(on: bool, off: bool) -> Option<bool> {
    if off {
        Some(false)
    } else if on {
        Some(true)
    } else {
        None
    }
}

impl StageFlags {
    /// Filter override, if either flag was given.
    pub fn filter_override(&self) -> Option<bool> {
        override_of(self.filter, self.no_filter)
    }

    /// LFO override, if either flag was given.
    pub fn lfo_override(&self) -> Option<bool> {
        override_of(self.lfo, self.no_lfo)
    }

    /// Delay override, if either flag was given.
    pub fn delay_override(&self) -> Option<bool> {
        override_of(self.delay, self.no_delay)
    }

    /// Applies the overrides to `voice`. Unset flags leave the preset's
    /// choice alone.
    pub fn apply(&self, voice: &mut VoiceChain, graph: &mut AudioGraph) -> anyhow::Result<()> {
        if let Some(enabled) = self.filter_override() {
            voice.set_filter_enabled(graph, enabled)?;
        }
        if let Some(enabled) = self.lfo_override() {
            voice.set_lfo_enabled(graph, enabled)?;
        }
        if let Some(enabled) = self.delay_override() {
            voice.set_delay_enabled(graph, enabled)?;
        }
        Ok(())
    }
}

/// Load a preset by path, user preset name or factory preset name.
pub fn load_preset(name: &str) -> anyhow::Result<InstrumentPreset> {
    resolve_preset(name).map_err(|e| {
        anyhow::anyhow!("{e}. Use 'efflux presets list' to see available presets.")
    })
}

/// Builds a graph and voice chain configured by `preset` (engine defaults
/// when `None`) and `flags`.
pub fn build_voice(
    preset: Option<&InstrumentPreset>,
    flags: &StageFlags,
    sample_rate: u32,
    block_size: usize,
) -> anyhow::Result<(AudioGraph, VoiceChain)> {
    let mut graph = AudioGraph::new(sample_rate as f32, block_size);
    let sink = graph.destination();
    let mut voice = VoiceChain::new(&mut graph, sink, DelayParams::default())?;

    if let Some(preset) = preset {
        preset.apply_to(&mut voice, &mut graph)?;
        info!(preset = %preset.name, "preset applied");
    }
    flags.apply(&mut voice, &mut graph)?;
    Ok((graph, voice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use efflux_config::get_factory_preset;

    #[test]
    fn test_flags_override_preset() {
        let preset = get_factory_preset("dub_echo").unwrap();
        let flags = StageFlags {
            no_filter: true,
            ..StageFlags::default()
        };
        let (_, voice) = build_voice(Some(&preset), &flags, 48000, 128).unwrap();
        assert_eq!(voice.route().stages(), ["source", "delay", "output"]);
    }

    #[test]
    fn test_off_flags_override_preset() {
        let preset = get_factory_preset("wobble_bass").unwrap();
        assert!(preset.filter.lfo != efflux_config::LFO_OFF);
        let flags = StageFlags {
            no_lfo: true,
            ..StageFlags::default()
        };
        let (_, voice) = build_voice(Some(&preset), &flags, 48000, 128).unwrap();
        assert!(!voice.filter().is_lfo_enabled());
        assert_eq!(voice.route().stages(), ["source", "filter", "output"]);

        let preset = get_factory_preset("dub_echo").unwrap();
        let flags = StageFlags {
            no_delay: true,
            ..StageFlags::default()
        };
        let (_, voice) = build_voice(Some(&preset), &flags, 48000, 128).unwrap();
        assert_eq!(voice.route().stages(), ["source", "filter", "output"]);
    }

    #[test]
    fn test_no_flags_keep_defaults() {
        let (_, voice) = build_voice(None, &StageFlags::default(), 48000, 128).unwrap();
        assert_eq!(voice.route().stages(), ["source", "output"]);
        assert!(!voice.filter().is_lfo_enabled());
    }

    #[test]
    fn test_unknown_preset_message() {
        let err = load_preset("nonexistent_preset_12345").unwrap_err();
        assert!(err.to_string().contains("efflux presets list"));
    }
}
