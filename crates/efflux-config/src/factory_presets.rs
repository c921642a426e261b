//! Factory presets bundled with efflux.
//!
//! Built-in instrument presets that are always available without external
//! files. Each one is a plain TOML document in the same format users save.

use crate::InstrumentPreset;

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "init",
    "wobble_bass",
    "slow_sweep",
    "dub_echo",
    "slapback",
    "bright_lead",
];

/// TOML content for factory presets, embedded at compile time.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("init", INIT_PRESET),
    ("wobble_bass", WOBBLE_BASS_PRESET),
    ("slow_sweep", SLOW_SWEEP_PRESET),
    ("dub_echo", DUB_ECHO_PRESET),
    ("slapback", SLAPBACK_PRESET),
    ("bright_lead", BRIGHT_LEAD_PRESET),
];

/// Dry voice, both stages out of the route.
const INIT_PRESET: &str = r#"
name = "Init"
description = "Dry voice - filter and delay bypassed"
sample_rate = 48000

[filter]
enabled = false

[delay]
enabled = false
"#;

const WOBBLE_BASS_PRESET: &str = r#"
name = "Wobble Bass"
description = "Resonant lowpass swept by a fast sine LFO"
sample_rate = 48000
volume = 0.8

[filter]
enabled = true
type = "lowpass"
frequency = 600.0
q = 8.0
lfo = "sine"
lfo_speed = 4.0
lfo_depth = 70.0

[delay]
enabled = false
"#;

const SLOW_SWEEP_PRESET: &str = r#"
name = "Slow Sweep"
description = "Bandpass drifting with a slow triangle"
sample_rate = 48000

[filter]
enabled = true
type = "bandpass"
frequency = 1200.0
q = 3.0
lfo = "triangle"
lfo_speed = 0.2
lfo_depth = 80.0

[delay]
enabled = false
"#;

const DUB_ECHO_PRESET: &str = r#"
name = "Dub Echo"
description = "Dark filtered ping-pong repeats"
sample_rate = 48000
volume = 0.7

[filter]
enabled = true
type = "lowpass"
frequency = 1800.0
q = 2.0
lfo = "off"

[delay]
enabled = true
type = "pingpong"
time = 0.375
feedback = 0.6
stereo_offset = 0.0
cutoff = 900.0
"#;

const SLAPBACK_PRESET: &str = r#"
name = "Slapback"
description = "Single short echo, no filtering"
sample_rate = 48000

[filter]
enabled = false

[delay]
enabled = true
type = "normal"
time = 0.09
feedback = 0.1
stereo_offset = -0.012
cutoff = 6000.0
"#;

const BRIGHT_LEAD_PRESET: &str = r#"
name = "Bright Lead"
description = "Highpassed lead with inverted repeats"
sample_rate = 48000

[filter]
enabled = true
type = "highpass"
frequency = 400.0
q = 1.5
lfo = "off"

[delay]
enabled = true
type = "inverted"
time = 0.25
feedback = 0.35
stereo_offset = 0.02
cutoff = 4000.0
"#;

/// Get all factory presets.
///
/// # Example
///
/// ```rust
/// use efflux_config::factory_presets;
///
/// for preset in factory_presets() {
///     println!("{}: {}", preset.name, preset.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_presets() -> Vec<InstrumentPreset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| InstrumentPreset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by name.
///
/// Matches the internal identifier or the preset's display name,
/// case-insensitively.
///
/// # Example
///
/// ```rust
/// use efflux_config::get_factory_preset;
///
/// let preset = get_factory_preset("Dub Echo").unwrap();
/// assert!(preset.delay.enabled);
/// ```
pub fn get_factory_preset(name: &str) -> Option<InstrumentPreset> {
    for (preset_name, toml) in FACTORY_PRESETS_TOML {
        if preset_name.eq_ignore_ascii_case(name) {
            return InstrumentPreset::from_toml(toml).ok();
        }
    }

    factory_presets()
        .into_iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
}

/// Get the internal identifiers of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a name matches a factory preset (case-insensitive).
///
/// ```rust
/// use efflux_config::is_factory_preset;
///
/// assert!(is_factory_preset("slapback"));
/// assert!(is_factory_preset("Wobble Bass"));
/// assert!(!is_factory_preset("my_custom_preset"));
/// ```
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_preset;

    #[test]
    fn test_factory_presets_load() {
        let presets = factory_presets();
        assert_eq!(presets.len(), FACTORY_PRESETS_TOML.len());

        let names: Vec<_> = presets.iter().map(|p| p.name.as_str()).collect();
        assert!(names.contains(&"Init"));
        assert!(names.contains(&"Wobble Bass"));
        assert!(names.contains(&"Dub Echo"));
    }

    #[test]
    fn test_get_factory_preset() {
        let preset = get_factory_preset("wobble_bass").expect("wobble_bass should exist");
        assert_eq!(preset.name, "Wobble Bass");

        let preset = get_factory_preset("Slow Sweep").expect("Slow Sweep should exist");
        assert_eq!(preset.name, "Slow Sweep");

        let preset = get_factory_preset("SLAPBACK").expect("SLAPBACK should exist");
        assert_eq!(preset.name, "Slapback");

        assert!(get_factory_preset("nonexistent").is_none());
    }

    #[test]
    fn test_names_list_matches_table() {
        assert_eq!(factory_preset_names(), FACTORY_PRESET_NAMES);
    }

    #[test]
    fn test_all_factory_presets_valid() {
        for (name, toml) in FACTORY_PRESETS_TOML {
            let preset = InstrumentPreset::from_toml(toml)
                .unwrap_or_else(|e| panic!("factory preset '{name}' should parse: {e}"));
            assert!(preset.description.is_some(), "preset '{}' should have a description", name);
            assert_eq!(validate_preset(&preset), Ok(()), "preset '{}' should validate", name);
        }
    }

    #[test]
    fn test_init_preset_is_dry() {
        let init = get_factory_preset("init").expect("init should exist");
        assert!(!init.filter.enabled);
        assert!(!init.delay.enabled);
    }

    #[test]
    fn test_wobble_has_lfo() {
        let wobble = get_factory_preset("wobble_bass").expect("wobble_bass should exist");
        assert_eq!(wobble.filter.lfo_waveform(), Ok(Some(efflux_core::Waveform::Sine)));
    }
}
