//! Integration tests for efflux-config.
//!
//! Presets are applied to real voice chains and rendered.

use efflux_config::paths::{list_presets_in, resolve_preset_in};
use efflux_config::{
    ConfigError, InstrumentPreset, ValidationError, factory_presets, get_factory_preset,
};
use efflux_core::{AudioGraph, ParamKind, Waveform};
use efflux_modules::{DelayParams, VoiceChain};
use tempfile::TempDir;

fn setup() -> (AudioGraph, VoiceChain) {
    let mut graph = AudioGraph::new(48000.0, 128);
    let sink = graph.destination();
    let voice = VoiceChain::new(&mut graph, sink, DelayParams::default()).unwrap();
    (graph, voice)
}

/// Every factory preset applies cleanly and renders finite audio.
#[test]
fn test_factory_presets_render() {
    for preset in factory_presets() {
        let (mut graph, mut voice) = setup();
        preset
            .apply_to(&mut voice, &mut graph)
            .unwrap_or_else(|e| panic!("preset '{}' should apply: {e}", preset.name));

        assert_eq!(voice.route().contains("filter"), preset.filter.enabled);
        assert_eq!(voice.route().contains("delay"), preset.delay.enabled);

        let note = graph.add_oscillator(Waveform::Sawtooth);
        graph.set_param_immediate(note, ParamKind::Frequency, 220.0).unwrap();
        graph.start(note, 0.0).unwrap();
        voice.attach_source(&mut graph, note).unwrap();

        let (left, right) = graph.render(4800).unwrap();
        assert!(
            left.iter().chain(&right).all(|x| x.is_finite()),
            "preset '{}' produced non-finite output",
            preset.name
        );
        assert!(left.iter().any(|&x| x != 0.0), "preset '{}' is silent", preset.name);
    }
}

/// Switching presets on a live voice reroutes it.
#[test]
fn test_switching_presets_reroutes() {
    let (mut graph, mut voice) = setup();

    get_factory_preset("dub_echo")
        .unwrap()
        .apply_to(&mut voice, &mut graph)
        .unwrap();
    assert_eq!(voice.route().stages(), ["source", "filter", "delay", "output"]);

    get_factory_preset("wobble_bass")
        .unwrap()
        .apply_to(&mut voice, &mut graph)
        .unwrap();
    assert_eq!(voice.route().stages(), ["source", "filter", "output"]);
    assert!(voice.filter().is_lfo_enabled());

    get_factory_preset("init")
        .unwrap()
        .apply_to(&mut voice, &mut graph)
        .unwrap();
    assert_eq!(voice.route().stages(), ["source", "output"]);
    assert!(!graph.is_connected(voice.filter().lfo_node(), voice.filter().lfo_gain_node()));
}

/// Test preset save/load roundtrip through a nested directory.
#[test]
fn test_preset_save_load_roundtrip() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let preset_path = temp_dir.path().join("nested").join("dub.toml");

    let original = get_factory_preset("dub_echo").unwrap();
    original.save(&preset_path).expect("should save preset");

    let loaded = InstrumentPreset::load(&preset_path).expect("should load preset");
    assert_eq!(loaded, original);
}

/// Captured state saved to disk restores the same voice.
#[test]
fn test_capture_save_restore() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("live.toml");

    let (mut graph, mut voice) = setup();
    voice.set_filter_enabled(&mut graph, true).unwrap();
    voice.set_lfo_enabled(&mut graph, true).unwrap();
    voice.filter_mut().set_frequency(&mut graph, 2000.0).unwrap();
    voice.set_delay_enabled(&mut graph, true).unwrap();
    voice.delay_mut().set_feedback(&mut graph, 0.3).unwrap();

    InstrumentPreset::capture("Live", &voice, &graph)
        .unwrap()
        .save(&path)
        .unwrap();

    let (mut graph2, mut voice2) = setup();
    InstrumentPreset::load(&path)
        .unwrap()
        .apply_to(&mut voice2, &mut graph2)
        .unwrap();

    assert_eq!(voice2.route(), voice.route());
    assert_eq!(voice2.filter().settings(), voice.filter().settings());
    assert_eq!(voice2.delay().params(), voice.delay().params());
}

#[test]
fn test_load_missing_file() {
    let result = InstrumentPreset::load("/nonexistent/dir/preset.toml");
    assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
}

#[test]
fn test_load_malformed_toml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "name = \"Broken\"\n[filter\nq = 2").unwrap();
    assert!(matches!(
        InstrumentPreset::load(&path),
        Err(ConfigError::TomlParse(_))
    ));
}

/// A file with several bad values reports all of them.
#[test]
fn test_invalid_file_reports_every_field() {
    let toml = r#"
name = "Broken"

[filter]
enabled = true
q = 100.0
lfo_depth = 150.0

[delay]
feedback = -0.5
"#;
    let preset = InstrumentPreset::from_toml(toml).unwrap();
    let (mut graph, mut voice) = setup();
    let err = preset.apply_to(&mut voice, &mut graph).unwrap_err();

    let ConfigError::Validation(ValidationError::Multiple(errors)) = err else {
        panic!("expected multiple validation errors, got {err:?}");
    };
    assert_eq!(errors.len(), 3);
    assert!(!voice.route().contains("filter"), "nothing applied on failure");
}

#[test]
fn test_user_directory_lookup() {
    let temp_dir = TempDir::new().unwrap();
    InstrumentPreset::new("Mine")
        .save(temp_dir.path().join("mine.toml"))
        .unwrap();

    assert_eq!(list_presets_in(temp_dir.path()).len(), 1);
    assert_eq!(resolve_preset_in(temp_dir.path(), "mine").unwrap().name, "Mine");
    assert_eq!(
        resolve_preset_in(temp_dir.path(), "Bright Lead").unwrap().name,
        "Bright Lead"
    );
}
