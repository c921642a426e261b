//! Integration tests for efflux-cli.
//!
//! Every test runs the real `efflux` binary.

use std::process::Command;
use tempfile::TempDir;

/// Helper to get the path to the `efflux` binary built by cargo.
fn efflux_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_efflux"))
}

fn read_wav(path: &std::path::Path) -> (hound::WavSpec, Vec<f32>) {
    let mut reader = hound::WavReader::open(path).expect("output should be a WAV file");
    let spec = reader.spec();
    let samples = reader.samples::<f32>().map(Result::unwrap).collect();
    (spec, samples)
}

// ---------------------------------------------------------------------------
// efflux route
// ---------------------------------------------------------------------------

#[test]
fn cli_route_default_is_direct() {
    let output = efflux_bin().arg("route").output().expect("failed to run efflux route");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().next(), Some("source → output"));
}

#[test]
fn cli_route_both_stages() {
    let output = efflux_bin()
        .args(["route", "--filter", "--delay", "--lfo", "--verbose"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("source → filter → delay → output"), "got: {stdout}");
    assert!(stdout.contains("sine LFO"));
    assert!(stdout.contains("Connections:"));
    assert!(stdout.contains("lfo gain"));
}

#[test]
fn cli_route_flags_override_preset() {
    let output = efflux_bin()
        .args(["route", "--preset", "dub_echo", "--no-filter"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("source → delay → output"), "got: {stdout}");
}

#[test]
fn cli_route_filter_flags_conflict() {
    let output = efflux_bin()
        .args(["route", "--filter", "--no-filter"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// efflux render
// ---------------------------------------------------------------------------

#[test]
fn cli_render_writes_stereo_float_wav() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("note.wav");

    let output = efflux_bin()
        .args(["render", "--quiet", "--duration", "0.5", "--filter", "--lfo"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let (spec, samples) = read_wav(&path);
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 48000);
    assert_eq!(spec.bits_per_sample, 32);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);
    assert_eq!(samples.len(), 48000);
    assert!(samples.iter().all(|x| x.is_finite()));
    assert!(samples.iter().any(|&x| x.abs() > 0.01));
}

#[test]
fn cli_render_note_stops_without_delay() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dry.wav");

    let output = efflux_bin()
        .args([
            "render",
            "--quiet",
            "--duration",
            "1.0",
            "--note-length",
            "0.25",
            "--sample-rate",
            "44100",
        ])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let (spec, samples) = read_wav(&path);
    assert_eq!(spec.sample_rate, 44100);
    // Second half is silent once the one-shot note has stopped.
    let tail = &samples[samples.len() / 2..];
    assert!(tail.iter().all(|&x| x == 0.0));
}

#[test]
fn cli_render_delay_rings_after_note() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("echo.wav");

    let output = efflux_bin()
        .args([
            "render",
            "--quiet",
            "--duration",
            "1.0",
            "--note-length",
            "0.25",
            "--delay",
        ])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    // Default delay time is 0.5 s: the note's echo lands in the second half.
    let (_, samples) = read_wav(&path);
    let tail = &samples[samples.len() / 2..];
    assert!(tail.iter().any(|&x| x.abs() > 0.01));
}

#[test]
fn cli_render_with_preset_and_timeline() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("timeline.wav");

    let output = efflux_bin()
        .args([
            "render",
            "--quiet",
            "--preset",
            "wobble_bass",
            "--duration",
            "0.5",
            "--toggle-delay-at",
            "0.1",
            "--automate",
            "filter-freq=10@0.2",
            "--automate",
            "volume=50@0.3",
        ])
        .arg(&path)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let (_, samples) = read_wav(&path);
    assert_eq!(samples.len(), 48000);
}

#[test]
fn cli_render_rejects_bad_automation() {
    let dir = TempDir::new().unwrap();
    let output = efflux_bin()
        .args(["render", "--quiet", "--automate", "pitch=10@0"])
        .arg(dir.path().join("x.wav"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown automation target"), "got: {stderr}");
}

#[test]
fn cli_render_unknown_preset_fails() {
    let dir = TempDir::new().unwrap();
    let output = efflux_bin()
        .args(["render", "--quiet", "--preset", "nonexistent_preset_12345"])
        .arg(dir.path().join("x.wav"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!dir.path().join("x.wav").exists());
}

#[test]
fn cli_render_rejects_out_of_range_sample_rate() {
    let dir = TempDir::new().unwrap();
    let output = efflux_bin()
        .args(["render", "--quiet", "--sample-rate", "0"])
        .arg(dir.path().join("x.wav"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("sample_rate"));
    assert!(!dir.path().join("x.wav").exists());
}

#[test]
fn cli_route_off_flags_override_preset() {
    let output = efflux_bin()
        .args(["route", "--preset", "dub_echo", "--no-delay"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("source → filter → output"), "got: {stdout}");

    let output = efflux_bin()
        .args(["route", "--preset", "wobble_bass", "--no-lfo"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("LFO"));

    let output = efflux_bin()
        .args(["route", "--delay", "--no-delay"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// efflux presets
// ---------------------------------------------------------------------------

#[test]
fn cli_presets_list_factory() {
    let output = efflux_bin()
        .args(["presets", "list", "--factory"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Factory Presets"));
    for name in ["Init", "Wobble Bass", "Dub Echo", "Slapback"] {
        assert!(stdout.contains(name), "listing should contain '{name}'");
    }
    assert!(!stdout.contains("User Presets"));
}

#[test]
fn cli_presets_show() {
    let output = efflux_bin()
        .args(["presets", "show", "dub_echo"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Preset: Dub Echo"));
    assert!(stdout.contains("Delay [on]"));
    assert!(stdout.contains("pingpong"));
}

#[test]
fn cli_presets_save_then_validate_and_render() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mine.toml");

    let output = efflux_bin()
        .args([
            "presets",
            "save",
            "Mine",
            "--from",
            "slapback",
            "--filter",
            "--description",
            "slapback through the filter",
            "--output",
        ])
        .arg(&path)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "save failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains("name = \"Mine\""));
    assert!(saved.contains("slapback through the filter"));

    let output = efflux_bin()
        .args(["presets", "validate"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Mine: ok"));

    let output = efflux_bin()
        .args(["route", "--preset"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("source → filter → delay → output"));

    // Refuses to overwrite without --force.
    let output = efflux_bin()
        .args(["presets", "save", "Mine", "--output"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn cli_presets_validate_reports_every_problem() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        "name = \"Bad\"\n[filter]\nq = 0.0\nlfo = \"noise\"\n[delay]\ntime = 5.0\n",
    )
    .unwrap();

    let output = efflux_bin()
        .args(["presets", "validate"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Bad: 3 problem(s)"), "got: {stdout}");
    assert!(stdout.contains("filter.q"));
    assert!(stdout.contains("filter.lfo"));
    assert!(stdout.contains("delay.time"));
}
