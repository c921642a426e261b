//! Offline note rendering command.
//!
//! Plays one note through a voice chain and writes the result. Timed
//! actions (delay toggles, automation) split the render into segments so
//! each one lands on its frame.

use clap::{Args, ValueEnum};
use efflux_config::InstrumentPreset;
use efflux_config::validation::{MAX_SAMPLE_RATE, MIN_SAMPLE_RATE, check_range};
use efflux_core::{AudioGraph, Waveform, midi_to_hz};
use efflux_modules::{AutomationEvent, AutomationTarget, VoiceChain};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{debug, info};

use super::common::{StageFlags, build_voice, load_preset};
use crate::wav::write_wav_stereo;

/// Frames rendered between progress updates.
const PROGRESS_CHUNK: usize = 4096;

/// Note waveforms for the CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliWaveform {
    Sine,
    Square,
    #[default]
    Saw,
    Triangle,
}

impl From<CliWaveform> for Waveform {
    fn from(w: CliWaveform) -> Self {
        match w {
            CliWaveform::Sine => Waveform::Sine,
            CliWaveform::Square => Waveform::Square,
            CliWaveform::Saw => Waveform::Sawtooth,
            CliWaveform::Triangle => Waveform::Triangle,
        }
    }
}

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Preset name or path (TOML)
    #[arg(short, long)]
    preset: Option<String>,

    /// MIDI note number
    #[arg(long, default_value = "57")]
    note: u8,

    /// Note waveform
    #[arg(long, value_enum, default_value_t = CliWaveform::Saw)]
    waveform: CliWaveform,

    /// Total duration in seconds
    #[arg(long, default_value = "2.0")]
    duration: f32,

    /// Seconds the note sounds before it is stopped
    #[arg(long, default_value = "0.5")]
    note_length: f32,

    #[command(flatten)]
    stages: StageFlags,

    /// Flip the delay stage at this time in seconds
    #[arg(long, value_name = "SECONDS")]
    toggle_delay_at: Option<f32>,

    /// Automation event, e.g. "filter-freq=20@0.5" (repeatable)
    #[arg(long, value_name = "TARGET=PERCENT@SECONDS", value_parser = parse_automation)]
    automate: Vec<(f32, AutomationEvent)>,

    /// Sample rate (defaults to the preset's)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Processing block size
    #[arg(long, default_value = "128")]
    block_size: usize,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

/// Parse `TARGET=PERCENT@SECONDS` for clap's `value_parser`.
pub fn parse_automation(s: &str) -> Result<(f32, AutomationEvent), String> {
    let (assignment, time) = s
        .split_once('@')
        .ok_or_else(|| format!("Invalid automation '{s}' (expected TARGET=PERCENT@SECONDS)"))?;
    let (target, percent) = assignment
        .split_once('=')
        .ok_or_else(|| format!("Invalid automation '{s}' (expected TARGET=PERCENT@SECONDS)"))?;

    let target: AutomationTarget = target.trim().parse().map_err(|e| {
        let names: Vec<_> = AutomationTarget::ALL.iter().map(|t| t.name()).collect();
        format!("{e} (expected one of: {})", names.join(", "))
    })?;
    let percent: f32 = percent
        .trim()
        .parse()
        .map_err(|_| format!("Invalid percentage '{percent}'"))?;
    let time: f32 = time
        .trim()
        .parse()
        .map_err(|_| format!("Invalid time '{time}'"))?;
    if time < 0.0 {
        return Err(format!("Automation time must not be negative: {time}"));
    }

    Ok((time, AutomationEvent::new(target, percent)))
}

/// Something that happens to the voice at a given frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Flip the delay stage.
    ToggleDelay,
    /// Apply an automation event.
    Automate(AutomationEvent),
}

impl Action {
    fn apply(&self, voice: &mut VoiceChain, graph: &mut AudioGraph) -> anyhow::Result<()> {
        match self {
            Action::ToggleDelay => {
                let enabled = !voice.delay().is_enabled();
                voice.set_delay_enabled(graph, enabled)?;
                debug!(enabled, route = %voice.route(), "delay toggled");
            }
            Action::Automate(event) => {
                event.apply(voice, graph)?;
                debug!(target = %event.target, value = event.scaled_value(), "automation");
            }
        }
        Ok(())
    }
}

/// Renders `total_frames`, applying each `(frame, action)` before the frame
/// it names. Actions at or past the end are applied after the last frame.
pub fn render_timeline(
    graph: &mut AudioGraph,
    voice: &mut VoiceChain,
    total_frames: usize,
    mut actions: Vec<(usize, Action)>,
    progress: &ProgressBar,
) -> anyhow::Result<(Vec<f32>, Vec<f32>)> {
    actions.sort_by_key(|(frame, _)| *frame);

    let mut left = Vec::with_capacity(total_frames);
    let mut right = Vec::with_capacity(total_frames);
    for (frame, action) in &actions {
        render_until(graph, (*frame).min(total_frames), &mut left, &mut right, progress)?;
        action.apply(voice, graph)?;
    }
    render_until(graph, total_frames, &mut left, &mut right, progress)?;
    Ok((left, right))
}

fn render_until(
    graph: &mut AudioGraph,
    end: usize,
    left: &mut Vec<f32>,
    right: &mut Vec<f32>,
    progress: &ProgressBar,
) -> anyhow::Result<()> {
    while left.len() < end {
        let frames = (end - left.len()).min(PROGRESS_CHUNK);
        let (l, r) = graph.render(frames)?;
        left.extend_from_slice(&l);
        right.extend_from_slice(&r);
        progress.inc(frames as u64);
    }
    Ok(())
}

/// The `--sample-rate` flag, else the preset's rate, else 48 kHz.
fn resolve_sample_rate(flag: Option<u32>, preset: Option<&InstrumentPreset>) -> anyhow::Result<u32> {
    let rate = flag.or(preset.map(|p| p.sample_rate)).unwrap_or(48000);
    check_range(
        "sample_rate",
        rate as f32,
        MIN_SAMPLE_RATE as f32,
        MAX_SAMPLE_RATE as f32,
    )?;
    Ok(rate)
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if args.duration <= 0.0 {
        anyhow::bail!("Duration must be positive, got {}", args.duration);
    }

    let preset = args.preset.as_deref().map(load_preset).transpose()?;
    let sample_rate = resolve_sample_rate(args.sample_rate, preset.as_ref())?;

    let (mut graph, mut voice) =
        build_voice(preset.as_ref(), &args.stages, sample_rate, args.block_size)?;

    let frequency = midi_to_hz(args.note);
    let note = graph.add_oscillator(args.waveform.into());
    graph.set_param_immediate(note, efflux_core::ParamKind::Frequency, frequency)?;
    graph.start(note, 0.0)?;
    if args.note_length < args.duration {
        graph.stop(note, f64::from(args.note_length.max(0.0)))?;
    }
    voice.attach_source(&mut graph, note)?;

    let to_frame = |seconds: f32| (seconds * sample_rate as f32).round() as usize;
    let total_frames = to_frame(args.duration);
    let mut actions: Vec<(usize, Action)> = args
        .automate
        .iter()
        .map(|(time, event)| (to_frame(*time), Action::Automate(*event)))
        .collect();
    if let Some(time) = args.toggle_delay_at {
        actions.push((to_frame(time.max(0.0)), Action::ToggleDelay));
    }

    info!(
        output = %args.output.display(),
        note = args.note,
        frequency,
        sample_rate,
        route = %voice.route(),
        "rendering"
    );

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(total_frames as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames")?
                .progress_chars("##-"),
        );
        pb
    };

    let (left, right) = render_timeline(&mut graph, &mut voice, total_frames, actions, &progress)?;
    progress.finish_and_clear();

    let peak = left
        .iter()
        .chain(&right)
        .fold(0.0f32, |peak, x| peak.max(x.abs()));
    write_wav_stereo(&args.output, &left, &right, sample_rate)?;

    info!(frames = total_frames, peak, route = %voice.route(), "render complete");
    println!(
        "Wrote {} ({:.2}s, {} Hz, peak {:.3})",
        args.output.display(),
        args.duration,
        sample_rate,
        peak
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use efflux_core::ParamKind;

    #[test]
    fn test_parse_automation() {
        let (time, event) = parse_automation("filter-freq=25@1.5").unwrap();
        assert_eq!(time, 1.5);
        assert_eq!(event.target, AutomationTarget::FilterFrequency);
        assert_eq!(event.percent, 25.0);

        assert!(parse_automation("filter-freq=25").is_err());
        assert!(parse_automation("filter-freq@1").is_err());
        assert!(parse_automation("pitch=10@0").unwrap_err().contains("delay-time"));
        assert!(parse_automation("volume=ten@0").is_err());
        assert!(parse_automation("volume=10@-1").is_err());
    }

    #[test]
    fn test_sample_rate_resolution() {
        let preset = InstrumentPreset::new("Low").with_sample_rate(22050);
        assert_eq!(resolve_sample_rate(None, None).unwrap(), 48000);
        assert_eq!(resolve_sample_rate(None, Some(&preset)).unwrap(), 22050);
        assert_eq!(resolve_sample_rate(Some(96000), Some(&preset)).unwrap(), 96000);

        assert!(resolve_sample_rate(Some(0), None).is_err());
        let err = resolve_sample_rate(Some(400_000), None).unwrap_err();
        assert!(err.to_string().contains("sample_rate"));
    }

    #[test]
    fn test_waveform_mapping() {
        assert_eq!(Waveform::from(CliWaveform::Saw), Waveform::Sawtooth);
        assert_eq!(Waveform::from(CliWaveform::default()), Waveform::Sawtooth);
    }

    #[test]
    fn test_timeline_applies_actions_in_order() {
        let (mut graph, mut voice) =
            build_voice(None, &StageFlags::default(), 48000, 128).unwrap();
        let actions = vec![
            (
                2000,
                Action::Automate(AutomationEvent::new(AutomationTarget::Volume, 50.0)),
            ),
            (1000, Action::ToggleDelay),
        ];

        let (left, right) =
            render_timeline(&mut graph, &mut voice, 3000, actions, &ProgressBar::hidden())
                .unwrap();
        assert_eq!(left.len(), 3000);
        assert_eq!(right.len(), 3000);
        assert!(voice.delay().is_enabled());
        assert_eq!(graph.param(voice.output(), ParamKind::Gain), Ok(0.5));
        assert_eq!(graph.current_frame(), 3000);
    }

    #[test]
    fn test_actions_past_end_still_apply() {
        let (mut graph, mut voice) =
            build_voice(None, &StageFlags::default(), 48000, 128).unwrap();
        let (left, _) = render_timeline(
            &mut graph,
            &mut voice,
            500,
            vec![(10_000, Action::ToggleDelay)],
            &ProgressBar::hidden(),
        )
        .unwrap();
        assert_eq!(left.len(), 500);
        assert!(voice.delay().is_enabled());
    }
}
