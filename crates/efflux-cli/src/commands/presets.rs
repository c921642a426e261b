//! Preset management commands.
//!
//! Lists, shows, validates and saves instrument presets.

use clap::{Args, Subcommand};
use efflux_config::{
    InstrumentPreset, ensure_user_presets_dir, factory_presets, list_user_presets,
    preset_name_from_path, user_presets_dir, validate_preset,
};
use std::path::PathBuf;
use tracing::info;

use super::common::{StageFlags, build_voice, load_preset};

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List available presets (factory and user)
    List {
        /// Show only factory presets
        #[arg(long, conflicts_with = "user")]
        factory: bool,

        /// Show only user presets
        #[arg(long)]
        user: bool,
    },

    /// Show details of a preset
    Show {
        /// Preset name or path
        name: String,
    },

    /// Check a preset's values and names
    Validate {
        /// Preset name or path
        name: String,
    },

    /// Save a preset built from another preset plus stage flags
    Save {
        /// Name for the new preset
        name: String,

        /// Preset to start from (engine defaults otherwise)
        #[arg(long)]
        from: Option<String>,

        #[command(flatten)]
        stages: StageFlags,

        /// Description of the preset
        #[arg(short, long)]
        description: Option<String>,

        /// Write here instead of the user presets directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite if the file already exists
        #[arg(long)]
        force: bool,
    },

    /// Show the user presets directory
    Paths,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command {
        PresetsCommand::List { factory, user } => list_presets(factory, user),
        PresetsCommand::Show { name } => show_preset(&name),
        PresetsCommand::Validate { name } => validate(&name),
        PresetsCommand::Save {
            name,
            from,
            stages,
            description,
            output,
            force,
        } => save_preset(&name, from.as_deref(), &stages, description, output, force),
        PresetsCommand::Paths => {
            println!("User presets: {}", user_presets_dir().display());
            Ok(())
        }
    }
}

fn list_presets(factory_only: bool, user_only: bool) -> anyhow::Result<()> {
    if !user_only {
        println!("Factory Presets:");
        println!("================");
        for preset in factory_presets() {
            let desc = preset.description.as_deref().unwrap_or("");
            println!("  {:20} - {}", preset.name, desc);
        }
        println!();
    }

    if !factory_only {
        println!("User Presets:");
        println!("=============");
        let user_presets = list_user_presets();
        if user_presets.is_empty() {
            println!("  (none)");
            println!();
            println!("  Create a preset with: efflux presets save <name> --from <preset>");
        }
        for path in user_presets {
            let name = preset_name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
            match InstrumentPreset::load(&path) {
                Ok(preset) => {
                    let desc = preset.description.as_deref().unwrap_or("");
                    println!("  {:20} - {}", name, desc);
                }
                Err(_) => println!("  {:20} - (error loading)", name),
            }
        }
        println!();
    }

    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

fn show_preset(name: &str) -> anyhow::Result<()> {
    let preset = load_preset(name)?;

    println!("Preset: {}", preset.name);
    println!("{}", "=".repeat(8 + preset.name.len()));
    println!();

    if let Some(desc) = &preset.description {
        println!("Description: {}", desc);
        println!();
    }

    println!("Sample Rate: {} Hz", preset.sample_rate);
    println!("Volume:      {:.2}", preset.volume);
    println!();

    let filter = &preset.filter;
    println!("Filter [{}]", on_off(filter.enabled));
    println!("  type       = {}", filter.filter_type);
    println!("  frequency  = {} Hz", filter.frequency);
    println!("  q          = {}", filter.q);
    println!("  lfo        = {}", filter.lfo);
    println!("  lfo_speed  = {} Hz", filter.lfo_speed);
    println!("  lfo_depth  = {} %", filter.lfo_depth);
    println!();

    let delay = &preset.delay;
    println!("Delay [{}]", on_off(delay.enabled));
    println!("  type          = {}", delay.delay_type);
    println!("  time          = {} s", delay.time);
    println!("  feedback      = {}", delay.feedback);
    println!("  stereo_offset = {} s", delay.stereo_offset);
    println!("  cutoff        = {} Hz", delay.cutoff);
    Ok(())
}

fn validate(name: &str) -> anyhow::Result<()> {
    let preset = load_preset(name)?;
    match validate_preset(&preset) {
        Ok(()) => {
            println!("{}: ok", preset.name);
            Ok(())
        }
        Err(err) => {
            let problems = err.errors();
            println!("{}: {} problem(s)", preset.name, problems.len());
            for problem in &problems {
                println!("  - {problem}");
            }
            anyhow::bail!("preset '{}' is invalid", preset.name)
        }
    }
}

fn save_preset(
    name: &str,
    from: Option<&str>,
    stages: &StageFlags,
    description: Option<String>,
    output: Option<PathBuf>,
    force: bool,
) -> anyhow::Result<()> {
    let base = from.map(load_preset).transpose()?;
    let sample_rate = base.as_ref().map_or(48000, |p| p.sample_rate);
    let (graph, voice) = build_voice(base.as_ref(), stages, sample_rate, 128)?;

    let mut preset = InstrumentPreset::capture(name, &voice, &graph)?;
    preset.description = description.or_else(|| base.and_then(|b| b.description));

    let path = match output {
        Some(path) => path,
        None => ensure_user_presets_dir()?.join(format!("{name}.toml")),
    };
    if path.exists() && !force {
        anyhow::bail!(
            "Preset file '{}' already exists. Use --force to overwrite.",
            path.display()
        );
    }

    preset.save(&path)?;
    info!(path = %path.display(), route = %voice.route(), "preset saved");
    println!("Saved preset '{}' to {}", name, path.display());
    Ok(())
}
