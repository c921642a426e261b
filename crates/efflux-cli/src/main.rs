//! Efflux CLI - render voices through the effects engine.

mod commands;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "efflux")]
#[command(author, version, about = "Efflux voice effects engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a note through a voice chain to a WAV file
    Render(commands::render::RenderArgs),

    /// Print the route a set of stage flags produces
    Route(commands::route::RouteArgs),

    /// List, show, validate and save instrument presets
    Presets(commands::presets::PresetsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Route(args) => commands::route::run(args),
        Commands::Presets(args) => commands::presets::run(args),
    }
}
