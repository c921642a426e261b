//! Route inspection command.

use clap::Args;
use efflux_core::{AudioGraph, NodeId};
use efflux_modules::VoiceChain;

use super::common::{StageFlags, build_voice, load_preset};

#[derive(Args)]
pub struct RouteArgs {
    /// Start from a preset (name or path)
    #[arg(short, long)]
    preset: Option<String>,

    #[command(flatten)]
    stages: StageFlags,

    /// Also list every edge leaving the voice's nodes
    #[arg(short, long)]
    verbose: bool,
}

pub fn run(args: RouteArgs) -> anyhow::Result<()> {
    let preset = args.preset.as_deref().map(load_preset).transpose()?;
    let (graph, voice) = build_voice(preset.as_ref(), &args.stages, 48000, 128)?;

    println!("{}", voice.route());
    if voice.filter().is_lfo_enabled() {
        println!("  filter cutoff modulated by {} LFO", voice.filter().lfo_waveform());
    }

    if args.verbose {
        println!();
        println!("Connections:");
        for (label, node) in labelled_nodes(&voice) {
            for (to, target) in graph.connections_from(node) {
                println!("  {:10} -> {} ({})", label, node_label(&graph, &voice, to), target);
            }
        }
    }
    Ok(())
}

fn labelled_nodes(voice: &VoiceChain) -> [(&'static str, NodeId); 7] {
    [
        ("voice", voice.output()),
        ("lfo", voice.filter().lfo_node()),
        ("lfo gain", voice.filter().lfo_gain_node()),
        ("filter", voice.filter().filter_node()),
        ("delay in", voice.delay().input()),
        ("delay line", voice.delay().delay_node()),
        ("delay out", voice.delay().output()),
    ]
}

fn node_label(graph: &AudioGraph, voice: &VoiceChain, id: NodeId) -> String {
    if id == graph.destination() {
        return "output".to_string();
    }
    labelled_nodes(voice)
        .into_iter()
        .find(|(_, node)| *node == id)
        .map_or_else(|| id.to_string(), |(label, _)| label.to_string())
}
