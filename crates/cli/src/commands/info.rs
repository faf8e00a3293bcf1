//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    gather: GatherInfo,
    sources: Vec<SourceInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct GatherInfo {
    window_rows: usize,
    event_modulus: u32,
    stale_cutoff: u32,
    discard_threshold: u32,
    concurrency: String,
    poll_interval_ms: u64,
}

#[derive(Serialize)]
struct SourceInfo {
    index: usize,
    id: String,
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replay_path: Option<String>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::RigBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sources = blueprint
        .sources
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let is_mock = s.kind == contracts::SourceKind::Mock;
            SourceInfo {
                index,
                id: s.id.clone(),
                kind: format!("{:?}", s.kind),
                frequency_hz: (args.sources && is_mock).then_some(s.frequency_hz),
                event_offset: (args.sources && is_mock).then_some(s.event_offset),
                replay_path: if args.sources {
                    s.replay_path.as_ref().map(|p| p.display().to_string())
                } else {
                    None
                },
            }
        })
        .collect();

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    let window = &blueprint.gather.window;
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        gather: GatherInfo {
            window_rows: window.rows,
            event_modulus: window.event_modulus,
            stale_cutoff: window.effective_stale_cutoff(),
            discard_threshold: window.discard_threshold,
            concurrency: format!("{:?}", blueprint.gather.concurrency),
            poll_interval_ms: blueprint.gather.poll_interval_ms,
        },
        sources,
        sinks,
    }
}

fn print_config_info(blueprint: &contracts::RigBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 evgather Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let window = &blueprint.gather.window;
    println!("⚙️  Gather Settings");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Window rows: {}", window.rows);
    println!("   ├─ Event modulus: {}", window.event_modulus);
    println!("   ├─ Stale cutoff: {}", window.effective_stale_cutoff());
    println!("   ├─ Discard threshold: {}", window.discard_threshold);
    println!("   ├─ Concurrency: {:?}", blueprint.gather.concurrency);
    println!(
        "   └─ Poll interval: {} ms",
        blueprint.gather.poll_interval_ms
    );

    println!("\n📡 Sources ({})", blueprint.source_count());
    for (i, source) in blueprint.sources.iter().enumerate() {
        let is_last = i == blueprint.sources.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };

        if args.sources {
            match source.kind {
                contracts::SourceKind::Mock => println!(
                    "   {} [{}] {} (Mock, {} Hz, offset {})",
                    prefix, i, source.id, source.frequency_hz, source.event_offset
                ),
                contracts::SourceKind::Replay => println!(
                    "   {} [{}] {} (Replay, {:?}, x{})",
                    prefix, i, source.id, source.replay_path, source.speed_multiplier
                ),
            }
        } else {
            println!("   {} [{}] {} ({:?})", prefix, i, source.id, source.kind);
        }
    }

    if !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            if args.sinks {
                println!(
                    "   {} {} ({:?}, queue {})",
                    prefix, sink.name, sink.sink_type, sink.queue_capacity
                );
            } else {
                println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);
            }
        }
    }

    println!();
}
