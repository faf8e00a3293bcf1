//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(concurrency) = args.concurrency {
        info!(mode = ?concurrency, "Overriding concurrency mode from CLI");
        blueprint.gather.concurrency = concurrency.into();
    }
    if let Some(poll_interval_ms) = args.poll_interval_ms {
        info!(poll_interval_ms, "Overriding poll interval from CLI");
        blueprint.gather.poll_interval_ms = poll_interval_ms;
    }

    info!(
        sources = blueprint.source_count(),
        sinks = blueprint.sinks.len(),
        rows = blueprint.gather.window.rows,
        event_modulus = blueprint.gather.window.event_modulus,
        concurrency = ?blueprint.gather.concurrency,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        max_sets: if args.max_sets == 0 {
            None
        } else {
            Some(args.max_sets)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        sets_gathered = stats.sets_gathered,
                        sets_incomplete = stats.sets_incomplete,
                        duration_secs = stats.duration.as_secs_f64(),
                        sps = format!("{:.2}", stats.sets_per_second()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("evgather finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::RigBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Gather:");
    println!("  Window rows: {}", blueprint.gather.window.rows);
    println!(
        "  Event modulus: {}",
        blueprint.gather.window.event_modulus
    );
    println!(
        "  Stale cutoff: {}",
        blueprint.gather.window.effective_stale_cutoff()
    );
    println!(
        "  Discard threshold: {}",
        blueprint.gather.window.discard_threshold
    );
    println!("  Concurrency: {:?}", blueprint.gather.concurrency);
    println!("  Poll interval: {} ms", blueprint.gather.poll_interval_ms);

    println!("\nSources ({}):", blueprint.source_count());
    for (index, source) in blueprint.sources.iter().enumerate() {
        println!("  [{}] {} ({:?})", index, source.id, source.kind);
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
