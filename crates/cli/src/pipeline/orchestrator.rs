//! Pipeline orchestrator - coordinates all components.
//!
//! Wires the acquisition sources into the gather loop and fans gathered
//! sets out to the configured sinks.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{GatheredSet, RigBlueprint};
use gather_engine::GatherLoop;
use observability::record_gather_metrics;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The rig blueprint configuration
    pub blueprint: RigBlueprint,

    /// Maximum number of sets to gather (None = unlimited)
    pub max_sets: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Channel buffer size
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Build Sources
        info!("Building frame sources from blueprint...");
        let sources = acquisition::build_sources(blueprint).context("Failed to build sources")?;
        let active_sources = sources.len();

        info!(active_sources, "Frame sources ready");

        // Setup Dispatcher
        info!("Setting up dispatcher...");
        let (dispatch_tx, dispatch_rx) = mpsc::channel::<GatheredSet>(self.config.buffer_size);

        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - gathered sets will be dropped");
        }

        let dispatcher = dispatcher::create_dispatcher(blueprint.sinks.clone(), dispatch_rx)
            .context("Failed to create dispatcher")?;

        let active_sinks = blueprint.sinks.len();
        let dispatcher_handle = dispatcher.spawn();

        info!(active_sinks, "Dispatcher started");

        // Start Gather Loop
        let (gather_tx, mut gather_rx) = mpsc::channel::<GatheredSet>(self.config.buffer_size);
        let gather_loop = GatherLoop::new(blueprint.gather.clone());
        let stop = gather_loop.stop_handle();
        let gather_handle = tokio::spawn(gather_loop.run(sources, gather_tx));

        let max_sets = self.config.max_sets;

        info!(max_sets = ?max_sets, "Pipeline running");

        // Pipeline processing task
        let pipeline_task = async move {
            let mut stats = PipelineStats {
                active_sources,
                active_sinks,
                ..Default::default()
            };

            while let Some(set) = gather_rx.recv().await {
                stats.sets_gathered += 1;
                if !set.is_complete() {
                    stats.sets_incomplete += 1;
                }

                record_gather_metrics(&set);
                stats.gather_metrics.update(&set);

                info!(
                    seq = set.seq,
                    event_number = set.event_number,
                    present = set.present_count(),
                    missing = set.meta.missing_sources.len(),
                    "Gathered set produced"
                );

                if dispatch_tx.send(set).await.is_err() {
                    warn!("Dispatcher channel closed");
                    break;
                }

                // Check max sets limit
                if let Some(max) = max_sets {
                    if stats.sets_gathered >= max {
                        info!(sets = stats.sets_gathered, "Reached max sets limit");
                        break;
                    }
                }
            }

            stats
        };

        // Run with optional timeout
        let stats = if let Some(timeout) = self.config.timeout {
            match tokio::time::timeout(timeout, pipeline_task).await {
                Ok(stats) => stats,
                Err(_) => {
                    warn!(timeout_secs = timeout.as_secs(), "Pipeline timed out");
                    PipelineStats::default()
                }
            }
        } else {
            pipeline_task.await
        };

        // Shutdown
        info!("Shutting down pipeline...");
        stop.stop();
        let _ = tokio::time::timeout(Duration::from_secs(5), gather_handle).await;

        // Wait for dispatcher to flush
        let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;

        let mut final_stats = stats;
        final_stats.duration = start_time.elapsed();

        info!(
            duration_secs = final_stats.duration.as_secs_f64(),
            sps = format!("{:.2}", final_stats.sets_per_second()),
            "Pipeline shutdown complete"
        );

        Ok(final_stats)
    }
}
