//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::GatherMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total gathered sets emitted
    pub sets_gathered: u64,

    /// Sets emitted with at least one source missing
    pub sets_incomplete: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of sources that were active
    pub active_sources: usize,

    /// Number of sinks that received data
    pub active_sinks: usize,

    /// Gather engine metrics aggregator
    pub gather_metrics: GatherMetricsAggregator,
}

impl PipelineStats {
    /// Calculate gathered sets per second throughput
    pub fn sets_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.sets_gathered as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate incomplete rate as percentage
    #[allow(dead_code)]
    pub fn incomplete_rate(&self) -> f64 {
        if self.sets_gathered > 0 {
            (self.sets_incomplete as f64 / self.sets_gathered as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Sets gathered: {}", self.sets_gathered);
        println!("   ├─ Sets incomplete: {}", self.sets_incomplete);
        println!("   ├─ Sets/s: {:.2}", self.sets_per_second());
        println!("   ├─ Active sources: {}", self.active_sources);
        println!("   └─ Active sinks: {}", self.active_sinks);

        let summary = self.gather_metrics.summary();

        println!("\n📈 Gather Engine Metrics");
        println!("   ├─ Slot overwrites: {}", summary.overwrites);
        println!("   ├─ Discarded pushes: {}", summary.discards);
        println!("   ├─ Window jumps: {}", summary.jumps);
        println!("   ├─ Invalid pops: {}", summary.invalid_pops);
        println!("   ├─ Frames cleared by jumps: {}", summary.frames_cleared);
        println!("   └─ Set skew (us): {}", summary.set_skew_us);

        if !summary.source_missing_counts.is_empty() {
            println!("\n⚠️  Missing Source Counts");
            let mut indexes: Vec<_> = summary.source_missing_counts.iter().collect();
            indexes.sort_by_key(|(index, _)| **index);
            for (index, count) in indexes {
                println!("   ├─ source {}: {}", index, count);
            }
        }

        println!();
    }
}
