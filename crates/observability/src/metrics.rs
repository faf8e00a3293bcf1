//! Gather pipeline metrics
//!
//! Records per-set Prometheus metrics and keeps an in-memory aggregate
//! for the end-of-run summary.

use std::collections::HashMap;

use contracts::GatheredSet;
use metrics::{counter, gauge, histogram};

/// Record metrics for one emitted set
///
/// Call once per `GatheredSet` as it leaves the gather loop.
pub fn record_gather_metrics(set: &GatheredSet) {
    counter!("evgather_sets_total").increment(1);

    // Sequence number (reveals dropped sets downstream)
    gauge!("evgather_last_seq").set(set.seq as f64);

    // Window occupancy at emission time
    gauge!("evgather_occupied_slots").set(set.meta.window.occupied_slots as f64);

    // Current anchor position in modular event space
    if let Some(anchor) = set.meta.window.anchor {
        gauge!("evgather_window_anchor").set(anchor as f64);
    }

    // Lifetime buffer counters, exported as gauges since the window owns
    // the running totals
    let window = &set.meta.window;
    gauge!("evgather_window_overwrites").set(window.overwrites as f64);
    gauge!("evgather_window_discards").set(window.discards as f64);
    gauge!("evgather_window_jumps").set(window.jumps as f64);
    gauge!("evgather_window_invalid_pops").set(window.invalid_pops as f64);
    gauge!("evgather_window_frames_cleared").set(window.frames_cleared as f64);

    // Missing sources
    let missing_count = set.meta.missing_sources.len();
    gauge!("evgather_sources_missing").set(missing_count as f64);
    if missing_count > 0 {
        counter!("evgather_incomplete_sets_total").increment(1);
        for index in &set.meta.missing_sources {
            counter!("evgather_source_missing_total", "source_index" => index.to_string())
                .increment(1);
        }
    }

    // Intra-set timestamp skew between earliest and latest frame
    if let Some(skew_us) = set_skew_us(set) {
        histogram!("evgather_set_skew_us").record(skew_us as f64);
    }
}

/// Record a frame fetched from a source
pub fn record_frame_fetched(source_id: &str) {
    counter!(
        "evgather_frames_fetched_total",
        "source_id" => source_id.to_string()
    )
    .increment(1);
}

/// Record a set handed to a sink
pub fn record_set_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "evgather_sets_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record the window occupancy
pub fn record_window_depth(depth: usize) {
    gauge!("evgather_window_depth").set(depth as f64);
}

fn set_skew_us(set: &GatheredSet) -> Option<u64> {
    let timestamps: Vec<u64> = set
        .frames
        .iter()
        .flatten()
        .map(|f| f.footer.timestamp_us)
        .collect();
    let min = timestamps.iter().min()?;
    let max = timestamps.iter().max()?;
    Some(max - min)
}

/// In-memory metrics aggregator
///
/// Aggregates per-set statistics for the end-of-run summary.
#[derive(Debug, Clone, Default)]
pub struct GatherMetricsAggregator {
    /// Total emitted sets
    pub total_sets: u64,

    /// Sets with every slot populated
    pub complete_sets: u64,

    /// Total empty slots across all emitted sets
    pub total_missing_slots: u64,

    /// Last window snapshot seen (carries the lifetime counters)
    pub last_window: contracts::WindowStats,

    /// Intra-set timestamp skew statistics (microseconds)
    pub skew_stats: RunningStats,

    /// Per-source-index missing counts
    pub missing_counts: HashMap<usize, u64>,
}

impl GatherMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one emitted set into the aggregate
    pub fn update(&mut self, set: &GatheredSet) {
        self.total_sets += 1;
        if set.is_complete() {
            self.complete_sets += 1;
        }

        self.total_missing_slots += set.meta.missing_sources.len() as u64;
        for index in &set.meta.missing_sources {
            *self.missing_counts.entry(*index).or_insert(0) += 1;
        }

        self.last_window = set.meta.window;

        if let Some(skew_us) = set_skew_us(set) {
            self.skew_stats.push(skew_us as f64);
        }
    }

    /// Produce the summary report
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_sets: self.total_sets,
            complete_sets: self.complete_sets,
            incomplete_sets: self.total_sets - self.complete_sets,
            completeness_rate: if self.total_sets > 0 {
                self.complete_sets as f64 / self.total_sets as f64 * 100.0
            } else {
                0.0
            },
            overwrites: self.last_window.overwrites,
            discards: self.last_window.discards,
            jumps: self.last_window.jumps,
            invalid_pops: self.last_window.invalid_pops,
            incomplete_pops: self.last_window.incomplete_pops,
            frames_cleared: self.last_window.frames_cleared,
            set_skew_us: StatsSummary::from(&self.skew_stats),
            source_missing_counts: self.missing_counts.clone(),
        }
    }

    /// Reset all aggregates
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Summary report
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_sets: u64,
    pub complete_sets: u64,
    pub incomplete_sets: u64,
    pub completeness_rate: f64,
    pub overwrites: u64,
    pub discards: u64,
    pub jumps: u64,
    pub invalid_pops: u64,
    pub incomplete_pops: u64,
    pub frames_cleared: u64,
    pub set_skew_us: StatsSummary,
    pub source_missing_counts: HashMap<usize, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Gather Metrics Summary ===")?;
        writeln!(f, "Total sets: {}", self.total_sets)?;
        writeln!(
            f,
            "Complete sets: {} ({:.2}%)",
            self.complete_sets, self.completeness_rate
        )?;
        writeln!(f, "Incomplete sets: {}", self.incomplete_sets)?;
        writeln!(f, "Slot overwrites: {}", self.overwrites)?;
        writeln!(f, "Discarded pushes: {}", self.discards)?;
        writeln!(f, "Window jumps: {}", self.jumps)?;
        writeln!(f, "Invalid pops: {}", self.invalid_pops)?;
        writeln!(f, "Incomplete pops: {}", self.incomplete_pops)?;
        writeln!(f, "Frames cleared by jumps: {}", self.frames_cleared)?;
        writeln!(f, "Set skew (us): {}", self.set_skew_us)?;

        if !self.source_missing_counts.is_empty() {
            writeln!(f, "Missing source counts:")?;
            let mut indexes: Vec<_> = self.source_missing_counts.iter().collect();
            indexes.sort_by_key(|(index, _)| **index);
            for (index, count) in indexes {
                writeln!(f, "  source {}: {}", index, count)?;
            }
        }

        Ok(())
    }
}

/// Stats summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Push a new sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
