//! Gather engine configuration contracts shared across crates.

use serde::{Deserialize, Serialize};

/// Gather engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatherConfig {
    /// Event window buffer tuning
    #[serde(default)]
    pub window: WindowConfig,

    /// Execution mode for the gather loop
    #[serde(default)]
    pub concurrency: ConcurrencyMode,

    /// Sleep between fetch attempts when no source had data (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            concurrency: ConcurrencyMode::default(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    20
}

/// Event window buffer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window capacity in events (buffer rows)
    pub rows: usize,

    /// Wrap period of the hardware event counter
    #[serde(default = "default_event_modulus")]
    pub event_modulus: u32,

    /// Consecutive stale-looking pushes tolerated before a forced jump
    #[serde(default = "default_discard_threshold")]
    pub discard_threshold: u32,

    /// Forward distance beyond which an out-of-window event counts as
    /// stale rather than as evidence the window is behind.
    /// `None` means half the event modulus; the half-period split is a
    /// heuristic, so it stays tunable.
    #[serde(default)]
    pub stale_cutoff: Option<u32>,
}

impl WindowConfig {
    /// The stale/behind classification threshold actually in effect.
    pub fn effective_stale_cutoff(&self) -> u32 {
        self.stale_cutoff.unwrap_or(self.event_modulus / 2)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            event_modulus: default_event_modulus(),
            discard_threshold: default_discard_threshold(),
            stale_cutoff: None,
        }
    }
}

fn default_event_modulus() -> u32 {
    1 << 16
}

fn default_discard_threshold() -> u32 {
    20
}

/// How the gather loop drives its sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyMode {
    /// One control flow polls every source round-robin; the buffer is
    /// accessed without locking.
    #[default]
    SingleThreaded,
    /// One worker per source against a shared, mutex-guarded buffer.
    MultiThreaded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatherConfig::default();
        assert_eq!(config.window.event_modulus, 65536);
        assert_eq!(config.window.discard_threshold, 20);
        assert_eq!(config.window.effective_stale_cutoff(), 32768);
        assert_eq!(config.poll_interval_ms, 20);
        assert_eq!(config.concurrency, ConcurrencyMode::SingleThreaded);
    }

    #[test]
    fn test_stale_cutoff_override() {
        let config = WindowConfig {
            stale_cutoff: Some(100),
            ..Default::default()
        };
        assert_eq!(config.effective_stale_cutoff(), 100);
    }
}
