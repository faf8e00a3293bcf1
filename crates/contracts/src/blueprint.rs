//! RigBlueprint - config loader output
//!
//! Describes a complete acquisition rig: frame sources, gather engine
//! tuning, output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::GatherConfig;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete rig configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Gather engine settings
    #[serde(default)]
    pub gather: GatherConfig,

    /// Frame source definitions, in source-index order
    pub sources: Vec<SourceConfig>,

    /// Output routing configuration
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

impl RigBlueprint {
    /// Source count S: one slot per configured source.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

/// Frame source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Unique identifier
    pub id: String,

    /// Source kind
    pub kind: SourceKind,

    /// Emission frequency (Hz), mock only; must be > 0
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: f64,

    /// Constant offset added to the mock event counter (mod event_modulus).
    /// Lets a test rig emulate sources whose counters disagree.
    #[serde(default)]
    pub event_offset: u32,

    /// Synthetic payload size in bytes (mock only)
    #[serde(default = "default_payload_len")]
    pub payload_len: usize,

    /// Probability of silently losing an emitted frame (mock only)
    #[serde(default)]
    pub drop_probability: f64,

    /// RNG seed for reproducible frame loss (mock only)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Recording file to replay (replay only)
    #[serde(default)]
    pub replay_path: Option<PathBuf>,

    /// Replay speed multiplier (1.0 = original pacing)
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f64,

    /// Restart the recording when it runs out
    #[serde(default)]
    pub loop_playback: bool,
}

fn default_frequency_hz() -> f64 {
    50.0
}

fn default_payload_len() -> usize {
    256
}

fn default_speed_multiplier() -> f64 {
    1.0
}

/// Source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Synthetic clock-driven generator
    Mock,
    /// JSONL recording playback
    Replay,
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink kind
    pub sink_type: SinkType,

    /// Per-sink queue capacity (frames dropped when full)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Sink-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    64
}

/// Sink kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Tracing summary per gathered set
    Log,
    /// One JSON line per gathered set
    JsonlFile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blueprint_json_roundtrip() {
        let json = r#"{
            "sources": [
                { "id": "head0", "kind": "mock" },
                { "id": "head1", "kind": "mock", "event_offset": 2 }
            ],
            "sinks": [
                { "name": "console", "sink_type": "log" }
            ]
        }"#;

        let blueprint: RigBlueprint = serde_json::from_str(json).unwrap();
        assert_eq!(blueprint.source_count(), 2);
        assert_eq!(blueprint.sources[1].event_offset, 2);
        assert_eq!(blueprint.sources[0].frequency_hz, 50.0);
        assert_eq!(blueprint.sinks[0].sink_type, SinkType::Log);
        assert_eq!(blueprint.sinks[0].queue_capacity, 64);
    }
}
