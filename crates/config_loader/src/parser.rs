//! Configuration parsing
//!
//! Supports TOML (primary) and JSON (optional) formats.

use contracts::{ContractError, RigBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (preferred)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<RigBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<RigBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<RigBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ConcurrencyMode, SinkType, SourceKind};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[gather]
concurrency = "multi_threaded"
poll_interval_ms = 5

[gather.window]
rows = 10
event_modulus = 65536

[[sources]]
id = "head0"
kind = "mock"
frequency_hz = 100.0

[[sources]]
id = "head1"
kind = "mock"
event_offset = 3

[[sinks]]
name = "console"
sink_type = "log"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.source_count(), 2);
        assert_eq!(bp.gather.window.rows, 10);
        assert_eq!(bp.gather.concurrency, ConcurrencyMode::MultiThreaded);
        assert_eq!(bp.sources[0].kind, SourceKind::Mock);
        assert_eq!(bp.sources[1].event_offset, 3);
        assert_eq!(bp.sinks[0].sink_type, SinkType::Log);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "sources": [
                { "id": "head0", "kind": "mock" },
                { "id": "head1", "kind": "replay", "replay_path": "run.jsonl" }
            ],
            "sinks": [
                { "name": "out", "sink_type": "jsonl_file", "params": { "path": "out.jsonl" } }
            ]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.sources[1].kind, SourceKind::Replay);
        assert_eq!(bp.sinks[0].sink_type, SinkType::JsonlFile);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
