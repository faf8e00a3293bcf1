//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    source_count: usize,
    sink_count: usize,
    window_rows: usize,
    event_modulus: u32,
    concurrency: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    source_count: blueprint.source_count(),
                    sink_count: blueprint.sinks.len(),
                    window_rows: blueprint.gather.window.rows,
                    event_modulus: blueprint.gather.window.event_modulus,
                    concurrency: format!("{:?}", blueprint.gather.concurrency),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::RigBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - gathered sets will be dropped".to_string());
    }

    let window = &blueprint.gather.window;
    if window.rows > blueprint.gather.window.event_modulus as usize / 2 {
        warnings.push(format!(
            "window rows ({}) exceed half the event modulus ({}) - out-of-window \
             classification loses most of its slack",
            window.rows, window.event_modulus
        ));
    }

    for source in &blueprint.sources {
        if source.drop_probability > 0.2 {
            warnings.push(format!(
                "Source '{}' drops {:.0}% of frames - expect mostly incomplete sets",
                source.id,
                source.drop_probability * 100.0
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Sources: {}", summary.source_count);
            println!("  Sinks: {}", summary.sink_count);
            println!("  Window rows: {}", summary.window_rows);
            println!("  Event modulus: {}", summary.event_modulus);
            println!("  Concurrency: {}", summary.concurrency);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ValidateArgs;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_validate_valid_config() {
        let file = write_config(
            r#"
[[sources]]
id = "head0"
kind = "mock"
"#,
        );
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        };

        let result = validate_config(&args);
        assert!(result.valid, "error: {:?}", result.error);
        assert_eq!(result.summary.unwrap().source_count, 1);
        // no sinks configured triggers a warning
        assert!(result.warnings.is_some());
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let file = write_config(
            r#"
[[sources]]
id = ""
kind = "mock"
"#,
        );
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        };

        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("source id"));
    }

    #[test]
    fn test_validate_missing_file() {
        let args = ValidateArgs {
            config: "/nonexistent/rig.toml".into(),
            json: false,
        };

        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }
}
