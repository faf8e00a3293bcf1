//! Configuration validation
//!
//! Rules:
//! - window geometry legal (rows > 0, rows <= event_modulus)
//! - stale_cutoff within the event period
//! - at least one source, source ids unique
//! - frequency_hz > 0 for mock sources
//! - replay sources carry a replay_path
//! - sink names non-empty

use std::collections::HashSet;

use contracts::{ContractError, RigBlueprint, SourceKind};

/// Validate a RigBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RigBlueprint) -> Result<(), ContractError> {
    validate_window(blueprint)?;
    validate_sources(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_window(blueprint: &RigBlueprint) -> Result<(), ContractError> {
    let window = &blueprint.gather.window;

    if window.rows == 0 {
        return Err(ContractError::config_validation(
            "gather.window.rows",
            "rows must be > 0",
        ));
    }
    if window.event_modulus == 0 {
        return Err(ContractError::config_validation(
            "gather.window.event_modulus",
            "event_modulus must be > 0",
        ));
    }
    if window.rows as u64 > u64::from(window.event_modulus) {
        return Err(ContractError::config_validation(
            "gather.window.rows",
            format!(
                "rows ({}) must be <= event_modulus ({})",
                window.rows, window.event_modulus
            ),
        ));
    }
    if let Some(cutoff) = window.stale_cutoff {
        if cutoff >= window.event_modulus {
            return Err(ContractError::config_validation(
                "gather.window.stale_cutoff",
                format!(
                    "stale_cutoff ({}) must be < event_modulus ({})",
                    cutoff, window.event_modulus
                ),
            ));
        }
    }

    Ok(())
}

fn validate_sources(blueprint: &RigBlueprint) -> Result<(), ContractError> {
    if blueprint.sources.is_empty() {
        return Err(ContractError::config_validation(
            "sources",
            "at least one source is required",
        ));
    }

    let mut seen = HashSet::new();
    for source in &blueprint.sources {
        if source.id.is_empty() {
            return Err(ContractError::config_validation(
                "sources[].id",
                "source id cannot be empty",
            ));
        }
        if !seen.insert(&source.id) {
            return Err(ContractError::config_validation(
                format!("sources[id={}]", source.id),
                "duplicate source id",
            ));
        }

        match source.kind {
            SourceKind::Mock => {
                if source.frequency_hz <= 0.0 {
                    return Err(ContractError::config_validation(
                        format!("sources[{}].frequency_hz", source.id),
                        format!("frequency_hz must be > 0, got {}", source.frequency_hz),
                    ));
                }
                if !(0.0..1.0).contains(&source.drop_probability) {
                    return Err(ContractError::config_validation(
                        format!("sources[{}].drop_probability", source.id),
                        format!(
                            "drop_probability must be in [0, 1), got {}",
                            source.drop_probability
                        ),
                    ));
                }
            }
            SourceKind::Replay => {
                if source.replay_path.is_none() {
                    return Err(ContractError::config_validation(
                        format!("sources[{}].replay_path", source.id),
                        "replay source requires replay_path",
                    ));
                }
                if source.speed_multiplier <= 0.0 {
                    return Err(ContractError::config_validation(
                        format!("sources[{}].speed_multiplier", source.id),
                        format!(
                            "speed_multiplier must be > 0, got {}",
                            source.speed_multiplier
                        ),
                    ));
                }
            }
        }
    }

    Ok(())
}

fn validate_sinks(blueprint: &RigBlueprint) -> Result<(), ContractError> {
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}
