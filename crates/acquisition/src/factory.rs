//! Source construction from a rig blueprint

use contracts::{FrameSource, RigBlueprint, SourceKind};
use tracing::info;

use crate::error::AcquisitionError;
use crate::mock::{MockFrameSource, MockSourceConfig};
use crate::replay::ReplayFrameSource;

/// Build every source a blueprint declares, in blueprint order.
///
/// The position in the returned vector is the source index the gather
/// window keys its slots by, so callers must not reorder it.
pub fn build_sources(
    blueprint: &RigBlueprint,
) -> Result<Vec<Box<dyn FrameSource>>, AcquisitionError> {
    let mut sources: Vec<Box<dyn FrameSource>> = Vec::with_capacity(blueprint.sources.len());

    for config in &blueprint.sources {
        let source: Box<dyn FrameSource> = match config.kind {
            SourceKind::Mock => Box::new(MockFrameSource::new(MockSourceConfig {
                source_id: config.id.clone(),
                frequency_hz: config.frequency_hz,
                event_modulus: blueprint.gather.window.event_modulus,
                event_offset: config.event_offset,
                payload_len: config.payload_len,
                drop_probability: config.drop_probability,
                seed: config.seed,
            })?),
            SourceKind::Replay => {
                let path = config.replay_path.as_ref().ok_or_else(|| {
                    AcquisitionError::invalid_source(&config.id, "replay source needs replay_path")
                })?;
                Box::new(ReplayFrameSource::from_path(
                    &config.id,
                    path,
                    config.speed_multiplier,
                    config.loop_playback,
                )?)
            }
        };
        sources.push(source);
    }

    info!(count = sources.len(), "frame sources built");
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SourceConfig;

    fn mock_config(id: &str) -> SourceConfig {
        SourceConfig {
            id: id.to_string(),
            kind: SourceKind::Mock,
            frequency_hz: 50.0,
            event_offset: 0,
            payload_len: 64,
            drop_probability: 0.0,
            seed: Some(1),
            replay_path: None,
            speed_multiplier: 1.0,
            loop_playback: false,
        }
    }

    #[test]
    fn test_builds_in_blueprint_order() {
        let blueprint = RigBlueprint {
            version: Default::default(),
            gather: Default::default(),
            sources: vec![mock_config("head0"), mock_config("head1")],
            sinks: vec![],
        };

        let sources = build_sources(&blueprint).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].source_id(), "head0");
        assert_eq!(sources[1].source_id(), "head1");
    }

    #[test]
    fn test_replay_without_path_fails() {
        let mut config = mock_config("head0");
        config.kind = SourceKind::Replay;

        let blueprint = RigBlueprint {
            version: Default::default(),
            gather: Default::default(),
            sources: vec![config],
            sinks: vec![],
        };

        let err = build_sources(&blueprint).unwrap_err();
        assert!(matches!(err, AcquisitionError::InvalidSource { .. }));
    }
}
