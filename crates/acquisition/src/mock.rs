//! Mock frame source
//!
//! Clock-driven generator for rigs without hardware attached. Emits
//! frames at a fixed frequency with a wrapping event counter; a constant
//! per-source event offset and a frame-loss probability let a test rig
//! reproduce sources whose counters disagree or that skip events.

use std::time::Instant;

use bytes::Bytes;
use contracts::{Frame, FrameSource, SourceId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::error::AcquisitionError;

/// Mock source configuration
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Source ID
    pub source_id: String,

    /// Emission frequency (Hz)
    pub frequency_hz: f64,

    /// Wrap period of the synthetic event counter
    pub event_modulus: u32,

    /// Constant offset added to the event counter (mod event_modulus)
    pub event_offset: u32,

    /// Synthetic payload size in bytes
    pub payload_len: usize,

    /// Probability that an emitted frame is silently lost
    pub drop_probability: f64,

    /// RNG seed for reproducible loss patterns
    pub seed: Option<u64>,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            source_id: "mock_source".to_string(),
            frequency_hz: 50.0,
            event_modulus: 1 << 16,
            event_offset: 0,
            payload_len: 256,
            drop_probability: 0.0,
            seed: None,
        }
    }
}

/// Mock frame source
///
/// `try_fetch` is clock-driven: a frame becomes available once its slot
/// in the emission schedule has passed, so the source never blocks and
/// never runs ahead of real time.
pub struct MockFrameSource {
    id: SourceId,
    config: MockSourceConfig,
    started: Instant,
    emitted: u64,
    rng: StdRng,
}

impl MockFrameSource {
    pub fn new(config: MockSourceConfig) -> Result<Self, AcquisitionError> {
        if config.frequency_hz <= 0.0 {
            return Err(AcquisitionError::invalid_source(
                &config.source_id,
                format!("frequency_hz must be > 0, got {}", config.frequency_hz),
            ));
        }
        if config.event_modulus == 0 {
            return Err(AcquisitionError::invalid_source(
                &config.source_id,
                "event_modulus must be positive",
            ));
        }
        if !(0.0..1.0).contains(&config.drop_probability) {
            return Err(AcquisitionError::invalid_source(
                &config.source_id,
                format!(
                    "drop_probability must be in [0, 1), got {}",
                    config.drop_probability
                ),
            ));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        debug!(
            source_id = %config.source_id,
            frequency_hz = config.frequency_hz,
            event_modulus = config.event_modulus,
            event_offset = config.event_offset,
            "mock frame source created"
        );

        Ok(Self {
            id: SourceId::from(config.source_id.as_str()),
            started: Instant::now(),
            emitted: 0,
            rng,
            config,
        })
    }

    /// Events whose scheduled emission time has passed.
    fn due_count(&self) -> u64 {
        (self.started.elapsed().as_secs_f64() * self.config.frequency_hz) as u64
    }

    /// Produce the next scheduled frame, or `None` when the loss roll
    /// eats it. The counter advances either way, so a lost frame leaves a
    /// hole in the event sequence exactly like dropped hardware data.
    fn next_frame(&mut self) -> Option<Frame> {
        let count = self.emitted;
        self.emitted += 1;

        let event_number =
            ((count + u64::from(self.config.event_offset)) % u64::from(self.config.event_modulus))
                as u32;
        let timestamp_us = (count as f64 / self.config.frequency_hz * 1e6) as u64;

        if self.config.drop_probability > 0.0
            && self.rng.random::<f64>() < self.config.drop_probability
        {
            trace!(source_id = %self.id, event_number, "mock frame lost");
            metrics::counter!("acquisition_mock_frames_lost_total").increment(1);
            return None;
        }

        let payload = Bytes::from(vec![event_number as u8; self.config.payload_len]);
        Some(Frame::new(self.id.clone(), event_number, timestamp_us, payload))
    }
}

impl FrameSource for MockFrameSource {
    fn source_id(&self) -> &SourceId {
        &self.id
    }

    fn try_fetch(&mut self) -> Option<Frame> {
        if self.emitted >= self.due_count() {
            return None;
        }
        self.next_frame()
    }
}
