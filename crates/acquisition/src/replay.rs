//! Recorded frame replay
//!
//! Replays a JSONL recording of frame metadata in real time. Each line is
//! one [`FrameRecord`]; records for other sources are skipped so several
//! replay sources can share a single rig-wide recording file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use bytes::Bytes;
use contracts::{Frame, FrameSource, SourceId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::AcquisitionError;

/// One recorded frame, as stored on disk.
///
/// Payload bytes are not recorded; replay synthesizes a zero-filled
/// payload of the recorded length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    pub source_id: String,
    pub event_number: u32,
    pub timestamp_us: u64,
    pub payload_len: usize,
}

/// Frame source that replays a recording with its original timing.
///
/// `try_fetch` releases a record once its recorded timestamp, scaled by
/// the speed multiplier, has elapsed since replay started.
#[derive(Debug)]
pub struct ReplayFrameSource {
    id: SourceId,
    records: Vec<FrameRecord>,
    cursor: usize,
    started: Instant,
    base_timestamp_us: u64,
    speed_multiplier: f64,
    loop_playback: bool,
}

impl ReplayFrameSource {
    pub fn from_path(
        source_id: &str,
        path: &Path,
        speed_multiplier: f64,
        loop_playback: bool,
    ) -> Result<Self, AcquisitionError> {
        if speed_multiplier <= 0.0 {
            return Err(AcquisitionError::invalid_source(
                source_id,
                format!("speed_multiplier must be > 0, got {speed_multiplier}"),
            ));
        }

        let file = File::open(path).map_err(|e| {
            AcquisitionError::recording_load(path, format!("cannot open recording: {e}"))
        })?;

        let mut records = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                AcquisitionError::recording_load(path, format!("read error at line {}: {e}", line_no + 1))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: FrameRecord = serde_json::from_str(&line).map_err(|e| {
                AcquisitionError::recording_load(path, format!("bad record at line {}: {e}", line_no + 1))
            })?;
            if record.source_id == source_id {
                records.push(record);
            }
        }

        if records.is_empty() {
            return Err(AcquisitionError::recording_load(
                path,
                format!("recording contains no frames for source '{source_id}'"),
            ));
        }

        debug!(
            source_id,
            path = %path.display(),
            records = records.len(),
            speed_multiplier,
            loop_playback,
            "replay frame source loaded"
        );

        let base_timestamp_us = records[0].timestamp_us;
        Ok(Self {
            id: SourceId::from(source_id),
            records,
            cursor: 0,
            started: Instant::now(),
            base_timestamp_us,
            speed_multiplier,
            loop_playback,
        })
    }

    /// Remaining records in the current pass.
    pub fn remaining(&self) -> usize {
        self.records.len() - self.cursor
    }

    fn elapsed_recording_us(&self) -> u64 {
        (self.started.elapsed().as_secs_f64() * self.speed_multiplier * 1e6) as u64
    }
}

impl FrameSource for ReplayFrameSource {
    fn source_id(&self) -> &SourceId {
        &self.id
    }

    fn try_fetch(&mut self) -> Option<Frame> {
        if self.cursor == self.records.len() {
            if !self.loop_playback {
                return None;
            }
            trace!(source_id = %self.id, "replay pass complete, restarting");
            self.cursor = 0;
            self.started = Instant::now();
        }

        let record = &self.records[self.cursor];
        let due_us = record.timestamp_us.saturating_sub(self.base_timestamp_us);
        if self.elapsed_recording_us() < due_us {
            return None;
        }

        self.cursor += 1;
        metrics::counter!("acquisition_replay_frames_total").increment(1);
        Some(Frame::new(
            self.id.clone(),
            record.event_number,
            record.timestamp_us,
            Bytes::from(vec![0u8; record.payload_len]),
        ))
    }
}
