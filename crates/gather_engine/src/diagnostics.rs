//! Buffer diagnostics.
//!
//! Every abnormal condition inside the event window is non-fatal: the
//! buffer reports it and keeps going. Reports are structured values fed to
//! a pluggable [`DiagnosticSink`] so tests can capture them while the
//! default sink logs and bumps metrics.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{error, warn};

/// One abnormal buffer condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferDiagnostic {
    /// A push targeted an already-occupied slot; the old frame was
    /// replaced and is lost.
    SlotOverwrite { event_number: u32, source: usize },

    /// An out-of-window push was judged stale (recent past or very
    /// distant future) and dropped.
    DiscardedPush {
        event_number: u32,
        source: usize,
        anchor: u32,
        distance: u32,
    },

    /// An out-of-window push forced the window forward, discarding any
    /// frames still held in the skipped range.
    WindowJump {
        from: u32,
        to: u32,
        frames_cleared: usize,
    },

    /// Pop requested for an event outside the window.
    InvalidPop {
        event_number: u32,
        anchor: Option<u32>,
    },

    /// Pop found an empty slot; reported once per missing source.
    IncompletePop { event_number: u32, source: usize },
}

/// Receives buffer diagnostics as they occur.
pub trait DiagnosticSink: Send {
    fn report(&mut self, diagnostic: BufferDiagnostic);
}

/// Default sink: structured tracing events plus metrics counters.
#[derive(Debug, Default)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn report(&mut self, diagnostic: BufferDiagnostic) {
        match diagnostic {
            BufferDiagnostic::SlotOverwrite {
                event_number,
                source,
            } => {
                error!(
                    event_number,
                    source, "slot not empty, discarding old frame"
                );
                metrics::counter!("gather_slot_overwrites_total").increment(1);
            }
            BufferDiagnostic::DiscardedPush {
                event_number,
                source,
                anchor,
                distance,
            } => {
                warn!(
                    event_number,
                    source, anchor, distance, "discarding stale out-of-window frame"
                );
                metrics::counter!("gather_discarded_pushes_total").increment(1);
            }
            BufferDiagnostic::WindowJump {
                from,
                to,
                frames_cleared,
            } => {
                warn!(from, to, frames_cleared, "window jumped forward");
                metrics::counter!("gather_window_jumps_total").increment(1);
                if frames_cleared > 0 {
                    metrics::counter!("gather_frames_cleared_total")
                        .increment(frames_cleared as u64);
                }
            }
            BufferDiagnostic::InvalidPop {
                event_number,
                anchor,
            } => {
                warn!(event_number, ?anchor, "pop outside current window");
                metrics::counter!("gather_invalid_pops_total").increment(1);
            }
            BufferDiagnostic::IncompletePop {
                event_number,
                source,
            } => {
                error!(event_number, source, "popping row with missing frame");
                metrics::counter!("gather_incomplete_pops_total").increment(1);
            }
        }
    }
}

/// Test sink that records every diagnostic.
///
/// The handle can be cloned out before the sink moves into the buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingDiagnostics {
    records: Arc<Mutex<Vec<BufferDiagnostic>>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn recorded(&self) -> Vec<BufferDiagnostic> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Count of recorded diagnostics matching a predicate.
    pub fn count_matching(&self, pred: impl Fn(&BufferDiagnostic) -> bool) -> usize {
        self.recorded().iter().filter(|d| pred(d)).count()
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn report(&mut self, diagnostic: BufferDiagnostic) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}
