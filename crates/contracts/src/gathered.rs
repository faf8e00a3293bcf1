//! GatheredSet - gather engine output
//!
//! One complete (or explicitly incomplete) per-event frame set, ordered by
//! source index, plus the diagnostics snapshot taken at emission time.

use serde::{Deserialize, Serialize};

use crate::Frame;

/// Frames for one event, one slot per source in source-index order.
///
/// A slot is `None` only when the set was popped before every source
/// reported; the missing indexes are repeated in `meta.missing_sources`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatheredSet {
    /// Modular event number this set belongs to
    pub event_number: u32,

    /// Emission sequence number (monotonic, never wraps)
    pub seq: u64,

    /// Per-source frames, length = source count
    pub frames: Vec<Option<Frame>>,

    /// Gather metadata
    pub meta: GatherMeta,
}

impl GatheredSet {
    /// Number of populated slots.
    pub fn present_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_some()).count()
    }

    /// True when every source contributed a frame.
    pub fn is_complete(&self) -> bool {
        self.frames.iter().all(|f| f.is_some())
    }
}

/// Metadata attached to every emitted set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatherMeta {
    /// Source indexes whose slot was still empty at pop time
    pub missing_sources: Vec<usize>,

    /// Window state snapshot at emission time
    pub window: WindowStats,
}

/// Event window buffer state and lifetime counters (for diagnostics).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Current anchor event number (`None` until the first push)
    pub anchor: Option<u32>,

    /// Slots currently holding a frame
    pub occupied_slots: usize,

    /// Pushes that replaced an already-occupied slot
    pub overwrites: u64,

    /// Out-of-window pushes resolved by dropping the frame
    pub discards: u64,

    /// Out-of-window pushes resolved by advancing the window
    pub jumps: u64,

    /// Pops requested for events outside the window
    pub invalid_pops: u64,

    /// Empty slots encountered while popping
    pub incomplete_pops: u64,

    /// Frames destroyed because the window advanced past them unpopped
    pub frames_cleared: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frame;
    use bytes::Bytes;

    #[test]
    fn test_completeness() {
        let frame = Frame::new("head0".into(), 3, 0, Bytes::new());
        let set = GatheredSet {
            event_number: 3,
            seq: 0,
            frames: vec![Some(frame), None],
            meta: GatherMeta {
                missing_sources: vec![1],
                window: WindowStats::default(),
            },
        };
        assert!(!set.is_complete());
        assert_eq!(set.present_count(), 1);
    }
}
