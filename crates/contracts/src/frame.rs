//! Frame - acquisition output
//!
//! One measurement frame as fetched from a single source, payload left
//! opaque. The footer carries the hardware-assigned modular event number.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::SourceId;

/// Trailing metadata the hardware appends to every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameFooter {
    /// Modular event counter value, in `[0, event_modulus)`
    pub event_number: u32,

    /// Capture timestamp (microseconds since source start)
    pub timestamp_us: u64,
}

/// One frame from one source for one event.
///
/// The payload is opaque to the gather engine; decoding it (byte offsets,
/// signed/unsigned field transforms, scaling) happens downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Producing source
    pub source_id: SourceId,

    /// Footer metadata (event number, timestamp)
    pub footer: FrameFooter,

    /// Raw payload bytes (zero-copy)
    pub payload: Bytes,
}

impl Frame {
    /// Convenience constructor.
    pub fn new(source_id: SourceId, event_number: u32, timestamp_us: u64, payload: Bytes) -> Self {
        Self {
            source_id,
            footer: FrameFooter {
                event_number,
                timestamp_us,
            },
            payload,
        }
    }

    /// Event number from the footer.
    #[inline]
    pub fn event_number(&self) -> u32 {
        self.footer.event_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_roundtrip() {
        let frame = Frame::new("head0".into(), 41, 12_500, Bytes::from_static(b"\x01\x02"));
        let json = serde_json::to_string(&frame).unwrap();
        let parsed: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.source_id, "head0");
        assert_eq!(parsed.event_number(), 41);
        assert_eq!(parsed.payload.as_ref(), b"\x01\x02");
    }
}
