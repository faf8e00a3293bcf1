//! FrameSource trait - frame acquisition abstraction
//!
//! Unified non-blocking fetch interface over real hardware streams, mock
//! generators and file replay. The gather loop does not care how a source
//! obtains frames; it only requires that fetched frames carry a valid
//! modular event number in their footer.

use crate::{Frame, SourceId};

/// Non-blocking frame producer.
///
/// `try_fetch` must return immediately: `Some(frame)` when a frame is
/// ready, `None` when nothing is available yet (the caller yields briefly
/// and retries). Implementations own whatever state the fetch needs, so
/// the method takes `&mut self`; `Send` lets a source move into the
/// per-source worker task in multi-threaded mode.
pub trait FrameSource: Send {
    /// Identifier of this source.
    fn source_id(&self) -> &SourceId;

    /// Fetch the next frame if one is available, without blocking.
    fn try_fetch(&mut self) -> Option<Frame>;
}

impl std::fmt::Debug for dyn FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSource")
            .field("source_id", self.source_id())
            .finish()
    }
}
