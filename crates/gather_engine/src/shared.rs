//! Shared, mutex-guarded event window.
//!
//! The original design selected locked vs. unlocked behavior with a
//! compile-time switch; here they are two concrete types chosen at
//! construction. Every public operation is one critical section, so a
//! push that triggers a window jump completes (including the internal
//! retry) before any other worker's operation proceeds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{Frame, WindowStats};

use crate::window::EventWindow;

/// Clonable handle to one event window shared by per-source workers.
///
/// A single coarse lock over the whole grid: the workload is dominated by
/// per-frame payload processing outside the buffer, so push/pop critical
/// sections are short.
#[derive(Clone)]
pub struct SharedEventWindow {
    inner: Arc<Mutex<EventWindow>>,
}

impl SharedEventWindow {
    pub fn new(window: EventWindow) -> Self {
        Self {
            inner: Arc::new(Mutex::new(window)),
        }
    }

    /// Locked [`EventWindow::push`].
    pub fn push(&self, frame: Frame, event_number: u32, source: usize) -> bool {
        self.lock().push(frame, event_number, source)
    }

    /// Locked [`EventWindow::pop`].
    pub fn pop(&self, event_number: u32) -> Vec<Option<Frame>> {
        self.lock().pop(event_number)
    }

    /// Push that, on row completion, pops the row and claims the next
    /// emission sequence number in the same critical section.
    ///
    /// Because `seq` is incremented while the lock is held, sequence
    /// numbers follow pop order exactly, and a completing push can never
    /// lose its row to a concurrent jump between push and pop.
    pub fn push_complete(
        &self,
        frame: Frame,
        event_number: u32,
        source: usize,
        seq: &AtomicU64,
    ) -> Option<(u64, Vec<Option<Frame>>, WindowStats)> {
        let mut window = self.lock();
        if !window.push(frame, event_number, source) {
            return None;
        }
        let frames = window.pop(event_number);
        let seq = seq.fetch_add(1, Ordering::Relaxed);
        let stats = window.stats();
        Some((seq, frames, stats))
    }

    /// Current anchor event number.
    pub fn anchor(&self) -> Option<u32> {
        self.lock().anchor()
    }

    /// Window state snapshot.
    pub fn stats(&self) -> WindowStats {
        self.lock().stats()
    }

    fn lock(&self) -> MutexGuard<'_, EventWindow> {
        // Precondition panics fire before the window mutates, so a
        // poisoned lock still guards a consistent grid.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
