//! Event window buffer.
//!
//! Fixed-capacity circular store indexed by a sliding window over the
//! modular event-number space. The arithmetic is double-modular: one
//! modulus for physical rows, one for the event counter. The window is
//! anchored by the first push and only ever moves forward, either by
//! ordinary advance-on-pop or by a jump forced by an out-of-window push.

use contracts::{Frame, WindowConfig, WindowStats};
use tracing::instrument;

use crate::diagnostics::{BufferDiagnostic, DiagnosticSink, LogDiagnostics};
use crate::modular::{forward_distance, successor};

/// Sliding event window over a rows x sources grid of frame slots.
///
/// Single-threaded access; wrap in [`crate::SharedEventWindow`] when
/// several workers push concurrently.
pub struct EventWindow {
    rows: usize,
    sources: usize,
    modulus: u32,
    stale_cutoff: u32,
    discard_threshold: u32,
    /// rows x sources grid, row-major
    slots: Vec<Option<Frame>>,
    /// Oldest representable event number; `None` until the first push
    anchor: Option<u32>,
    /// Physical row holding the anchor event
    anchor_row: usize,
    /// Consecutive out-of-window pushes resolved by discarding
    discard_streak: u32,
    overwrites: u64,
    discards: u64,
    jumps: u64,
    invalid_pops: u64,
    incomplete_pops: u64,
    frames_cleared: u64,
    diagnostics: Box<dyn DiagnosticSink>,
}

impl std::fmt::Debug for EventWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventWindow")
            .field("rows", &self.rows)
            .field("sources", &self.sources)
            .field("modulus", &self.modulus)
            .field("anchor", &self.anchor)
            .field("anchor_row", &self.anchor_row)
            .field("discard_streak", &self.discard_streak)
            .finish()
    }
}

impl EventWindow {
    /// Create a window for `sources` producers with default (logging)
    /// diagnostics.
    pub fn new(sources: usize, config: &WindowConfig) -> Self {
        Self::with_diagnostics(sources, config, Box::new(LogDiagnostics))
    }

    /// Create a window with a custom diagnostic sink.
    pub fn with_diagnostics(
        sources: usize,
        config: &WindowConfig,
        diagnostics: Box<dyn DiagnosticSink>,
    ) -> Self {
        assert!(config.rows > 0, "window needs at least one row");
        assert!(sources > 0, "window needs at least one source");
        assert!(config.event_modulus > 0, "event modulus must be positive");
        assert!(
            config.rows as u64 <= config.event_modulus as u64,
            "window of {} rows cannot exceed event modulus {}",
            config.rows,
            config.event_modulus
        );
        let cutoff = config.effective_stale_cutoff();
        assert!(
            cutoff < config.event_modulus,
            "stale cutoff {} must be below event modulus {}",
            cutoff,
            config.event_modulus
        );

        Self {
            rows: config.rows,
            sources,
            modulus: config.event_modulus,
            stale_cutoff: cutoff,
            discard_threshold: config.discard_threshold,
            slots: (0..config.rows * sources).map(|_| None).collect(),
            anchor: None,
            anchor_row: 0,
            discard_streak: 0,
            overwrites: 0,
            discards: 0,
            jumps: 0,
            invalid_pops: 0,
            incomplete_pops: 0,
            frames_cleared: 0,
            diagnostics,
        }
    }

    /// Push a frame for `(event_number, source)`.
    ///
    /// Returns `true` when the event's row became complete (one frame from
    /// every source). Out-of-window pushes are either discarded (stale) or
    /// resolved by jumping the window forward to the pushed event; see the
    /// module docs for the policy.
    ///
    /// # Panics
    /// If `event_number` or `source` is out of its declared range. Those
    /// are caller contract breaches, not timing conditions.
    #[instrument(level = "trace", name = "event_window_push", skip(self, frame))]
    pub fn push(&mut self, frame: Frame, event_number: u32, source: usize) -> bool {
        assert!(
            event_number < self.modulus,
            "event number {event_number} out of range (modulus {})",
            self.modulus
        );
        assert!(
            source < self.sources,
            "source index {source} out of range ({} sources)",
            self.sources
        );

        // First push ever defines the window origin.
        let anchor = *self.anchor.get_or_insert(event_number);

        if let Some(row) = self.row_of(event_number) {
            return self.store(row, frame, event_number, source);
        }

        let distance = forward_distance(anchor, event_number, self.modulus);
        if distance > self.stale_cutoff && self.discard_streak < self.discard_threshold {
            // Recent past or very distant future: drop it. The streak is
            // bounded so a source that is persistently ahead still drags
            // the window forward eventually.
            self.discard_streak += 1;
            self.discards += 1;
            self.diagnostics.report(BufferDiagnostic::DiscardedPush {
                event_number,
                source,
                anchor,
                distance,
            });
            return false;
        }

        // Near future or exhausted discard streak: the window is behind.
        let cleared = self.advance_to(event_number);
        self.jumps += 1;
        self.diagnostics.report(BufferDiagnostic::WindowJump {
            from: anchor,
            to: event_number,
            frames_cleared: cleared,
        });

        // The event is the new anchor, so this store cannot miss.
        let row = self.anchor_row;
        self.store(row, frame, event_number, source)
    }

    /// Pop the frame set for `event_number`, in source-index order, and
    /// advance the window past it.
    ///
    /// Outside the window this reports `InvalidPop` and returns an empty
    /// vec. Empty slots are returned as `None` with an `IncompletePop`
    /// report per missing source. Ownership of the frames moves to the
    /// caller; the buffer retains nothing for this event afterwards.
    #[instrument(level = "trace", name = "event_window_pop", skip(self))]
    pub fn pop(&mut self, event_number: u32) -> Vec<Option<Frame>> {
        assert!(
            event_number < self.modulus,
            "event number {event_number} out of range (modulus {})",
            self.modulus
        );

        let Some(row) = self.row_of(event_number) else {
            self.invalid_pops += 1;
            self.diagnostics.report(BufferDiagnostic::InvalidPop {
                event_number,
                anchor: self.anchor,
            });
            return Vec::new();
        };

        let mut gathered = Vec::with_capacity(self.sources);
        for source in 0..self.sources {
            let frame = self.slots[row * self.sources + source].take();
            if frame.is_none() {
                self.incomplete_pops += 1;
                self.diagnostics.report(BufferDiagnostic::IncompletePop {
                    event_number,
                    source,
                });
            }
            gathered.push(frame);
        }

        self.advance_to(successor(event_number, self.modulus));
        gathered
    }

    /// Current anchor event number (`None` while unanchored).
    pub fn anchor(&self) -> Option<u32> {
        self.anchor
    }

    /// Window capacity in events.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of sources per row.
    pub fn sources(&self) -> usize {
        self.sources
    }

    /// State and lifetime counters snapshot.
    pub fn stats(&self) -> WindowStats {
        WindowStats {
            anchor: self.anchor,
            occupied_slots: self.slots.iter().filter(|s| s.is_some()).count(),
            overwrites: self.overwrites,
            discards: self.discards,
            jumps: self.jumps,
            invalid_pops: self.invalid_pops,
            incomplete_pops: self.incomplete_pops,
            frames_cleared: self.frames_cleared,
        }
    }

    /// Physical row for `event_number`, or `None` when not representable
    /// in the current window.
    fn row_of(&self, event_number: u32) -> Option<usize> {
        let anchor = self.anchor?;
        let distance = forward_distance(anchor, event_number, self.modulus);
        if (distance as usize) < self.rows {
            Some((self.anchor_row + distance as usize) % self.rows)
        } else {
            None
        }
    }

    fn row_filled(&self, row: usize) -> bool {
        let base = row * self.sources;
        self.slots[base..base + self.sources]
            .iter()
            .all(|slot| slot.is_some())
    }

    /// Write into a representable row. Returns whether the row is now
    /// complete.
    fn store(&mut self, row: usize, frame: Frame, event_number: u32, source: usize) -> bool {
        self.discard_streak = 0;
        let slot = &mut self.slots[row * self.sources + source];
        if slot.is_some() {
            self.overwrites += 1;
            self.diagnostics.report(BufferDiagnostic::SlotOverwrite {
                event_number,
                source,
            });
        }
        *slot = Some(frame);
        self.row_filled(row)
    }

    /// Move the anchor forward to `target`, dropping whatever the skipped
    /// rows still held. Returns the number of frames destroyed.
    fn advance_to(&mut self, target: u32) -> usize {
        debug_assert!(target < self.modulus);
        let anchor = match self.anchor {
            Some(a) => a,
            // Unanchored windows hold nothing to clear.
            None => {
                self.anchor = Some(target);
                return 0;
            }
        };

        let distance = forward_distance(anchor, target, self.modulus) as usize;
        let mut cleared = 0;
        // Only the leading `rows` events of the skipped range can hold
        // frames; anything further was never representable.
        for step in 0..distance.min(self.rows) {
            let row = (self.anchor_row + step) % self.rows;
            let base = row * self.sources;
            for slot in &mut self.slots[base..base + self.sources] {
                if slot.take().is_some() {
                    cleared += 1;
                }
            }
        }

        self.anchor_row = (self.anchor_row + distance) % self.rows;
        self.anchor = Some(target);
        self.frames_cleared += cleared as u64;
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use bytes::Bytes;
    use contracts::Frame;

    fn config(rows: usize, modulus: u32) -> WindowConfig {
        WindowConfig {
            rows,
            event_modulus: modulus,
            ..Default::default()
        }
    }

    fn frame(source: &str, event: u32) -> Frame {
        Frame::new(source.into(), event, u64::from(event) * 1_000, Bytes::new())
    }

    fn recorded_window(
        sources: usize,
        cfg: &WindowConfig,
    ) -> (EventWindow, RecordingDiagnostics) {
        let rec = RecordingDiagnostics::new();
        let window = EventWindow::with_diagnostics(sources, cfg, Box::new(rec.clone()));
        (window, rec)
    }

    #[test]
    fn test_gather_two_sources() {
        // Scenario A: rows=4, S=2, M=16
        let mut window = EventWindow::new(2, &config(4, 16));

        assert!(!window.push(frame("head0", 5), 5, 0));
        assert!(window.push(frame("head1", 5), 5, 1));

        let gathered = window.pop(5);
        assert_eq!(gathered.len(), 2);
        assert!(gathered.iter().all(|f| f.is_some()));
        assert_eq!(window.anchor(), Some(6));
    }

    #[test]
    fn test_stale_push_discarded() {
        // Scenario B: anchor at 6, event 3 looks like recent past
        let cfg = config(4, 16);
        let (mut window, rec) = recorded_window(2, &cfg);
        window.push(frame("head0", 5), 5, 0);
        window.push(frame("head1", 5), 5, 1);
        window.pop(5);
        assert_eq!(window.anchor(), Some(6));

        // d = (3 - 6) mod 16 = 13 > 8
        assert!(!window.push(frame("head0", 3), 3, 0));
        assert_eq!(window.anchor(), Some(6));
        assert_eq!(
            rec.count_matching(|d| matches!(d, BufferDiagnostic::DiscardedPush { .. })),
            1
        );
        // nothing stored for event 3
        assert!(window.pop(3).is_empty());
    }

    #[test]
    fn test_near_future_jumps_window() {
        // Scenario C: anchor at 6, event 12 is outside [6, 10) but only
        // d=6 <= 8 ahead, so the window moves
        let cfg = config(4, 16);
        let (mut window, rec) = recorded_window(2, &cfg);
        window.push(frame("head0", 5), 5, 0);
        window.push(frame("head1", 5), 5, 1);
        window.pop(5);

        // park a frame that the jump must clear
        window.push(frame("head0", 7), 7, 0);

        assert!(!window.push(frame("head0", 12), 12, 0));
        assert_eq!(window.anchor(), Some(12));
        assert_eq!(
            rec.count_matching(|d| matches!(
                d,
                BufferDiagnostic::WindowJump {
                    from: 6,
                    to: 12,
                    frames_cleared: 1
                }
            )),
            1
        );

        // the retried push landed: completing the row gathers event 12
        assert!(window.push(frame("head1", 12), 12, 1));
        let gathered = window.pop(12);
        assert_eq!(gathered.len(), 2);
        assert!(gathered.iter().all(|f| f.is_some()));
    }

    #[test]
    fn test_incomplete_pop_keeps_order() {
        // Scenario D: S=3, source 1 never reports
        let cfg = config(4, 16);
        let (mut window, rec) = recorded_window(3, &cfg);
        window.push(frame("head0", 7), 7, 0);
        window.push(frame("head2", 7), 7, 2);

        let gathered = window.pop(7);
        assert_eq!(gathered.len(), 3);
        assert!(gathered[0].is_some());
        assert!(gathered[1].is_none());
        assert!(gathered[2].is_some());
        assert_eq!(
            rec.recorded()
                .iter()
                .filter(|d| matches!(
                    d,
                    BufferDiagnostic::IncompletePop {
                        event_number: 7,
                        source: 1
                    }
                ))
                .count(),
            1
        );
    }

    #[test]
    fn test_completion_requires_all_sources() {
        let mut window = EventWindow::new(3, &config(4, 16));
        assert!(!window.push(frame("head0", 2), 2, 0));
        assert!(!window.push(frame("head1", 2), 2, 1));
        assert!(window.push(frame("head2", 2), 2, 2));
    }

    #[test]
    fn test_pop_clears_state() {
        let mut window = EventWindow::new(2, &config(4, 16));
        window.push(frame("head0", 5), 5, 0);
        window.push(frame("head1", 5), 5, 1);
        assert_eq!(window.pop(5).iter().filter(|f| f.is_some()).count(), 2);

        // event 5 left the window; popping it again is invalid
        assert!(window.pop(5).is_empty());
        assert_eq!(window.stats().occupied_slots, 0);
    }

    #[test]
    fn test_overwrite_leaves_other_slots_alone() {
        let cfg = config(4, 16);
        let (mut window, rec) = recorded_window(2, &cfg);
        window.push(frame("head1", 5), 5, 1);
        window.push(frame("head0", 5), 5, 0);
        // duplicate for (5, 0): new frame wins
        let replacement = Frame::new("head0".into(), 5, 99, Bytes::from_static(b"new"));
        assert!(window.push(replacement, 5, 0));

        assert_eq!(
            rec.count_matching(|d| matches!(d, BufferDiagnostic::SlotOverwrite { .. })),
            1
        );
        let gathered = window.pop(5);
        assert_eq!(gathered[0].as_ref().unwrap().footer.timestamp_us, 99);
        assert_eq!(gathered[1].as_ref().unwrap().footer.timestamp_us, 5_000);
    }

    #[test]
    fn test_bounded_discard_then_forced_jump() {
        let cfg = WindowConfig {
            rows: 4,
            event_modulus: 16,
            discard_threshold: 3,
            stale_cutoff: None,
        };
        let (mut window, rec) = recorded_window(1, &cfg);
        window.push(frame("head0", 8), 8, 0);

        // d = (2 - 8) mod 16 = 10 > 8: ancient-looking, discarded while
        // the streak stays under the threshold
        for _ in 0..3 {
            window.push(frame("head0", 2), 2, 0);
            assert_eq!(window.anchor(), Some(8));
        }
        assert_eq!(
            rec.count_matching(|d| matches!(d, BufferDiagnostic::DiscardedPush { .. })),
            3
        );

        // 4th consecutive ancient push exceeds the threshold: forced jump
        assert!(window.push(frame("head0", 2), 2, 0));
        assert_eq!(window.anchor(), Some(2));
        assert_eq!(
            rec.count_matching(|d| matches!(d, BufferDiagnostic::WindowJump { .. })),
            1
        );
    }

    #[test]
    fn test_anchor_only_moves_forward() {
        let mut window = EventWindow::new(1, &config(4, 16));
        let mut last = None;
        let pushes = [5u32, 6, 7, 3, 12, 13, 1, 1, 2];
        for event in pushes {
            if window.push(frame("head0", event), event, 0) {
                window.pop(event);
            }
            let anchor = window.anchor().unwrap();
            if let Some(prev) = last {
                // forward distance stays within half the space for every
                // step this sequence takes
                assert!(forward_distance(prev, anchor, 16) <= 8);
            }
            last = Some(anchor);
        }
    }

    #[test]
    fn test_event_numbers_wrap_across_modulus() {
        let mut window = EventWindow::new(2, &config(4, 16));
        window.push(frame("head0", 15), 15, 0);
        assert!(window.push(frame("head1", 15), 15, 1));
        window.pop(15);
        assert_eq!(window.anchor(), Some(0));

        // the wrapped event 0 is representable in the new window
        window.push(frame("head0", 0), 0, 0);
        assert!(window.push(frame("head1", 0), 0, 1));
        let gathered = window.pop(0);
        assert!(gathered.iter().all(|f| f.is_some()));
        assert_eq!(window.anchor(), Some(1));
    }

    #[test]
    fn test_half_period_boundary_never_stores_out_of_window() {
        // d == M/2 is the ambiguous region of the stale heuristic. Pin
        // down only what must hold: the frame is not stored at an
        // unrepresentable row, and the buffer stays usable.
        let cfg = config(4, 16);
        let (mut window, rec) = recorded_window(1, &cfg);
        window.push(frame("head0", 0), 0, 0);

        // d = (8 - 0) mod 16 = 8 == M/2
        window.push(frame("head0", 8), 8, 0);
        let reports = rec.recorded();
        assert!(reports.iter().any(|d| matches!(
            d,
            BufferDiagnostic::DiscardedPush { distance: 8, .. }
                | BufferDiagnostic::WindowJump { to: 8, .. }
        )));
        // whatever the verdict, the anchor is a valid event number
        assert!(window.anchor().unwrap() < 16);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_event_out_of_range_panics() {
        let mut window = EventWindow::new(1, &config(4, 16));
        window.push(frame("head0", 16), 16, 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_source_out_of_range_panics() {
        let mut window = EventWindow::new(1, &config(4, 16));
        window.push(frame("head0", 1), 1, 1);
    }

    #[test]
    fn test_invalid_pop_reports_and_returns_empty() {
        let cfg = config(4, 16);
        let (mut window, rec) = recorded_window(1, &cfg);
        window.push(frame("head0", 4), 4, 0);

        assert!(window.pop(12).is_empty());
        assert_eq!(
            rec.count_matching(|d| matches!(d, BufferDiagnostic::InvalidPop { .. })),
            1
        );
        // frame for event 4 is untouched
        assert_eq!(window.stats().occupied_slots, 1);
    }
}
