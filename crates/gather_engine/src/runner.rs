//! Gather loop - drives acquisition into the event window.
//!
//! Polls every source's non-blocking fetch, pushes each frame by the
//! event number in its footer, and on row completion immediately pops and
//! forwards the gathered set. Two configurations of the same component:
//! one task polling all sources round-robin (unlocked window), or one
//! task per source against a shared locked window.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{
    ConcurrencyMode, FrameSource, GatherConfig, GatherMeta, GatheredSet, WindowStats,
};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace};

use crate::shared::SharedEventWindow;
use crate::window::EventWindow;

/// Cooperative stop signal, checked between fetch attempts.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop after its current fetch attempt.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Gather loop over a set of frame sources.
pub struct GatherLoop {
    config: GatherConfig,
    stop: StopHandle,
}

impl GatherLoop {
    pub fn new(config: GatherConfig) -> Self {
        Self {
            config,
            stop: StopHandle::new(),
        }
    }

    /// Handle for requesting shutdown from outside the loop.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run until stopped or the consumer side of `output` closes.
    ///
    /// Source index is position in `sources`. Sets are produced in
    /// increasing modular event order and `seq` records that order; with
    /// per-source workers, delivery of adjacent sets to the channel may
    /// interleave, so order-sensitive consumers sort by `seq`.
    #[instrument(name = "gather_loop_run", skip(self, sources, output), fields(sources = sources.len(), mode = ?self.config.concurrency))]
    pub async fn run(
        self,
        sources: Vec<Box<dyn FrameSource>>,
        output: mpsc::Sender<GatheredSet>,
    ) {
        assert!(!sources.is_empty(), "gather loop needs at least one source");
        info!(
            sources = sources.len(),
            rows = self.config.window.rows,
            event_modulus = self.config.window.event_modulus,
            "gather loop starting"
        );

        match self.config.concurrency {
            ConcurrencyMode::SingleThreaded => self.run_round_robin(sources, output).await,
            ConcurrencyMode::MultiThreaded => self.run_per_source(sources, output).await,
        }

        info!("gather loop finished");
    }

    /// One control flow polls all sources; no locking involved.
    async fn run_round_robin(
        &self,
        mut sources: Vec<Box<dyn FrameSource>>,
        output: mpsc::Sender<GatheredSet>,
    ) {
        let mut window = EventWindow::new(sources.len(), &self.config.window);
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let mut seq = 0u64;

        while !self.stop.is_stopped() {
            let mut fetched = 0usize;
            for (index, source) in sources.iter_mut().enumerate() {
                let Some(frame) = source.try_fetch() else {
                    continue;
                };
                fetched += 1;
                metrics::counter!("gather_frames_fetched_total").increment(1);

                let event_number = frame.event_number();
                trace!(source = index, event_number, "frame fetched");
                if window.push(frame, event_number, index) {
                    let set = build_set(window.pop(event_number), event_number, seq, window.stats());
                    seq += 1;
                    if output.send(set).await.is_err() {
                        debug!("consumer closed, stopping gather loop");
                        return;
                    }
                }
            }

            if fetched == 0 {
                tokio::time::sleep(poll_interval).await;
            }
        }
    }

    /// One worker per source against the same shared window.
    async fn run_per_source(
        &self,
        sources: Vec<Box<dyn FrameSource>>,
        output: mpsc::Sender<GatheredSet>,
    ) {
        let shared = SharedEventWindow::new(EventWindow::new(sources.len(), &self.config.window));
        let seq = Arc::new(AtomicU64::new(0));
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        let mut workers = Vec::with_capacity(sources.len());
        for (index, source) in sources.into_iter().enumerate() {
            let shared = shared.clone();
            let output = output.clone();
            let stop = self.stop.clone();
            let seq = Arc::clone(&seq);

            workers.push(tokio::spawn(source_worker(
                source,
                index,
                shared,
                output,
                stop,
                seq,
                poll_interval,
            )));
        }

        for worker in workers {
            // worker panics are caller contract breaches; surface them
            worker.await.expect("gather worker panicked");
        }
    }
}

#[instrument(name = "gather_source_worker", skip_all, fields(source = index, source_id = %source.source_id()))]
async fn source_worker(
    mut source: Box<dyn FrameSource>,
    index: usize,
    shared: SharedEventWindow,
    output: mpsc::Sender<GatheredSet>,
    stop: StopHandle,
    seq: Arc<AtomicU64>,
    poll_interval: Duration,
) {
    debug!("source worker started");
    while !stop.is_stopped() {
        let Some(frame) = source.try_fetch() else {
            tokio::time::sleep(poll_interval).await;
            continue;
        };
        metrics::counter!("gather_frames_fetched_total").increment(1);

        let event_number = frame.event_number();
        if let Some((seq, frames, stats)) = shared.push_complete(frame, event_number, index, &seq)
        {
            let set = build_set(frames, event_number, seq, stats);
            if output.send(set).await.is_err() {
                debug!("consumer closed, stopping source worker");
                return;
            }
        }
    }
    debug!("source worker stopped");
}

fn build_set(
    frames: Vec<Option<contracts::Frame>>,
    event_number: u32,
    seq: u64,
    window: WindowStats,
) -> GatheredSet {
    let missing_sources: Vec<usize> = frames
        .iter()
        .enumerate()
        .filter_map(|(index, frame)| frame.is_none().then_some(index))
        .collect();

    GatheredSet {
        event_number,
        seq,
        frames,
        meta: GatherMeta {
            missing_sources,
            window,
        },
    }
}
