//! # Dispatcher
//!
//! Fan-out of gathered sets to output sinks.
//!
//! Each sink runs behind its own bounded queue and worker task, so a slow
//! or failing sink drops its own sets instead of stalling the gather loop.

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{GatherSink, GatheredSet};
pub use dispatcher::{Dispatcher, DispatcherBuilder, DispatcherConfig, create_dispatcher};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{JsonlFileSink, LogSink};
