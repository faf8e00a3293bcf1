//! # Gather Engine
//!
//! Re-synchronizes N independently clocked frame sources into complete
//! per-event frame sets, keyed by a modular (wrapping) event number.
//!
//! Responsibilities:
//! - modular event arithmetic as an explicit primitive
//! - sliding event window buffer with discard/jump policy
//! - gather loop driving the per-source fetchers
//! - emitting [`GatheredSet`]s to the consumer channel
//!
//! ## Usage example
//!
//! ```ignore
//! use gather_engine::{EventWindow, GatherLoop};
//! use contracts::{GatherConfig, WindowConfig};
//!
//! let mut window = EventWindow::new(2, &WindowConfig::default());
//!
//! // Push frames as they arrive; a `true` return means the row is full
//! if window.push(frame, event_number, source_index) {
//!     let set = window.pop(event_number);
//!     // hand off to the consumer
//! }
//! ```

pub mod diagnostics;
pub mod modular;
mod runner;
mod shared;
mod window;

pub use diagnostics::{BufferDiagnostic, DiagnosticSink, LogDiagnostics, RecordingDiagnostics};
pub use modular::forward_distance;
pub use runner::{GatherLoop, StopHandle};
pub use shared::SharedEventWindow;
pub use window::EventWindow;

// Re-export contracts types
pub use contracts::{ConcurrencyMode, Frame, GatherConfig, GatheredSet, WindowConfig, WindowStats};
