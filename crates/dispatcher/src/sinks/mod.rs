//! Sink implementations
//!
//! Contains LogSink and JsonlFileSink.

mod file;
mod log;

pub use self::file::JsonlFileSink;
pub use self::log::LogSink;
