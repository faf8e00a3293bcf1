//! # Acquisition
//!
//! Frame-source implementations behind the [`contracts::FrameSource`]
//! trait: a clock-driven mock generator for rigs without hardware, a
//! JSONL recording replayer, and a factory that builds the source list
//! from a [`contracts::RigBlueprint`].

mod error;
mod factory;
mod mock;
mod replay;

pub use error::AcquisitionError;
pub use factory::build_sources;
pub use mock::{MockFrameSource, MockSourceConfig};
pub use replay::{FrameRecord, ReplayFrameSource};

// Re-exports
pub use contracts::{Frame, FrameSource, SourceId};
