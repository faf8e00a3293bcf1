//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace:
//! data structures and traits exchanged between acquisition, the gather
//! engine, the dispatcher and the CLI. Business crates depend on this
//! crate only; reverse dependencies are prohibited.
//!
//! ## Event model
//! - Each frame carries a modular event number assigned by its source
//!   hardware counter (`u32` in `[0, event_modulus)`).
//! - `seq` on a [`GatheredSet`] is a monotonically increasing emission
//!   counter, independent of the wrapping event space.

mod blueprint;
mod error;
mod frame;
mod gather_config;
mod gathered;
mod sink;
mod source;
mod source_id;

pub use blueprint::*;
pub use error::*;
pub use frame::*;
pub use gather_config::*;
pub use gathered::*;
pub use sink::*;
pub use source::FrameSource;
pub use source_id::SourceId;
