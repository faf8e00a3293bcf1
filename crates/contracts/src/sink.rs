//! GatherSink trait - consumer interface
//!
//! Defines the abstract interface for consumers of gathered frame sets.

use crate::{ContractError, GatheredSet};

/// Gathered-set consumer trait
///
/// All sink implementations must implement this trait. Sets arrive in
/// increasing (modular) event-number order as produced by the gather loop.
#[trait_variant::make(GatherSink: Send)]
pub trait LocalGatherSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one gathered set
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, set: &GatheredSet) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
