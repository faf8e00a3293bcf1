//! LogSink - logs gathered-set summaries via tracing

use contracts::{ContractError, GatherSink, GatheredSet};
use tracing::{info, instrument};

/// Sink that logs set summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_set_summary(&self, set: &GatheredSet) {
        info!(
            sink = %self.name,
            seq = set.seq,
            event_number = set.event_number,
            present = set.present_count(),
            missing = set.meta.missing_sources.len(),
            anchor = ?set.meta.window.anchor,
            "GatheredSet received"
        );
    }
}

impl GatherSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, set),
        fields(sink = %self.name, seq = set.seq)
    )]
    async fn write(&mut self, set: &GatheredSet) -> Result<(), ContractError> {
        self.log_set_summary(set);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::GatherMeta;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let set = GatheredSet {
            event_number: 1,
            seq: 1,
            frames: vec![],
            meta: GatherMeta::default(),
        };

        let result = sink.write(&set).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
