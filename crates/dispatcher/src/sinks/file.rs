//! JsonlFileSink - writes one JSON line per gathered set

use contracts::{ContractError, GatherSink, GatheredSet};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

/// Configuration for JsonlFileSink
#[derive(Debug, Clone)]
pub struct JsonlFileSinkConfig {
    /// Output file path
    pub path: PathBuf,
}

impl JsonlFileSinkConfig {
    /// Create config from params map
    ///
    /// `path` takes the output file verbatim; otherwise a timestamped
    /// file is created under `dir` (default `./output`).
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = match params.get("path") {
            Some(path) => PathBuf::from(path),
            None => {
                let dir = params
                    .get("dir")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./output"));
                let stamp = chrono::Local::now().format("%Y%m%dT%H%M%S");
                dir.join(format!("gathered_{stamp}.jsonl"))
            }
        };

        Self { path }
    }
}

/// Line format: frame metadata only, payload bytes stay out of the file.
#[derive(Debug, Serialize)]
struct SetRecord<'a> {
    seq: u64,
    event_number: u32,
    complete: bool,
    missing_sources: &'a [usize],
    frames: Vec<FrameEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct FrameEntry<'a> {
    source_id: &'a str,
    event_number: u32,
    timestamp_us: u64,
    payload_len: usize,
}

/// Sink that appends gathered sets to a JSONL file
pub struct JsonlFileSink {
    name: String,
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlFileSink {
    /// Create a new JsonlFileSink
    pub fn new(name: impl Into<String>, config: JsonlFileSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&config.path)?;

        Ok(Self {
            name: name.into(),
            path: config.path,
            writer: BufWriter::new(file),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = JsonlFileSinkConfig::from_params(params);
        Self::new(name, config)
    }

    /// Output file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn write_record(&mut self, set: &GatheredSet) -> std::io::Result<()> {
        let record = SetRecord {
            seq: set.seq,
            event_number: set.event_number,
            complete: set.is_complete(),
            missing_sources: &set.meta.missing_sources,
            frames: set
                .frames
                .iter()
                .flatten()
                .map(|frame| FrameEntry {
                    source_id: &frame.source_id,
                    event_number: frame.footer.event_number,
                    timestamp_us: frame.footer.timestamp_us,
                    payload_len: frame.payload.len(),
                })
                .collect(),
        };

        serde_json::to_writer(&mut self.writer, &record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn persist_set(&mut self, set: &GatheredSet) -> Result<(), ContractError> {
        self.write_record(set).map_err(|e| {
            error!(sink = %self.name, seq = set.seq, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }
}

impl GatherSink for JsonlFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "jsonl_sink_write",
        skip(self, set),
        fields(sink = %self.name, seq = set.seq)
    )]
    async fn write(&mut self, set: &GatheredSet) -> Result<(), ContractError> {
        self.persist_set(set)?;
        Ok(())
    }

    #[instrument(name = "jsonl_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "jsonl_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.writer
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        debug!(sink = %self.name, path = %self.path.display(), "JsonlFileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{Frame, GatherMeta};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_jsonl_sink_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let config = JsonlFileSinkConfig { path: path.clone() };

        let mut sink = JsonlFileSink::new("test_file", config).unwrap();
        let frame = Frame::new("head0".into(), 3, 60_000, Bytes::from_static(b"abcd"));
        let set = GatheredSet {
            event_number: 3,
            seq: 0,
            frames: vec![Some(frame), None],
            meta: GatherMeta {
                missing_sources: vec![1],
                window: Default::default(),
            },
        };

        sink.write(&set).await.unwrap();
        sink.flush().await.unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);

        let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record["event_number"], 3);
        assert_eq!(record["complete"], false);
        assert_eq!(record["missing_sources"][0], 1);
        assert_eq!(record["frames"][0]["source_id"], "head0");
        assert_eq!(record["frames"][0]["payload_len"], 4);
    }

    #[tokio::test]
    async fn test_default_path_is_timestamped() {
        let dir = tempdir().unwrap();
        let mut params = HashMap::new();
        params.insert("dir".to_string(), dir.path().display().to_string());

        let config = JsonlFileSinkConfig::from_params(&params);
        assert!(config.path.starts_with(dir.path()));
        assert_eq!(config.path.extension().unwrap(), "jsonl");
    }
}
