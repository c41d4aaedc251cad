//! File-backed telemetry store.
//!
//! Reads a JSON document containing the latest process/system samples and an
//! optional history array. This is the offline mode used by the CLI and by
//! tests; a deployment backs [`TelemetryStore`] with its real snapshot
//! database instead.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use super::{AgentRef, ProcessSnapshot, SystemMetrics, TelemetryStore, TimedSnapshot};
use crate::error::Result;

#[derive(Debug, Default, Deserialize)]
struct Document {
    #[serde(default)]
    process: ProcessSnapshot,
    #[serde(default)]
    system: Option<SystemMetrics>,
    #[serde(default)]
    history: Vec<TimedSnapshot>,
}

/// A telemetry store that serves snapshots from a JSON file.
///
/// The file holds one agent's data; the store answers every `AgentRef` with
/// it, which is what the one-shot CLI needs.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    document: Document,
}

impl FileStore {
    /// Load and parse the given file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path)?;
        let document: Document = serde_json::from_str(&content)?;
        Ok(Self { path, document })
    }

    /// The path this store was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TelemetryStore for FileStore {
    async fn latest_process(&self, _agent: &AgentRef) -> Result<Option<ProcessSnapshot>> {
        if self.document.process.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.document.process.clone()))
    }

    async fn latest_system(&self, _agent: &AgentRef) -> Result<Option<SystemMetrics>> {
        Ok(self.document.system.clone())
    }

    async fn range(
        &self,
        _agent: &AgentRef,
        period_secs: u64,
        pid: Option<u32>,
    ) -> Result<Vec<TimedSnapshot>> {
        let Some(end) = self.document.history.iter().map(|s| s.timestamp).max() else {
            return Ok(Vec::new());
        };
        let start = end.saturating_sub(period_secs * 1000);

        let snapshots = self
            .document
            .history
            .iter()
            .filter(|s| s.timestamp >= start)
            .map(|s| {
                let mut snapshot = s.clone();
                if let Some(pid) = pid {
                    snapshot.process.retain(|p, _| *p == pid);
                }
                snapshot
            })
            .collect();
        Ok(snapshots)
    }
}
