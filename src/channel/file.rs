//! File-backed command channel.
//!
//! Serves the process listing from a file instead of a live agent. Used by
//! the one-shot CLI and by tests; commands with remote side effects are
//! refused, since there is no process to profile.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{AgentCommand, CommandChannel};
use crate::error::{Error, Result};
use crate::store::AgentRef;

/// A command channel that answers `list-node-processes` with the raw
/// contents of a listing file (`pid NUL command` rows, as on the wire).
#[derive(Debug)]
pub struct FileChannel {
    path: PathBuf,
}

impl FileChannel {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl CommandChannel for FileChannel {
    async fn send(&self, _agent: &AgentRef, command: &AgentCommand) -> Result<String> {
        match command {
            AgentCommand::ListNodeProcesses => fs::read_to_string(&self.path)
                .await
                .map_err(|e| Error::Channel(format!("{}: {}", self.path.display(), e))),
            other => Err(Error::Channel(format!(
                "{} is not available offline",
                other.name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::parse_process_listing;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn agent() -> AgentRef {
        AgentRef::new("demo-app", "demo-agent")
    }

    #[tokio::test]
    async fn test_serves_listing_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "1\u{0}node app.js\n2\u{0}node worker.js\n").unwrap();

        let channel = FileChannel::new(file.path());
        let payload = channel
            .send(&agent(), &AgentCommand::ListNodeProcesses)
            .await
            .unwrap();

        let listing = parse_process_listing(&payload);
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[1].command, "node worker.js");
    }

    #[tokio::test]
    async fn test_refuses_side_effecting_commands() {
        let file = NamedTempFile::new().unwrap();
        let channel = FileChannel::new(file.path());

        let err = channel
            .send(&agent(), &AgentCommand::HeapDump { pid: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Channel(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_channel_error() {
        let channel = FileChannel::new("/nonexistent/listing.txt");
        let err = channel
            .send(&agent(), &AgentCommand::ListNodeProcesses)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Channel(_)));
    }
}
