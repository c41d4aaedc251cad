//! Command channel abstraction.
//!
//! Commands are one round trip to the agent embedded in a monitored process:
//! the channel delivers a named command with its arguments and returns the
//! agent's raw reply. The engine never talks to the transport directly; it
//! goes through [`Dispatcher`], which adds the wait bound and the
//! "already handled" failure contract.

mod dispatch;
mod file;

pub use dispatch::{Dispatch, Dispatcher};
pub use file::FileChannel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::AgentRef;

/// The closed set of commands an agent understands.
///
/// Profiling commands and the heap dump start a session or write an artifact
/// inside the remote process; they are not idempotent and must never be
/// retried blindly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentCommand {
    /// List the Node.js processes visible to the agent.
    ListNodeProcesses,
    /// Report whether the profiler is attached to a process.
    CheckProcessStatus { pid: u32 },
    /// Start a CPU profile for `profiling_time` milliseconds.
    StartCpuProfiling { pid: u32, profiling_time: u64 },
    /// Start a heap profile for `profiling_time` milliseconds.
    StartHeapProfiling { pid: u32, profiling_time: u64 },
    /// Start a GC profile for `profiling_time` milliseconds.
    StartGcProfiling { pid: u32, profiling_time: u64 },
    /// Write a heap snapshot.
    HeapDump { pid: u32 },
    /// Write a diagnostic report.
    DiagReport { pid: u32 },
}

impl AgentCommand {
    /// The command name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            AgentCommand::ListNodeProcesses => "list-node-processes",
            AgentCommand::CheckProcessStatus { .. } => "check-process-status",
            AgentCommand::StartCpuProfiling { .. } => "start-cpu-profiling",
            AgentCommand::StartHeapProfiling { .. } => "start-heap-profiling",
            AgentCommand::StartGcProfiling { .. } => "start-gc-profiling",
            AgentCommand::HeapDump { .. } => "heap-dump",
            AgentCommand::DiagReport { .. } => "diagnostic-report",
        }
    }

    /// Whether this command mutates state inside the remote process.
    pub fn has_side_effects(&self) -> bool {
        !matches!(
            self,
            AgentCommand::ListNodeProcesses | AgentCommand::CheckProcessStatus { .. }
        )
    }
}

/// Transport seam: one command/reply round trip to one agent.
///
/// Implementations fail with [`Error::Channel`](crate::Error::Channel) on
/// transport-level problems and [`Error::Timeout`](crate::Error::Timeout)
/// when they enforce their own reply deadline; the dispatcher applies an
/// outer bound either way.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    async fn send(&self, agent: &AgentRef, command: &AgentCommand) -> Result<String>;
}

/// One row of the live process listing returned by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub command: String,
}

/// Parse the raw `list-node-processes` payload.
///
/// The payload is newline-separated rows of `pid NUL command`. Rows that do
/// not carry both fields, or whose pid is not numeric, are skipped; an empty
/// payload is an empty listing, not an error.
pub fn parse_process_listing(payload: &str) -> Vec<ProcessEntry> {
    payload
        .lines()
        .filter_map(|line| {
            let (pid, command) = line.split_once('\u{0}')?;
            let pid = pid.trim().parse().ok()?;
            if command.is_empty() {
                return None;
            }
            Some(ProcessEntry {
                pid,
                command: command.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing() {
        let payload = "1234\u{0}node app.js\n5678\u{0}node worker.js\n";
        let listing = parse_process_listing(payload);
        assert_eq!(
            listing,
            vec![
                ProcessEntry {
                    pid: 1234,
                    command: "node app.js".to_string()
                },
                ProcessEntry {
                    pid: 5678,
                    command: "node worker.js".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_parse_listing_skips_malformed_rows() {
        let payload = "1234\u{0}node app.js\nno-separator\nabc\u{0}node x.js\n42\u{0}\n";
        let listing = parse_process_listing(payload);
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].pid, 1234);
    }

    #[test]
    fn test_parse_empty_listing() {
        assert!(parse_process_listing("").is_empty());
        assert!(parse_process_listing("\n\n").is_empty());
    }

    #[test]
    fn test_command_names() {
        assert_eq!(AgentCommand::ListNodeProcesses.name(), "list-node-processes");
        assert_eq!(
            AgentCommand::HeapDump { pid: 1 }.name(),
            "heap-dump"
        );
        assert_eq!(
            AgentCommand::StartCpuProfiling {
                pid: 1,
                profiling_time: 1000
            }
            .name(),
            "start-cpu-profiling"
        );
    }

    #[test]
    fn test_side_effects() {
        assert!(!AgentCommand::ListNodeProcesses.has_side_effects());
        assert!(!AgentCommand::CheckProcessStatus { pid: 1 }.has_side_effects());
        assert!(AgentCommand::HeapDump { pid: 1 }.has_side_effects());
        assert!(AgentCommand::DiagReport { pid: 1 }.has_side_effects());
    }
}
