//! Process-scoped operations: listings, the merged per-process view,
//! profiler status checks, trends, and on-demand diagnostic actions.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use tracing::info;

use crate::channel::{
    parse_process_listing, AgentCommand, CommandChannel, Dispatch, Dispatcher, ProcessEntry,
};
use crate::config::Config;
use crate::data::{correlate, trend, CorrelatedProcesses, MetricKind, TrendSeries};
use crate::error::{Error, Result};
use crate::store::{AgentRef, FileRecordStore, TelemetryStore};

/// Reply to a successful diagnostic action.
#[derive(Debug, Deserialize)]
struct ActionReply {
    filepath: String,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Process operations for one console deployment.
///
/// Holds the command dispatcher and the collaborator stores; every method is
/// stateless across calls. Methods that involve a dispatch return
/// `Result<Dispatch<T>, _>` so the boundary layer can finalize the response
/// exactly once: `AlreadyHandled` means the failure response is already out.
pub struct ProcessOps {
    config: Config,
    dispatcher: Dispatcher,
    telemetry: Arc<dyn TelemetryStore>,
    files: Arc<dyn FileRecordStore>,
}

impl ProcessOps {
    pub fn new(
        config: Config,
        channel: Arc<dyn CommandChannel>,
        telemetry: Arc<dyn TelemetryStore>,
        files: Arc<dyn FileRecordStore>,
    ) -> Self {
        let dispatcher = Dispatcher::new(channel, config.dispatch_timeout());
        Self {
            config,
            dispatcher,
            telemetry,
            files,
        }
    }

    /// The live Node.js process listing, straight from the agent.
    pub async fn node_processes(&self, agent: &AgentRef) -> Dispatch<Vec<ProcessEntry>> {
        self.dispatcher
            .dispatch(agent, AgentCommand::ListNodeProcesses)
            .await
            .map(|payload| parse_process_listing(&payload))
    }

    /// The merged per-process view: live listing correlated with the latest
    /// telemetry snapshot.
    ///
    /// The snapshot read and the listing dispatch are independent, so they
    /// run concurrently; a store failure fails the whole operation, a
    /// channel failure aborts it via `AlreadyHandled`.
    pub async fn merged_processes(
        &self,
        agent: &AgentRef,
    ) -> Result<Dispatch<CorrelatedProcesses>> {
        let (snapshot, dispatched) = tokio::join!(
            self.telemetry.latest_process(agent),
            self.dispatcher
                .dispatch(agent, AgentCommand::ListNodeProcesses),
        );
        let snapshot = snapshot?;

        Ok(dispatched.map(|payload| {
            let listing = parse_process_listing(&payload);
            correlate(&listing, snapshot.as_ref(), now_ms())
        }))
    }

    /// Ask the agent whether the profiler is attached to `pid`.
    pub async fn process_status(
        &self,
        agent: &AgentRef,
        pid: u32,
    ) -> Result<Dispatch<serde_json::Value>> {
        self.dispatcher
            .dispatch(agent, AgentCommand::CheckProcessStatus { pid })
            .await
            .try_map(|payload| {
                serde_json::from_str(&payload).map_err(|source| Error::MalformedPayload {
                    command: "check-process-status",
                    source,
                })
            })
    }

    /// Historical trend of one metric, from the snapshot store. No dispatch
    /// is involved; an agent without history yields an empty series.
    pub async fn process_trend(
        &self,
        agent: &AgentRef,
        pid: Option<u32>,
        kind: MetricKind,
        duration_mins: u64,
    ) -> Result<TrendSeries> {
        let snapshots = self
            .telemetry
            .range(agent, duration_mins * 60, pid)
            .await?;
        Ok(trend(&snapshots, kind, pid))
    }

    /// Run a diagnostic action against one process and record the produced
    /// artifact.
    ///
    /// Action names outside the supported set are rejected before any
    /// channel call. The underlying commands start remote sessions or write
    /// files and are not idempotent, so a timeout is surfaced once and never
    /// retried.
    pub async fn take_action(
        &self,
        agent: &AgentRef,
        pid: u32,
        action: &str,
        user_id: u64,
    ) -> Result<Dispatch<String>> {
        let profiling = &self.config.profiling_time;
        let command = match action {
            "cpuprofile" => AgentCommand::StartCpuProfiling {
                pid,
                profiling_time: profiling.cpu,
            },
            "heapprofile" => AgentCommand::StartHeapProfiling {
                pid,
                profiling_time: profiling.heap,
            },
            "gcprofile" => AgentCommand::StartGcProfiling {
                pid,
                profiling_time: profiling.gc,
            },
            "heapsnapshot" => AgentCommand::HeapDump { pid },
            "diag" => AgentCommand::DiagReport { pid },
            other => return Err(Error::UnsupportedAction(other.to_string())),
        };
        let command_name = command.name();

        let Dispatch::Completed(payload) = self.dispatcher.dispatch(agent, command).await else {
            return Ok(Dispatch::AlreadyHandled);
        };

        let reply: ActionReply =
            serde_json::from_str(&payload).map_err(|source| Error::MalformedPayload {
                command: command_name,
                source,
            })?;

        self.files
            .record(agent, action, &reply.filepath, user_id)
            .await?;
        info!(agent = %agent, action, file = %reply.filepath, "diagnostic artifact recorded");

        Ok(Dispatch::Completed(reply.filepath))
    }
}
