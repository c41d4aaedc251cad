//! Collaborator seams for the engine.
//!
//! This module defines trait-based abstractions over the services the engine
//! consumes but does not own: the telemetry snapshot store, the connected-
//! client registry, alarm strategies and their history, the diagnostic file
//! ledger, and the static security-scan results. Implementations live with
//! the surrounding application; the engine only depends on the traits, so
//! the core correlation and derivation logic stays a pure function of its
//! inputs.

mod file;
mod snapshot;

pub use file::FileStore;
pub use snapshot::{ProcessMetrics, ProcessSnapshot, SystemMetrics, TimedSnapshot};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Identifies one monitored process instance: an application plus the agent
/// running inside one of its processes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentRef {
    pub app_id: String,
    pub agent_id: String,
}

impl AgentRef {
    pub fn new(app_id: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            agent_id: agent_id.into(),
        }
    }
}

impl std::fmt::Display for AgentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.app_id, self.agent_id)
    }
}

/// One connected agent instance as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentClient {
    pub agent_id: String,
}

/// An alarm strategy configured for an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: u64,
    #[serde(default)]
    pub context: String,
}

/// Vulnerability counts attached to one scanned file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerabilities {
    pub high: u64,
    pub critical: u64,
}

/// One static-scan result file, possibly not yet scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFile {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskReport>,
}

/// The scored risk of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskReport {
    pub vulnerabilities: Vulnerabilities,
}

/// Periodic profiling snapshots, per agent.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Most recent per-process sample set, or `None` when the agent has not
    /// reported yet.
    async fn latest_process(&self, agent: &AgentRef) -> Result<Option<ProcessSnapshot>>;

    /// Most recent host-level sample, or `None` when the agent has not
    /// reported yet.
    async fn latest_system(&self, agent: &AgentRef) -> Result<Option<SystemMetrics>>;

    /// Samples covering the last `period_secs` seconds, ordered by
    /// collection time. When `pid` is given, process samples are filtered
    /// to that pid.
    async fn range(
        &self,
        agent: &AgentRef,
        period_secs: u64,
        pid: Option<u32>,
    ) -> Result<Vec<TimedSnapshot>>;
}

/// Currently connected agent instances for an application.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    async fn clients(&self, app_id: &str) -> Result<Vec<AgentClient>>;
}

/// Alarm strategies configured for an application.
#[async_trait]
pub trait StrategyStore: Send + Sync {
    async fn strategies(&self, app_id: &str) -> Result<Vec<Strategy>>;
}

/// Alarm history, aggregated elsewhere; the engine only needs counts.
#[async_trait]
pub trait AlarmStore: Send + Sync {
    /// Number of alarms recorded for a strategy over the last
    /// `period_mins` minutes.
    async fn history_count(&self, strategy_id: u64, period_mins: u64) -> Result<u64>;
}

/// Ledger of diagnostic artifacts produced by remote actions.
#[async_trait]
pub trait FileRecordStore: Send + Sync {
    async fn record(
        &self,
        agent: &AgentRef,
        action: &str,
        file_path: &str,
        user_id: u64,
    ) -> Result<()>;
}

/// Static security-scan results.
#[async_trait]
pub trait RiskStore: Send + Sync {
    /// Scan results for one category (e.g. `"package"`), or `None` when no
    /// scan has run. `cached` allows a stale answer.
    async fn files(
        &self,
        agent: &AgentRef,
        category: &str,
        cached: bool,
    ) -> Result<Option<Vec<RiskFile>>>;
}
