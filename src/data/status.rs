//! Threshold-based status classification for "current" views.
//!
//! Every metric type owns one extraction rule (which field, which scale);
//! the same rule feeds both the status classification here and the trend
//! derivation in [`super::trend`], so the two views can never disagree on
//! what a metric means.

use serde::{Deserialize, Serialize};

use super::bytes::format_size;
use crate::error::Error;
use crate::store::{ProcessMetrics, ProcessSnapshot, SystemMetrics, TimedSnapshot};

/// Ordinal status classification, serialized as its numeric level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StatusLevel {
    Normal,
    Warning,
    Critical,
}

impl StatusLevel {
    /// Classify a value against the thresholds. Monotonic: a larger value
    /// never yields a lower level.
    pub fn classify(value: f64, thresholds: &Thresholds) -> Self {
        if value >= thresholds.critical {
            StatusLevel::Critical
        } else if value >= thresholds.warning {
            StatusLevel::Warning
        } else {
            StatusLevel::Normal
        }
    }
}

impl From<StatusLevel> for u8 {
    fn from(level: StatusLevel) -> Self {
        match level {
            StatusLevel::Normal => 0,
            StatusLevel::Warning => 1,
            StatusLevel::Critical => 2,
        }
    }
}

impl TryFrom<u8> for StatusLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StatusLevel::Normal),
            1 => Ok(StatusLevel::Warning),
            2 => Ok(StatusLevel::Critical),
            other => Err(format!("invalid status level: {other}")),
        }
    }
}

/// Warning/critical boundaries for status classification, in percent.
///
/// A policy parameter, not part of the algorithm; configured per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: 80.0,
            critical: 90.0,
        }
    }
}

/// Which side of the telemetry a metric reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricScope {
    /// Per-process samples; the "process under the most load" indicator.
    Process,
    /// One host-level record.
    System,
}

/// The closed set of metric types the console can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    ProcessCpu,
    ProcessMemory,
    SystemCpu,
    SystemMemory,
    Disk,
}

impl MetricKind {
    /// Parse the metric type name used by the console API.
    pub fn parse(name: &str) -> Result<Self, Error> {
        match name {
            "processCpuUsage" => Ok(MetricKind::ProcessCpu),
            "processMemoryUsage" => Ok(MetricKind::ProcessMemory),
            "systemCpuUsage" => Ok(MetricKind::SystemCpu),
            "systemMemoryUsage" => Ok(MetricKind::SystemMemory),
            "diskUsage" => Ok(MetricKind::Disk),
            other => Err(Error::UnknownMetric(other.to_string())),
        }
    }

    pub fn scope(&self) -> MetricScope {
        match self {
            MetricKind::ProcessCpu | MetricKind::ProcessMemory => MetricScope::Process,
            MetricKind::SystemCpu | MetricKind::SystemMemory | MetricKind::Disk => {
                MetricScope::System
            }
        }
    }

    /// Extraction rule for process-scoped kinds. Process percentages arrive
    /// pre-scaled from the collector, so no rescale happens here.
    fn process_value(&self, metrics: &ProcessMetrics) -> Option<f64> {
        match self {
            MetricKind::ProcessCpu => Some(metrics.cpu_60),
            MetricKind::ProcessMemory => Some(metrics.heap_used_percent),
            _ => None,
        }
    }

    /// Extraction rule for system-scoped kinds. CPU and memory are stored
    /// as fractions and scaled to percent; disk is already a percentage.
    fn system_value(&self, system: &SystemMetrics) -> Option<f64> {
        match self {
            MetricKind::SystemCpu => Some(system.used_cpu * 100.0),
            MetricKind::SystemMemory => Some(system.used_memory_percent * 100.0),
            MetricKind::Disk => Some(system.max_disk_usage),
            _ => None,
        }
    }

    /// Extract this metric from one historical snapshot. Returns `None`
    /// when the snapshot does not carry the metric (pid missing, no system
    /// record), which produces no trend point rather than a fabricated one.
    pub fn extract(&self, snapshot: &TimedSnapshot, pid: Option<u32>) -> Option<f64> {
        match self.scope() {
            MetricScope::Process => {
                let metrics = snapshot.process.get(&pid?)?;
                self.process_value(metrics)
            }
            MetricScope::System => self.system_value(snapshot.system.as_ref()?),
        }
    }
}

/// Status row for one agent in the console overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentMetric {
    pub agent_id: String,
    pub status: StatusLevel,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

impl AgentMetric {
    /// The neutral row used when an agent has no telemetry yet. Absence is
    /// an expected steady state, not a fault.
    pub fn placeholder(agent_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            status: StatusLevel::Normal,
            title: "-".to_string(),
            pid: None,
        }
    }
}

/// Among all pids in a snapshot, the one with the maximum value of the
/// kind's field. Iteration is ascending by pid and the comparison is strict,
/// so ties deterministically go to the lowest pid.
fn busiest_pid<'a>(
    snapshot: &'a ProcessSnapshot,
    kind: MetricKind,
) -> Option<(u32, &'a ProcessMetrics, f64)> {
    let mut best: Option<(u32, &ProcessMetrics, f64)> = None;
    for (pid, metrics) in snapshot {
        let value = kind.process_value(metrics)?;
        match best {
            Some((_, _, max)) if value <= max => {}
            _ => best = Some((*pid, metrics, value)),
        }
    }
    best
}

/// Status row for a process-scoped metric: classify the busiest process.
pub fn process_agent_metric(
    agent_id: &str,
    kind: MetricKind,
    snapshot: Option<&ProcessSnapshot>,
    thresholds: &Thresholds,
) -> AgentMetric {
    let Some((pid, metrics, value)) = snapshot.and_then(|s| busiest_pid(s, kind)) else {
        return AgentMetric::placeholder(agent_id);
    };

    let title = match kind {
        MetricKind::ProcessCpu => format!("{value:.2}%"),
        MetricKind::ProcessMemory => format_size(metrics.heap_used),
        _ => return AgentMetric::placeholder(agent_id),
    };

    AgentMetric {
        agent_id: agent_id.to_string(),
        status: StatusLevel::classify(value, thresholds),
        title,
        pid: Some(pid),
    }
}

/// Status row for a system-scoped metric.
pub fn system_agent_metric(
    agent_id: &str,
    kind: MetricKind,
    system: Option<&SystemMetrics>,
    thresholds: &Thresholds,
) -> AgentMetric {
    let Some(system) = system else {
        return AgentMetric::placeholder(agent_id);
    };
    let Some(value) = kind.system_value(system) else {
        return AgentMetric::placeholder(agent_id);
    };

    let title = match kind {
        MetricKind::SystemCpu => format!("{value:.2}%"),
        MetricKind::SystemMemory => format_size(system.used_memory),
        MetricKind::Disk => format!("{} : {}%", system.max_disk, system.max_disk_usage),
        _ => return AgentMetric::placeholder(agent_id),
    };

    AgentMetric {
        agent_id: agent_id.to_string(),
        status: StatusLevel::classify(value, thresholds),
        title,
        pid: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(cpu: f64, heap_percent: f64, heap_used: u64) -> ProcessMetrics {
        ProcessMetrics {
            uptime: 60.0,
            cpu_60: cpu,
            heap_used_percent: heap_percent,
            heap_used,
            gc_time_during_last_record: 0.0,
            rss: 0,
            active_handles: 0,
            active_timer_handles: 0,
            active_tcp_handles: 0,
            active_udp_handles: 0,
        }
    }

    fn system(cpu: f64, mem_percent: f64) -> SystemMetrics {
        SystemMetrics {
            used_cpu: cpu,
            used_memory: 4_294_967_296,
            used_memory_percent: mem_percent,
            max_disk: "/data".to_string(),
            max_disk_usage: 63.0,
        }
    }

    #[test]
    fn test_classify_thresholds() {
        let thresholds = Thresholds::default();
        assert_eq!(
            StatusLevel::classify(79.9, &thresholds),
            StatusLevel::Normal
        );
        assert_eq!(
            StatusLevel::classify(80.0, &thresholds),
            StatusLevel::Warning
        );
        assert_eq!(
            StatusLevel::classify(90.0, &thresholds),
            StatusLevel::Critical
        );
    }

    #[test]
    fn test_classify_is_idempotent() {
        let thresholds = Thresholds::default();
        let first = StatusLevel::classify(85.0, &thresholds);
        let second = StatusLevel::classify(85.0, &thresholds);
        assert_eq!(first, second);
    }

    #[test]
    fn test_status_level_serializes_as_number() {
        assert_eq!(serde_json::to_string(&StatusLevel::Normal).unwrap(), "0");
        assert_eq!(serde_json::to_string(&StatusLevel::Critical).unwrap(), "2");
    }

    #[test]
    fn test_metric_kind_parse() {
        assert_eq!(
            MetricKind::parse("processCpuUsage").unwrap(),
            MetricKind::ProcessCpu
        );
        assert_eq!(MetricKind::parse("diskUsage").unwrap(), MetricKind::Disk);
        assert!(matches!(
            MetricKind::parse("explodeUsage"),
            Err(Error::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_busiest_pid_picks_maximum() {
        let mut snapshot = ProcessSnapshot::new();
        snapshot.insert(10, metrics(10.0, 0.0, 0));
        snapshot.insert(20, metrics(55.0, 0.0, 0));
        snapshot.insert(30, metrics(20.0, 0.0, 0));

        let (pid, _, value) = busiest_pid(&snapshot, MetricKind::ProcessCpu).unwrap();
        assert_eq!(pid, 20);
        assert_eq!(value, 55.0);
    }

    #[test]
    fn test_busiest_pid_tie_goes_to_lowest() {
        let mut snapshot = ProcessSnapshot::new();
        snapshot.insert(30, metrics(55.0, 0.0, 0));
        snapshot.insert(10, metrics(55.0, 0.0, 0));

        let (pid, _, _) = busiest_pid(&snapshot, MetricKind::ProcessCpu).unwrap();
        assert_eq!(pid, 10);
    }

    #[test]
    fn test_process_cpu_row() {
        let mut snapshot = ProcessSnapshot::new();
        snapshot.insert(7, metrics(43.234, 0.0, 0));

        let row = process_agent_metric(
            "agent-1",
            MetricKind::ProcessCpu,
            Some(&snapshot),
            &Thresholds::default(),
        );
        assert_eq!(row.title, "43.23%");
        assert_eq!(row.status, StatusLevel::Normal);
        assert_eq!(row.pid, Some(7));
    }

    #[test]
    fn test_process_memory_row_formats_heap_bytes() {
        let mut snapshot = ProcessSnapshot::new();
        snapshot.insert(7, metrics(0.0, 92.5, 52_428_800));

        let row = process_agent_metric(
            "agent-1",
            MetricKind::ProcessMemory,
            Some(&snapshot),
            &Thresholds::default(),
        );
        assert_eq!(row.title, "50.00 MB");
        assert_eq!(row.status, StatusLevel::Critical);
    }

    #[test]
    fn test_no_data_yields_placeholder() {
        let row = process_agent_metric(
            "agent-1",
            MetricKind::ProcessCpu,
            None,
            &Thresholds::default(),
        );
        assert_eq!(row.status, StatusLevel::Normal);
        assert_eq!(row.title, "-");
        assert_eq!(row.pid, None);

        let row = system_agent_metric(
            "agent-1",
            MetricKind::SystemCpu,
            None,
            &Thresholds::default(),
        );
        assert_eq!(row.title, "-");
    }

    #[test]
    fn test_system_cpu_scales_fraction() {
        let row = system_agent_metric(
            "agent-1",
            MetricKind::SystemCpu,
            Some(&system(0.42, 0.0)),
            &Thresholds::default(),
        );
        assert_eq!(row.title, "42.00%");
        assert_eq!(row.status, StatusLevel::Normal);
    }

    #[test]
    fn test_system_memory_classifies_scaled_percent() {
        let row = system_agent_metric(
            "agent-1",
            MetricKind::SystemMemory,
            Some(&system(0.0, 0.95)),
            &Thresholds::default(),
        );
        assert_eq!(row.title, "4.00 GB");
        assert_eq!(row.status, StatusLevel::Critical);
    }

    #[test]
    fn test_disk_row_title() {
        let row = system_agent_metric(
            "agent-1",
            MetricKind::Disk,
            Some(&system(0.0, 0.0)),
            &Thresholds::default(),
        );
        assert_eq!(row.title, "/data : 63%");
        assert_eq!(row.status, StatusLevel::Normal);
    }
}
