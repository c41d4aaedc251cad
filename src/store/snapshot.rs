//! Shared types for telemetry snapshots.
//!
//! These types match the records produced by the out-of-band collector that
//! samples every monitored process once per period. Process snapshots are
//! keyed by pid; the collector serializes pids as JSON object keys (strings),
//! while the live process listing reports them as text. Both are normalized
//! to numeric pids at their parse boundary so correlation always compares
//! `u32` to `u32`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One process's periodic resource sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessMetrics {
    /// Seconds since the process started.
    pub uptime: f64,
    /// CPU usage over the last 60 seconds, in percent.
    pub cpu_60: f64,
    /// Heap usage as a percentage of the heap limit.
    pub heap_used_percent: f64,
    /// Heap bytes in use.
    pub heap_used: u64,
    /// Milliseconds spent in GC during the last record period.
    pub gc_time_during_last_record: f64,
    /// Resident set size in bytes.
    pub rss: u64,
    /// Total active libuv handles.
    pub active_handles: u64,
    /// Active timer handles.
    pub active_timer_handles: u64,
    /// Active TCP handles.
    pub active_tcp_handles: u64,
    /// Active UDP handles.
    pub active_udp_handles: u64,
}

/// The most recent sample set for one agent, keyed by pid.
///
/// JSON object keys are always strings; serde parses them into numeric pids
/// here, so a snapshot that disagrees with the listing on representation
/// still correlates. Non-numeric keys are rejected as malformed. BTreeMap
/// iteration is ascending by pid, which makes every "first encountered"
/// decision downstream deterministic.
pub type ProcessSnapshot = BTreeMap<u32, ProcessMetrics>;

/// System-level resource sample for one agent's host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    /// CPU usage as a fraction (0..1).
    pub used_cpu: f64,
    /// Memory bytes in use.
    pub used_memory: u64,
    /// Memory usage as a fraction (0..1).
    pub used_memory_percent: f64,
    /// Mount point (or label) of the fullest disk.
    pub max_disk: String,
    /// Usage of the fullest disk, in percent.
    pub max_disk_usage: f64,
}

/// One element of a historical range query, ordered by collection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSnapshot {
    /// Unix timestamp in milliseconds when this sample was collected.
    pub timestamp: u64,
    /// Per-process samples; may be empty for a system-only sample.
    #[serde(default)]
    pub process: ProcessSnapshot,
    /// Host-level sample, if collected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metrics(cpu: f64) -> ProcessMetrics {
        ProcessMetrics {
            uptime: 3600.0,
            cpu_60: cpu,
            heap_used_percent: 45.5,
            heap_used: 52_428_800,
            gc_time_during_last_record: 600.0,
            rss: 104_857_600,
            active_handles: 12,
            active_timer_handles: 3,
            active_tcp_handles: 7,
            active_udp_handles: 0,
        }
    }

    #[test]
    fn test_deserialize_snapshot_with_string_pid_keys() {
        let json = r#"{
            "4321": {
                "uptime": 120.5,
                "cpu_60": 43.21,
                "heap_used_percent": 12.3,
                "heap_used": 1048576,
                "gc_time_during_last_record": 600,
                "rss": 20971520,
                "active_handles": 5,
                "active_timer_handles": 1,
                "active_tcp_handles": 2,
                "active_udp_handles": 0
            }
        }"#;

        let snapshot: ProcessSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.len(), 1);

        let metrics = snapshot.get(&4321).unwrap();
        assert_eq!(metrics.cpu_60, 43.21);
        assert_eq!(metrics.heap_used, 1_048_576);
    }

    #[test]
    fn test_non_numeric_pid_key_is_rejected() {
        let json = r#"{ "not-a-pid": { "uptime": 1.0 } }"#;
        assert!(serde_json::from_str::<ProcessSnapshot>(json).is_err());
    }

    #[test]
    fn test_snapshot_iterates_in_pid_order() {
        let mut snapshot = ProcessSnapshot::new();
        snapshot.insert(30, sample_metrics(1.0));
        snapshot.insert(10, sample_metrics(2.0));
        snapshot.insert(20, sample_metrics(3.0));

        let pids: Vec<u32> = snapshot.keys().copied().collect();
        assert_eq!(pids, vec![10, 20, 30]);
    }

    #[test]
    fn test_timed_snapshot_defaults() {
        let json = r#"{ "timestamp": 1700000000000 }"#;
        let timed: TimedSnapshot = serde_json::from_str(json).unwrap();
        assert!(timed.process.is_empty());
        assert!(timed.system.is_none());
    }

    #[test]
    fn test_system_metrics_roundtrip() {
        let system = SystemMetrics {
            used_cpu: 0.42,
            used_memory: 8_589_934_592,
            used_memory_percent: 0.5,
            max_disk: "/data".to_string(),
            max_disk_usage: 77.0,
        };

        let json = serde_json::to_string(&system).unwrap();
        let back: SystemMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, system);
    }
}
