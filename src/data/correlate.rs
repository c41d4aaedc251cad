//! Correlation of the live process listing with the latest telemetry
//! snapshot.
//!
//! The two inputs come from independent sources keyed by pid: the listing is
//! a command round trip to the agent, the snapshot is the periodic collector.
//! A merged view exists only for pids present in both; a listing entry
//! without telemetry is surfaced as-is so a running process is never
//! silently missing, and it is never padded with fabricated metric values.

use serde::{Deserialize, Serialize};

use crate::channel::ProcessEntry;
use crate::store::ProcessSnapshot;

/// One process with both its live identity and its latest metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedProcessView {
    pub pid: u32,
    pub cmd: String,
    /// Start time in Unix milliseconds, derived from uptime.
    pub start_time: u64,
    /// CPU usage over the last minute, percent, 2 decimals.
    pub cpu_usage: f64,
    /// Heap usage, percent, 2 decimals.
    pub heap_usage: f64,
    /// Share of the last record period spent in GC, percent, 2 decimals.
    pub gc_usage: f64,
    pub rss: u64,
    pub uv_handles: u64,
    pub timers: u64,
    pub tcp_handles: u64,
    pub udp_handles: u64,
}

/// Result of one correlation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedProcesses {
    /// Processes present in both the listing and the snapshot.
    pub merged: Vec<MergedProcessView>,
    /// Listing entries without telemetry (collector has not seen them yet).
    pub unmatched: Vec<ProcessEntry>,
}

/// Length of one collection record period, used to turn GC time into a
/// percentage.
const RECORD_PERIOD_MS: f64 = 60_000.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Merge a process listing with the latest snapshot.
///
/// Every listing entry is looked up by pid (both sides are numeric by the
/// time they get here). Duplicate pids in the listing are each looked up
/// independently. An empty listing, or an absent snapshot, produces the
/// corresponding empty/unmatched result rather than an error.
pub fn correlate(
    listing: &[ProcessEntry],
    snapshot: Option<&ProcessSnapshot>,
    now_ms: u64,
) -> CorrelatedProcesses {
    let mut result = CorrelatedProcesses::default();

    for entry in listing {
        let metrics = snapshot.and_then(|s| s.get(&entry.pid));
        match metrics {
            Some(metrics) => result.merged.push(MergedProcessView {
                pid: entry.pid,
                cmd: entry.command.clone(),
                start_time: now_ms.saturating_sub((metrics.uptime * 1000.0) as u64),
                cpu_usage: round2(metrics.cpu_60),
                heap_usage: round2(metrics.heap_used_percent),
                gc_usage: round2(metrics.gc_time_during_last_record / RECORD_PERIOD_MS * 100.0),
                rss: metrics.rss,
                uv_handles: metrics.active_handles,
                timers: metrics.active_timer_handles,
                tcp_handles: metrics.active_tcp_handles,
                udp_handles: metrics.active_udp_handles,
            }),
            None => result.unmatched.push(entry.clone()),
        }
    }

    result
}
