//! Trend series for historical views.
//!
//! A trend reduces a range of raw snapshots to one metric using the same
//! extraction rules as the current-status path; no resampling happens here
//! beyond what the snapshot store already performed.

use serde::{Deserialize, Serialize};

use super::status::MetricKind;
use crate::store::TimedSnapshot;

/// One sample of a metric over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Collection time, Unix milliseconds.
    pub timestamp: u64,
    pub value: f64,
}

/// Time-ordered series of one metric's values.
pub type TrendSeries = Vec<TrendPoint>;

/// Reduce ordered snapshots to the requested metric.
///
/// One point per input snapshot that carries the metric; snapshots missing
/// the requested pid (or the system record) contribute nothing. Empty input
/// is an empty series, not an error.
pub fn trend(snapshots: &[TimedSnapshot], kind: MetricKind, pid: Option<u32>) -> TrendSeries {
    snapshots
        .iter()
        .filter_map(|snapshot| {
            kind.extract(snapshot, pid).map(|value| TrendPoint {
                timestamp: snapshot.timestamp,
                value,
            })
        })
        .collect()
}
