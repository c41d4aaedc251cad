//! Data processing: correlation, status classification, and trend
//! derivation.
//!
//! Everything in this module is a pure function of its inputs; no state
//! crosses requests, so the core logic needs no locking.

pub mod bytes;
pub mod correlate;
pub mod status;
pub mod trend;

pub use bytes::format_size;
pub use correlate::{correlate, CorrelatedProcesses, MergedProcessView};
pub use status::{
    process_agent_metric, system_agent_metric, AgentMetric, MetricKind, MetricScope, StatusLevel,
    Thresholds,
};
pub use trend::{trend, TrendPoint, TrendSeries};
