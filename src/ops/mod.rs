//! Operation layer: what the API surface calls into.
//!
//! [`ProcessOps`] covers the process page (listings, merged view, profiler
//! status, trends, diagnostic actions); [`OverviewOps`] covers the overview
//! page (headline counters, per-agent metric rows). Both hold their
//! collaborators behind `Arc<dyn ..>` seams and keep no state across calls,
//! mirroring the request model: each operation is a pure function of its
//! inputs and the stores.

mod overview;
mod process;

pub use overview::{OverviewMetrics, OverviewOps};
pub use process::ProcessOps;
