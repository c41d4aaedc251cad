//! # nodepulse
//!
//! Backend engine for a Node.js application-performance console.
//!
//! Browser clients poll the console for process lists, live resource usage
//! and historical trends; the console also issues on-demand diagnostics
//! (CPU/heap/GC profiles, heap snapshots) to agents embedded in the
//! monitored processes. This crate is the engine behind those endpoints:
//! command dispatch with a bounded wait, correlation of the live process
//! listing with periodic telemetry, and status/trend derivation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        API surface                           │
//! │  ┌─────────┐      ┌─────────────────────┐    ┌───────────┐  │
//! │  │   ops   │─────▶│       channel       │───▶│   agent   │  │
//! │  │         │      │ (dispatcher, bound) │    │ (remote)  │  │
//! │  └────┬────┘      └─────────────────────┘    └───────────┘  │
//! │       │                                                     │
//! │       ├──────────▶┌─────────┐                               │
//! │       │           │  store  │◀── telemetry, clients, risks  │
//! │       │           └─────────┘                               │
//! │       └──────────▶┌─────────┐                               │
//! │                   │  data   │  correlate · status · trend   │
//! │                   └─────────┘                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`channel`]**: the command seam — the closed [`AgentCommand`] set,
//!   the [`CommandChannel`] transport trait, and the [`Dispatcher`] that
//!   folds timeouts and transport failures into the explicit
//!   [`Dispatch::AlreadyHandled`] outcome
//! - **[`store`]**: trait seams for the collaborators the engine reads but
//!   does not own (telemetry snapshots, connected clients, alarm
//!   strategies/history, diagnostic-file ledger, scan results)
//! - **[`data`]**: pure processing — pid correlation into
//!   [`MergedProcessView`]s, threshold status classification, trend series
//! - **[`ops`]**: the operations the HTTP layer calls, one per endpoint
//!
//! ## Correlating a listing with telemetry
//!
//! ```
//! use nodepulse::{correlate, parse_process_listing, ProcessSnapshot};
//!
//! let listing = parse_process_listing("1234\u{0}node app.js\n");
//! let snapshot = ProcessSnapshot::new(); // collector has no data yet
//!
//! let result = correlate(&listing, Some(&snapshot), 1_700_000_000_000);
//! assert!(result.merged.is_empty());
//! assert_eq!(result.unmatched.len(), 1); // still surfaced, never dropped
//! ```
//!
//! ## Dispatching a command
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use nodepulse::{AgentCommand, AgentRef, Dispatch, Dispatcher, FileChannel};
//!
//! # tokio_test::block_on(async {
//! let channel = Arc::new(FileChannel::new("listing.txt"));
//! let dispatcher = Dispatcher::new(channel, Duration::from_secs(15));
//!
//! let agent = AgentRef::new("my-app", "agent-1");
//! match dispatcher.dispatch(&agent, AgentCommand::ListNodeProcesses).await {
//!     Dispatch::Completed(payload) => println!("{payload}"),
//!     Dispatch::AlreadyHandled => {} // failure already surfaced; stop here
//! }
//! # });
//! ```

pub mod channel;
pub mod config;
pub mod data;
pub mod error;
pub mod ops;
pub mod store;

// Re-export main types for convenience
pub use channel::{
    parse_process_listing, AgentCommand, CommandChannel, Dispatch, Dispatcher, FileChannel,
    ProcessEntry,
};
pub use config::Config;
pub use data::{
    correlate, format_size, process_agent_metric, system_agent_metric, trend, AgentMetric,
    CorrelatedProcesses, MergedProcessView, MetricKind, MetricScope, StatusLevel, Thresholds,
    TrendPoint, TrendSeries,
};
pub use error::{Error, Result};
pub use ops::{OverviewMetrics, OverviewOps, ProcessOps};
pub use store::{
    AgentClient, AgentRef, AlarmStore, ClientRegistry, FileRecordStore, FileStore,
    ProcessMetrics, ProcessSnapshot, RiskFile, RiskReport, RiskStore, Strategy, StrategyStore,
    SystemMetrics, TelemetryStore, TimedSnapshot, Vulnerabilities,
};
