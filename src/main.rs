use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nodepulse::{
    process_agent_metric, system_agent_metric, AgentRef, Config, FileChannel, FileRecordStore,
    FileStore, MetricKind, ProcessOps, TelemetryStore,
};

#[derive(Parser, Debug)]
#[command(name = "nodepulse")]
#[command(about = "Offline inspector for Node.js process telemetry")]
struct Args {
    /// Telemetry JSON file: {"process": {..}, "system": {..}, "history": [..]}
    #[arg(short, long)]
    telemetry: PathBuf,

    /// Process listing file (`pid NUL command` rows, as on the wire)
    #[arg(short, long)]
    listing: PathBuf,

    /// Application id
    #[arg(long, default_value = "local")]
    app: String,

    /// Agent id
    #[arg(long, default_value = "local")]
    agent: String,

    /// Config file layered over the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Warning threshold override (percent)
    #[arg(long)]
    warn: Option<f64>,

    /// Critical threshold override (percent)
    #[arg(long)]
    crit: Option<f64>,

    /// Also derive a trend for this metric type (e.g. "processCpuUsage")
    #[arg(long)]
    trend: Option<String>,

    /// Pid the trend applies to (required for process-scoped metric types)
    #[arg(long)]
    pid: Option<u32>,

    /// Trend window in minutes
    #[arg(long, default_value = "30")]
    duration: u64,

    /// Export the report as JSON to this file instead of printing it
    #[arg(short, long)]
    export: Option<PathBuf>,
}

/// Stand-in ledger for offline runs; diagnostic actions are refused by the
/// file channel before anything would be recorded.
struct OfflineLedger;

#[async_trait]
impl FileRecordStore for OfflineLedger {
    async fn record(
        &self,
        agent: &AgentRef,
        action: &str,
        file_path: &str,
        _user_id: u64,
    ) -> nodepulse::Result<()> {
        info!(agent = %agent, action, file = file_path, "artifact produced (offline, not recorded)");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(warning) = args.warn {
        config.thresholds.warning = warning;
    }
    if let Some(critical) = args.crit {
        config.thresholds.critical = critical;
    }
    let thresholds = config.thresholds;

    let telemetry = Arc::new(
        FileStore::load(&args.telemetry)
            .with_context(|| format!("loading telemetry from {}", args.telemetry.display()))?,
    );
    let ops = ProcessOps::new(
        config,
        Arc::new(FileChannel::new(&args.listing)),
        telemetry.clone(),
        Arc::new(OfflineLedger),
    );
    let agent = AgentRef::new(&args.app, &args.agent);

    let Some(correlated) = ops.merged_processes(&agent).await?.completed() else {
        anyhow::bail!("process listing unavailable: {}", args.listing.display());
    };

    // Status rows for the four agent-level metric types that apply offline
    let process_snapshot = telemetry.latest_process(&agent).await?;
    let system = telemetry.latest_system(&agent).await?;
    let statuses = vec![
        process_agent_metric(
            &args.agent,
            MetricKind::ProcessCpu,
            process_snapshot.as_ref(),
            &thresholds,
        ),
        process_agent_metric(
            &args.agent,
            MetricKind::ProcessMemory,
            process_snapshot.as_ref(),
            &thresholds,
        ),
        system_agent_metric(&args.agent, MetricKind::SystemCpu, system.as_ref(), &thresholds),
        system_agent_metric(
            &args.agent,
            MetricKind::SystemMemory,
            system.as_ref(),
            &thresholds,
        ),
        system_agent_metric(&args.agent, MetricKind::Disk, system.as_ref(), &thresholds),
    ];

    let series = match &args.trend {
        Some(name) => {
            let kind = MetricKind::parse(name)?;
            Some(
                ops.process_trend(&agent, args.pid, kind, args.duration)
                    .await?,
            )
        }
        None => None,
    };

    if let Some(export_path) = &args.export {
        let report = serde_json::json!({
            "agent": { "app_id": args.app, "agent_id": args.agent },
            "processes": correlated,
            "statuses": statuses,
            "trend": series,
        });
        std::fs::write(export_path, serde_json::to_string_pretty(&report)?)?;
        println!("Exported report to: {}", export_path.display());
        return Ok(());
    }

    println!("Processes ({} merged, {} without telemetry):", correlated.merged.len(), correlated.unmatched.len());
    for view in &correlated.merged {
        println!(
            "  {:>7}  cpu {:>6.2}%  heap {:>6.2}%  gc {:>5.2}%  rss {:>12}  {}",
            view.pid,
            view.cpu_usage,
            view.heap_usage,
            view.gc_usage,
            view.rss,
            view.cmd
        );
    }
    for entry in &correlated.unmatched {
        println!("  {:>7}  (no telemetry yet)  {}", entry.pid, entry.command);
    }

    println!("\nStatus:");
    let labels = [
        "process cpu",
        "process memory",
        "system cpu",
        "system memory",
        "disk",
    ];
    for (label, row) in labels.iter().zip(&statuses) {
        let pid = row
            .pid
            .map(|p| format!(" (pid {p})"))
            .unwrap_or_default();
        println!("  {:<15} {:?}: {}{}", label, row.status, row.title, pid);
    }

    if let Some(series) = series {
        println!("\nTrend ({} points):", series.len());
        for point in series {
            println!("  {}  {:.2}", point.timestamp, point.value);
        }
    }

    Ok(())
}
