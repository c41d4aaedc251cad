//! Application overview: instance/alarm/risk counters and per-agent metric
//! rows.
//!
//! Both operations fan out over many downstream reads. The fan-out is
//! bounded (`Config::fanout_concurrency`, default 2) so a large deployment
//! does not overwhelm the stores, and results keep the input order
//! regardless of completion order.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::error;

use crate::config::Config;
use crate::data::{
    process_agent_metric, system_agent_metric, AgentMetric, MetricKind, MetricScope,
};
use crate::error::Result;
use crate::store::{AgentRef, AlarmStore, ClientRegistry, RiskStore, StrategyStore, TelemetryStore};

/// Window for the overview alarm counter.
const ALARM_PERIOD_MINS: u64 = 24 * 60;

/// Headline counters for one application.
///
/// `None` counts mean "nothing to count yet" (no connected instance, or no
/// scored scan results) and render as a placeholder, not as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewMetrics {
    pub instance_count: usize,
    pub alarm_count: Option<u64>,
    pub risk_count: Option<u64>,
}

/// Overview operations for one console deployment.
pub struct OverviewOps {
    config: Config,
    telemetry: Arc<dyn TelemetryStore>,
    clients: Arc<dyn ClientRegistry>,
    strategies: Arc<dyn StrategyStore>,
    alarms: Arc<dyn AlarmStore>,
    risks: Arc<dyn RiskStore>,
}

impl OverviewOps {
    pub fn new(
        config: Config,
        telemetry: Arc<dyn TelemetryStore>,
        clients: Arc<dyn ClientRegistry>,
        strategies: Arc<dyn StrategyStore>,
        alarms: Arc<dyn AlarmStore>,
        risks: Arc<dyn RiskStore>,
    ) -> Self {
        Self {
            config,
            telemetry,
            clients,
            strategies,
            alarms,
            risks,
        }
    }

    /// Instance, alarm and risk counters for the overview page.
    ///
    /// The client list and the strategy list have no data dependency and
    /// are fetched concurrently; either failure fails the operation.
    pub async fn overview_metrics(&self, app_id: &str) -> Result<OverviewMetrics> {
        let (clients, strategies) = tokio::try_join!(
            self.clients.clients(app_id),
            self.strategies.strategies(app_id),
        )?;

        let instance_count = clients.len();
        if instance_count == 0 {
            return Ok(OverviewMetrics {
                instance_count,
                alarm_count: None,
                risk_count: None,
            });
        }

        let counts: Vec<u64> = stream::iter(
            strategies
                .iter()
                .map(|s| self.alarms.history_count(s.id, ALARM_PERIOD_MINS)),
        )
        .buffered(self.config.fanout_concurrency)
        .try_collect()
        .await?;
        let alarm_count = Some(counts.iter().sum());

        // Scan results live per agent; any connected instance will do.
        let agent = AgentRef::new(app_id, clients[0].agent_id.clone());
        let files = self.risks.files(&agent, "package", true).await?;
        let risk_count = files.and_then(|files| {
            if files.iter().all(|f| f.risk.is_none()) {
                return None;
            }
            Some(
                files
                    .iter()
                    .filter_map(|f| f.risk.as_ref())
                    .map(|r| r.vulnerabilities.high + r.vulnerabilities.critical)
                    .sum(),
            )
        });

        Ok(OverviewMetrics {
            instance_count,
            alarm_count,
            risk_count,
        })
    }

    /// One status row per connected agent for the requested metric type.
    ///
    /// A per-agent telemetry failure degrades that row to the placeholder
    /// instead of failing the whole listing; rows come back in client order.
    pub async fn main_metrics(&self, app_id: &str, kind: MetricKind) -> Result<Vec<AgentMetric>> {
        let clients = self.clients.clients(app_id).await?;
        let thresholds = &self.config.thresholds;

        let rows = stream::iter(clients.into_iter().map(|client| {
            let agent = AgentRef::new(app_id, client.agent_id.clone());
            let telemetry = &self.telemetry;
            async move {
                match kind.scope() {
                    MetricScope::Process => match telemetry.latest_process(&agent).await {
                        Ok(snapshot) => process_agent_metric(
                            &client.agent_id,
                            kind,
                            snapshot.as_ref(),
                            thresholds,
                        ),
                        Err(err) => {
                            error!(agent = %agent, %err, "failed to fetch process data");
                            AgentMetric::placeholder(&client.agent_id)
                        }
                    },
                    MetricScope::System => match telemetry.latest_system(&agent).await {
                        Ok(system) => system_agent_metric(
                            &client.agent_id,
                            kind,
                            system.as_ref(),
                            thresholds,
                        ),
                        Err(err) => {
                            error!(agent = %agent, %err, "failed to fetch system data");
                            AgentMetric::placeholder(&client.agent_id)
                        }
                    },
                }
            }
        }))
        .buffered(self.config.fanout_concurrency)
        .collect()
        .await;

        Ok(rows)
    }
}
