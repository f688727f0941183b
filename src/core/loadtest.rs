//! Synchronous load driver: issues decisions at a target rate against the
//! in-process gateway and reports totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

use super::gateway::DecisionGateway;
use crate::utils::error::Result;

fn default_endpoint() -> String {
    "/api/protected/test".to_string()
}

/// Load-test parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadTestRequest {
    /// Key to drive decisions for
    pub api_key: String,
    /// Target request rate
    pub requests_per_second: u32,
    /// How long to run
    pub duration_seconds: u32,
    /// Endpoint recorded on each decision
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

/// Totals reported after a load-test run.
#[derive(Debug, Clone, Serialize)]
pub struct LoadTestReport {
    /// Decisions issued
    pub total_requests: u64,
    /// Admitted
    pub allowed: u64,
    /// Rejected
    pub blocked: u64,
    /// Percentage admitted, two decimal places
    pub success_rate: f64,
    /// Measured wall-clock run time in seconds
    pub actual_duration: f64,
    /// Echoed target rate
    pub requests_per_second: u32,
    /// Echoed target duration
    pub duration_seconds: u32,
    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,
    /// Wall-clock end of the run
    pub finished_at: DateTime<Utc>,
}

/// Drive the gateway at `requests_per_second` for `duration_seconds`.
///
/// A single loop spaces submissions by `1 / rps`; decisions go through the
/// ordinary gateway path and honor its per-key synchronization. The run ends
/// after `rps * duration` submissions or once the measured duration exceeds
/// the target, whichever comes first.
pub async fn run_load_test(
    gateway: &DecisionGateway,
    request: &LoadTestRequest,
) -> Result<LoadTestReport> {
    let planned = request.requests_per_second as u64 * request.duration_seconds as u64;
    let delay = Duration::from_secs_f64(1.0 / request.requests_per_second as f64);

    info!(
        api_key = %request.api_key,
        rps = request.requests_per_second,
        duration = request.duration_seconds,
        planned,
        "Starting load test"
    );

    let started_at = Utc::now();
    let start = Instant::now();
    let mut issued = 0u64;
    let mut allowed = 0u64;
    let mut blocked = 0u64;

    for _ in 0..planned {
        let decision = gateway.decide(&request.api_key, &request.endpoint).await?;
        issued += 1;
        if decision.allowed {
            allowed += 1;
        } else {
            blocked += 1;
        }

        tokio::time::sleep(delay).await;

        if start.elapsed().as_secs_f64() > request.duration_seconds as f64 {
            break;
        }
    }

    let actual_duration = start.elapsed().as_secs_f64();
    let success_rate = if issued > 0 {
        (allowed as f64 / issued as f64 * 10_000.0).round() / 100.0
    } else {
        0.0
    };

    info!(issued, allowed, blocked, actual_duration, "Load test finished");

    Ok(LoadTestReport {
        total_requests: issued,
        allowed,
        blocked,
        success_rate,
        actual_duration,
        requests_per_second: request.requests_per_second,
        duration_seconds: request.duration_seconds,
        started_at,
        finished_at: Utc::now(),
    })
}
