//! Load-test endpoint: drives the in-process decision path at a target rate.

use actix_web::{web, HttpResponse};

use crate::core::loadtest::{run_load_test, LoadTestRequest};
use crate::server::state::AppState;
use crate::utils::error::{RateGateError, Result};

/// Configure the load-test route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/load-test", web::post().to(load_test));
}

/// Run a load test against the gateway and report totals.
///
/// The run blocks this request for its whole duration; keep durations short.
async fn load_test(
    state: web::Data<AppState>,
    body: web::Json<LoadTestRequest>,
) -> Result<HttpResponse> {
    if body.requests_per_second == 0 {
        return Err(RateGateError::Validation(
            "requests_per_second must be positive".to_string(),
        ));
    }
    if body.duration_seconds == 0 {
        return Err(RateGateError::Validation(
            "duration_seconds must be positive".to_string(),
        ));
    }

    let report = run_load_test(&state.gateway, &body).await?;
    Ok(HttpResponse::Ok().json(report))
}
