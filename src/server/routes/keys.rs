//! API-key administration endpoints.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::core::models::ApiKeyRecord;
use crate::server::state::AppState;
use crate::utils::error::{RateGateError, Result};

/// Configure API-key routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api-keys")
            .route(web::post().to(create_api_key))
            .route(web::get().to(list_api_keys)),
    );
}

/// API-key creation request
#[derive(Debug, Deserialize)]
struct CreateApiKeyRequest {
    name: String,
}

/// Create a new API key with a freshly generated token.
async fn create_api_key(
    state: web::Data<AppState>,
    body: web::Json<CreateApiKeyRequest>,
) -> Result<HttpResponse> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(RateGateError::Validation("name must not be empty".to_string()));
    }

    let record = ApiKeyRecord::new(name);
    state.storage.put_api_key(&record).await?;

    info!(id = %record.id, name = %record.name, "API key created");
    Ok(HttpResponse::Ok().json(record))
}

/// List all API keys, oldest first.
async fn list_api_keys(state: web::Data<AppState>) -> Result<HttpResponse> {
    let records = state.storage.list_api_keys().await?;
    Ok(HttpResponse::Ok().json(records))
}
