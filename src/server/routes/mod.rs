//! HTTP route handlers, grouped by resource.
//!
//! Everything mounts under the `/api` scope; see each module's `configure`.

pub mod analytics;
pub mod configs;
pub mod keys;
pub mod loadtest;
pub mod protected;
pub mod system;

use actix_web::web;

/// Mount all API routes onto the `/api` scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(system::configure)
            .configure(keys::configure)
            .configure(configs::configure)
            .configure(protected::configure)
            .configure(analytics::configure)
            .configure(loadtest::configure),
    );
}
