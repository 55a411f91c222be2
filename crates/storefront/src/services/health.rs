//! Backend reachability.

use tracing::debug;

use sabor_core::ApiStatus;

use crate::api::ApiClient;

/// Probe `GET /health`: any success is online, anything else offline.
pub async fn check(api: &ApiClient) -> ApiStatus {
    match api.health().await {
        Ok(health) => {
            debug!(status = %health.status, "Backend is up");
            ApiStatus::Online
        }
        Err(e) => {
            debug!(error = %e, "Backend health check failed");
            ApiStatus::Offline
        }
    }
}
