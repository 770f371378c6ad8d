use axum::extract::State;
use axum::http::StatusCode;

use linkdrop_core::health::readiness;

use crate::state::AppState;

/// Handler for `GET /readyz`: 200 once the database answers a ping.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    let probe = state.db.ping().await;
    if let Err(ref e) = probe {
        tracing::warn!(error = %e, "readiness probe failed");
    }
    readiness(probe)
}
