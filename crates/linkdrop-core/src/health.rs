use axum::http::StatusCode;

/// Handler for `GET /healthz` — liveness check.
///
/// Readiness depends on each service's backing store, so `GET /readyz` lives with the service.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Map a readiness probe outcome to the status code returned by `GET /readyz`.
pub fn readiness<E>(probe: Result<(), E>) -> StatusCode {
    match probe {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
