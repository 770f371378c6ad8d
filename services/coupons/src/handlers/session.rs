use anyhow::Context;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::{CookieJar, WithRejection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use linkdrop_admin_auth::cookie::{clear_session_cookie, set_session_cookie};
use linkdrop_admin_auth::identity::AdminIdentity;
use linkdrop_admin_auth::token::issue_session_token;
use linkdrop_core::serde::to_rfc3339_ms;

use crate::error::CouponsServiceError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub admin: String,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
}

impl SessionResponse {
    fn new(admin: String, expires_at: u64) -> Result<Self, CouponsServiceError> {
        let expires_at = i64::try_from(expires_at)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .context("session expiry out of range")?;
        Ok(Self { admin, expires_at })
    }
}

// ── POST /admin/session ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, CouponsServiceError>,
) -> Result<impl IntoResponse, CouponsServiceError> {
    if !state.admin.verify(&body.username, &body.password) {
        tracing::warn!(username = %body.username, "admin login rejected");
        return Err(CouponsServiceError::InvalidCredentials);
    }

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(anyhow::Error::new)?
        .as_secs();
    let (token, expires_at) = issue_session_token(state.admin.username(), &state.session_key.0, now)
        .map_err(anyhow::Error::new)?;
    let jar = set_session_cookie(jar, token, &state.cookie_domain);

    tracing::info!(admin = state.admin.username(), "admin session started");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(SessionResponse::new(
            state.admin.username().to_owned(),
            expires_at,
        )?),
    ))
}

// ── GET /admin/session ───────────────────────────────────────────────────────

pub async fn get_session(
    identity: AdminIdentity,
) -> Result<Json<SessionResponse>, CouponsServiceError> {
    Ok(Json(SessionResponse::new(
        identity.admin,
        identity.expires_at,
    )?))
}

// ── DELETE /admin/session ────────────────────────────────────────────────────

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        clear_session_cookie(jar, &state.cookie_domain),
    )
}
