//! Session-cookie identity extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use http::StatusCode;
use http::request::Parts;

use crate::cookie::LINKDROP_SESSION;
use crate::token::{SessionError, validate_session_token};

/// HMAC secret used to sign and verify session tokens.
///
/// Services expose it from their state with `FromRef` so the extractor can reach it.
#[derive(Clone)]
pub struct SessionKey(pub Arc<str>);

impl SessionKey {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }
}

/// The authenticated admin. Extracting it is the gate for every mutation endpoint.
///
/// Rejects with 401 if the session cookie is absent, forged or expired.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub admin: String,
    pub expires_at: u64,
}

/// Why a request was refused by the session gate.
#[derive(Debug, thiserror::Error)]
pub enum SessionRejection {
    #[error("missing session cookie")]
    Missing,
    #[error("invalid session: {0}")]
    Invalid(#[from] SessionError),
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        tracing::debug!(reason = %self, "session rejected");
        let body = serde_json::json!({
            "kind": "UNAUTHORIZED",
            "error": "unauthorized",
            "message": "unauthorized",
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for AdminIdentity
where
    SessionKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let key = SessionKey::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let result = match jar.get(LINKDROP_SESSION) {
            Some(cookie) if !cookie.value().is_empty() => {
                validate_session_token(cookie.value(), &key.0)
                    .map(|session| Self {
                        admin: session.admin,
                        expires_at: session.expires_at,
                    })
                    .map_err(SessionRejection::from)
            }
            _ => Err(SessionRejection::Missing),
        };

        async move { result }
    }
}
