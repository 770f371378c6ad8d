//! Admin session JWT issuing and validation.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Session lifetime in seconds (30 days). Also the cookie Max-Age.
pub const SESSION_TTL_SECS: u64 = 2_592_000;

/// Admin identity extracted from a validated session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub admin: String,
    pub expires_at: u64,
}

/// Errors returned by [`validate_session_token`] and [`issue_session_token`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("session expired")]
    Expired,
    #[error("malformed session token")]
    Malformed,
    #[error("failed to sign session token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload of an admin session.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | admin username |
/// | `exp` | `exp` | expiry, seconds since UNIX epoch |
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: u64,
}

/// Sign a session for `admin`, valid for [`SESSION_TTL_SECS`] from `now_secs`.
///
/// Returns the token and its expiry.
pub fn issue_session_token(
    admin: &str,
    secret: &str,
    now_secs: u64,
) -> Result<(String, u64), SessionError> {
    let exp = now_secs + SESSION_TTL_SECS;
    let claims = SessionClaims {
        sub: admin.to_owned(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(SessionError::Signing)?;
    Ok((token, exp))
}

/// Validate a session cookie value.
///
/// HS256, `exp` and `sub` required, default 60s leeway. An empty `sub` is malformed.
pub fn validate_session_token(token: &str, secret: &str) -> Result<AdminSession, SessionError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => SessionError::InvalidSignature,
        _ => SessionError::Malformed,
    })?;

    if data.claims.sub.is_empty() {
        return Err(SessionError::Malformed);
    }
    Ok(AdminSession {
        admin: data.claims.sub,
        expires_at: data.claims.exp,
    })
}
