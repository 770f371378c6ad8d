//! Mock admin sessions for router tests.
//!
//! Admin endpoints require a `linkdrop_session` cookie signed with the service's session
//! secret. `MockAdmin` signs one directly so tests do not need to call `POST /admin/session`.

use axum::http::HeaderValue;

use linkdrop_admin_auth::cookie::LINKDROP_SESSION;
use linkdrop_admin_auth::token::issue_session_token;

/// Admin identity to present in test requests.
pub struct MockAdmin {
    pub admin: String,
    pub secret: String,
}

impl MockAdmin {
    pub fn new(admin: &str, secret: &str) -> Self {
        Self {
            admin: admin.to_owned(),
            secret: secret.to_owned(),
        }
    }

    /// `Cookie` header value carrying a freshly signed session.
    pub fn cookie(&self) -> HeaderValue {
        let (token, _) = issue_session_token(&self.admin, &self.secret, crate::clock::now_secs())
            .expect("sign test session");
        HeaderValue::from_str(&format!("{LINKDROP_SESSION}={token}")).expect("cookie header")
    }
}
