//! Session cookie builders.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::token::SESSION_TTL_SECS;

/// Cookie name for the admin session token.
pub const LINKDROP_SESSION: &str = "linkdrop_session";

fn session_cookie(value: String, domain: &str, max_age: Duration) -> Cookie<'static> {
    let mut builder = Cookie::build((LINKDROP_SESSION, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax);
    // Host-only cookie when no domain is configured (local runs).
    if !domain.is_empty() {
        builder = builder.domain(domain.to_owned());
    }
    builder.build()
}

/// Set the session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use linkdrop_admin_auth::cookie::{set_session_cookie, LINKDROP_SESSION};
///
/// let jar = set_session_cookie(CookieJar::new(), "token".to_string(), "example.com");
/// let cookie = jar.get(LINKDROP_SESSION).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(2_592_000)));
/// assert!(cookie.http_only().unwrap_or(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, value: String, domain: &str) -> CookieJar {
    jar.add(session_cookie(
        value,
        domain,
        Duration::seconds(SESSION_TTL_SECS as i64),
    ))
}

/// Clear the session cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use linkdrop_admin_auth::cookie::{clear_session_cookie, set_session_cookie, LINKDROP_SESSION};
///
/// let jar = set_session_cookie(CookieJar::new(), "token".to_string(), "");
/// let jar = clear_session_cookie(jar, "");
/// let cookie = jar.get(LINKDROP_SESSION).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// assert_eq!(cookie.domain(), None);
/// ```
pub fn clear_session_cookie(jar: CookieJar, domain: &str) -> CookieJar {
    jar.add(session_cookie(String::new(), domain, Duration::ZERO))
}
