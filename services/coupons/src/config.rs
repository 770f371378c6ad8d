/// Coupons service configuration loaded from environment variables.
pub struct CouponsConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3120). Env var: `COUPONS_PORT`.
    pub coupons_port: u16,
    /// HMAC secret for admin session tokens. Env var: `SESSION_SECRET`.
    pub session_secret: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Domain attribute for the session cookie; empty for a host-only cookie.
    pub cookie_domain: String,
}

impl std::fmt::Debug for CouponsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouponsConfig")
            .field("coupons_port", &self.coupons_port)
            .field("admin_username", &self.admin_username)
            .field("cookie_domain", &self.cookie_domain)
            .finish_non_exhaustive()
    }
}

impl CouponsConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            coupons_port: std::env::var("COUPONS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3120),
            session_secret: std::env::var("SESSION_SECRET").expect("SESSION_SECRET"),
            admin_username: std::env::var("ADMIN_USERNAME").expect("ADMIN_USERNAME"),
            admin_password: std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD"),
            cookie_domain: std::env::var("COOKIE_DOMAIN").unwrap_or_default(),
        }
    }
}
