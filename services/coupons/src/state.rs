use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use linkdrop_admin_auth::credentials::AdminCredentials;
use linkdrop_admin_auth::identity::SessionKey;

use crate::infra::db::{DbCouponRepository, DbStoredLinkRepository};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub session_key: SessionKey,
    pub admin: AdminCredentials,
    pub cookie_domain: String,
}

impl AppState {
    pub fn coupon_repo(&self) -> DbCouponRepository {
        DbCouponRepository {
            db: self.db.clone(),
        }
    }

    pub fn stored_link_repo(&self) -> DbStoredLinkRepository {
        DbStoredLinkRepository {
            db: self.db.clone(),
        }
    }
}

impl FromRef<AppState> for SessionKey {
    fn from_ref(state: &AppState) -> Self {
        state.session_key.clone()
    }
}
