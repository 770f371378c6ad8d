use axum::{Json, extract::State};
use serde::Serialize;

use linkdrop_admin_auth::identity::AdminIdentity;

use crate::error::CouponsServiceError;
use crate::state::AppState;
use crate::usecase::report::{Analytics, AnalyticsUseCase};

#[derive(Serialize)]
pub struct LinkTotals {
    pub total: u64,
    pub available: u64,
    pub used: u64,
}

#[derive(Serialize)]
pub struct CouponTotals {
    pub total: u64,
    pub claimed: u64,
    pub active: u64,
    pub expired: u64,
}

#[derive(Serialize)]
pub struct RecentActivity {
    pub imports: u64,
    pub generated: u64,
    pub claims: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub links: LinkTotals,
    pub coupons: CouponTotals,
    pub recent_activity: RecentActivity,
}

impl From<Analytics> for AnalyticsResponse {
    fn from(a: Analytics) -> Self {
        Self {
            links: LinkTotals {
                total: a.links.total,
                available: a.links.available,
                used: a.links.total.saturating_sub(a.links.available),
            },
            coupons: CouponTotals {
                total: a.coupons.total,
                claimed: a.coupons.claimed,
                active: a.coupons.active,
                expired: a.coupons.expired,
            },
            recent_activity: RecentActivity {
                imports: a.recent_imports,
                generated: a.coupons.generated_since,
                claims: a.coupons.claimed_since,
            },
        }
    }
}

// ── GET /analytics/stats ─────────────────────────────────────────────────────

pub async fn get_analytics(
    identity: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>, CouponsServiceError> {
    let uc = AnalyticsUseCase {
        coupons: state.coupon_repo(),
        links: state.stored_link_repo(),
    };
    let analytics = uc.execute(&identity.admin).await?;
    Ok(Json(analytics.into()))
}
