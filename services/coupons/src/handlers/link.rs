use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use linkdrop_admin_auth::identity::AdminIdentity;

use crate::domain::types::LinkStats;
use crate::error::CouponsServiceError;
use crate::handlers::coupon::CouponBatchResponse;
use crate::state::AppState;
use crate::usecase::link_pool::{
    GenerateFromPoolInput, GenerateFromPoolUseCase, ImportLinksInput, ImportLinksUseCase,
    LinkStatsUseCase,
};

#[derive(Serialize)]
pub struct LinkStatsResponse {
    pub total: u64,
    pub available: u64,
}

impl From<LinkStats> for LinkStatsResponse {
    fn from(stats: LinkStats) -> Self {
        Self {
            total: stats.total,
            available: stats.available,
        }
    }
}

// ── POST /links/import ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ImportLinksRequest {
    #[serde(default)]
    pub links: Vec<String>,
}

#[derive(Serialize)]
pub struct ImportLinksResponse {
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<LinkStatsResponse>,
}

pub async fn import_links(
    identity: AdminIdentity,
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<ImportLinksRequest>, CouponsServiceError>,
) -> Result<impl IntoResponse, CouponsServiceError> {
    let uc = ImportLinksUseCase {
        links: state.stored_link_repo(),
    };
    let output = uc
        .execute(ImportLinksInput {
            links: body.links,
            owner: identity.admin,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ImportLinksResponse {
            count: output.count,
            stats: output.stats.map(LinkStatsResponse::from),
        }),
    ))
}

// ── GET /links/stats ─────────────────────────────────────────────────────────

pub async fn get_link_stats(
    identity: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<LinkStatsResponse>, CouponsServiceError> {
    let uc = LinkStatsUseCase {
        links: state.stored_link_repo(),
    };
    let stats = uc.execute(&identity.admin).await?;
    Ok(Json(stats.into()))
}

// ── POST /links/generate-coupons ─────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCouponsRequest {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub days_until_expiry: i64,
    pub seller_name: Option<String>,
}

pub async fn generate_coupons(
    identity: AdminIdentity,
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<GenerateCouponsRequest>, CouponsServiceError>,
) -> Result<impl IntoResponse, CouponsServiceError> {
    let uc = GenerateFromPoolUseCase {
        coupons: state.coupon_repo(),
        links: state.stored_link_repo(),
    };
    let coupons = uc
        .execute(GenerateFromPoolInput {
            count: body.count,
            days_until_expiry: body.days_until_expiry,
            seller_name: body.seller_name,
            owner: identity.admin,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CouponBatchResponse::from(coupons))))
}
