use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use linkdrop_admin_auth::identity::AdminIdentity;
use linkdrop_domain::coupon::{CouponSortBy, CouponSource, CouponStatus};
use linkdrop_domain::id::CouponId;
use linkdrop_domain::pagination::PageRequest;

use crate::domain::types::{Claimant, Coupon, CouponFilter};
use crate::error::CouponsServiceError;
use crate::state::AppState;
use crate::usecase::coupon::{
    CreateBulkCouponsInput, CreateBulkCouponsUseCase, CreateCouponInput, CreateCouponUseCase,
    DeleteCouponUseCase, ExtendCouponInput, ExtendCouponUseCase, ImportCouponsInput,
    ImportCouponsUseCase, ListCouponsUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimantResponse {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl From<Claimant> for ClaimantResponse {
    fn from(c: Claimant) -> Self {
        Self {
            ip: c.ip,
            user_agent: c.user_agent,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponResponse {
    pub id: CouponId,
    pub code: String,
    pub claim_link: String,
    pub name: String,
    pub status: CouponStatus,
    pub is_claimed: bool,
    #[serde(serialize_with = "linkdrop_core::serde::opt_to_rfc3339_ms")]
    pub claimed_at: Option<DateTime<Utc>>,
    pub claimed_by: Option<ClaimantResponse>,
    #[serde(serialize_with = "linkdrop_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "linkdrop_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    pub created_by: String,
    pub source: CouponSource,
}

impl CouponResponse {
    pub fn new(coupon: Coupon, now: DateTime<Utc>) -> Self {
        Self {
            status: coupon.status(now),
            id: coupon.id,
            code: coupon.code,
            claim_link: coupon.claim_link,
            name: coupon.name,
            is_claimed: coupon.is_claimed,
            claimed_at: coupon.claimed_at,
            claimed_by: coupon.claimed_by.map(ClaimantResponse::from),
            created_at: coupon.created_at,
            expires_at: coupon.expires_at,
            created_by: coupon.created_by,
            source: coupon.source,
        }
    }
}

pub(crate) fn coupon_responses(coupons: Vec<Coupon>) -> Vec<CouponResponse> {
    let now = Utc::now();
    coupons
        .into_iter()
        .map(|c| CouponResponse::new(c, now))
        .collect()
}

#[derive(Serialize)]
pub struct CouponBatchResponse {
    pub count: usize,
    pub coupons: Vec<CouponResponse>,
}

impl From<Vec<Coupon>> for CouponBatchResponse {
    fn from(coupons: Vec<Coupon>) -> Self {
        Self {
            count: coupons.len(),
            coupons: coupon_responses(coupons),
        }
    }
}

fn parse_coupon_id(raw: &str) -> Result<CouponId, CouponsServiceError> {
    raw.parse().map_err(|_| CouponsServiceError::InvalidCouponId)
}

// ── GET /coupons ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct CouponListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub status: Option<CouponStatus>,
    pub name: Option<String>,
    pub sort_by: Option<CouponSortBy>,
}

pub async fn list_coupons(
    _identity: AdminIdentity,
    State(state): State<AppState>,
    Query(query): Query<CouponListQuery>,
) -> Result<Json<Vec<CouponResponse>>, CouponsServiceError> {
    let filter = CouponFilter {
        status: query.status,
        name: query
            .name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty()),
    };
    let defaults = PageRequest::default();
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(defaults.per_page),
        page: query.page.unwrap_or(defaults.page),
    };
    let uc = ListCouponsUseCase {
        repo: state.coupon_repo(),
    };
    let coupons = uc
        .execute(filter, query.sort_by.unwrap_or_default(), page)
        .await?;
    Ok(Json(coupon_responses(coupons)))
}

// ── POST /coupons ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    #[serde(default)]
    pub claim_link: String,
    pub name: Option<String>,
    #[serde(default)]
    pub days_until_expiry: i64,
}

pub async fn create_coupon(
    identity: AdminIdentity,
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<CreateCouponRequest>, CouponsServiceError>,
) -> Result<impl IntoResponse, CouponsServiceError> {
    let uc = CreateCouponUseCase {
        repo: state.coupon_repo(),
    };
    let coupon = uc
        .execute(CreateCouponInput {
            claim_link: body.claim_link,
            name: body.name,
            days_until_expiry: body.days_until_expiry,
            created_by: identity.admin,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CouponResponse::new(coupon, Utc::now())),
    ))
}

// ── POST /coupons/bulk ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBulkCouponsRequest {
    #[serde(default)]
    pub links: Vec<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub days_until_expiry: i64,
}

pub async fn create_bulk_coupons(
    identity: AdminIdentity,
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<CreateBulkCouponsRequest>, CouponsServiceError>,
) -> Result<impl IntoResponse, CouponsServiceError> {
    let uc = CreateBulkCouponsUseCase {
        repo: state.coupon_repo(),
    };
    let coupons = uc
        .execute(CreateBulkCouponsInput {
            links: body.links,
            name: body.name,
            days_until_expiry: body.days_until_expiry,
            created_by: identity.admin,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(coupon_responses(coupons))))
}

// ── POST /coupons/import ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCouponsRequest {
    #[serde(default)]
    pub text: String,
    pub name: Option<String>,
    pub days_until_expiry: Option<i64>,
}

pub async fn import_coupons(
    identity: AdminIdentity,
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<ImportCouponsRequest>, CouponsServiceError>,
) -> Result<impl IntoResponse, CouponsServiceError> {
    let uc = ImportCouponsUseCase {
        repo: state.coupon_repo(),
    };
    let coupons = uc
        .execute(ImportCouponsInput {
            text: body.text,
            name: body.name,
            days_until_expiry: body.days_until_expiry,
            created_by: identity.admin,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CouponBatchResponse::from(coupons))))
}

// ── POST /coupons/extend ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendCouponRequest {
    #[serde(default)]
    pub coupon_id: String,
    #[serde(default)]
    pub days_to_add: i64,
}

pub async fn extend_coupon(
    _identity: AdminIdentity,
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<ExtendCouponRequest>, CouponsServiceError>,
) -> Result<Json<CouponResponse>, CouponsServiceError> {
    let coupon_id = parse_coupon_id(&body.coupon_id)?;
    let uc = ExtendCouponUseCase {
        repo: state.coupon_repo(),
    };
    let coupon = uc
        .execute(ExtendCouponInput {
            coupon_id,
            days_to_add: body.days_to_add,
        })
        .await?;
    Ok(Json(CouponResponse::new(coupon, Utc::now())))
}

// ── POST /coupons/delete ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCouponRequest {
    #[serde(default)]
    pub coupon_id: String,
}

pub async fn delete_coupon(
    _identity: AdminIdentity,
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<DeleteCouponRequest>, CouponsServiceError>,
) -> Result<StatusCode, CouponsServiceError> {
    let coupon_id = parse_coupon_id(&body.coupon_id)?;
    let uc = DeleteCouponUseCase {
        repo: state.coupon_repo(),
    };
    uc.execute(coupon_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
