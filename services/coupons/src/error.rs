use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Coupons service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum CouponsServiceError {
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error("claim link is required")]
    MissingClaimLink,
    #[error("links are required")]
    MissingLinks,
    #[error("coupon code is required")]
    MissingCode,
    #[error("days until expiry must be between 1 and 3650")]
    InvalidExpiryDays,
    #[error("count must be between 1 and 1000")]
    InvalidCount,
    #[error("invalid coupon id")]
    InvalidCouponId,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("coupon not found")]
    CouponNotFound,
    #[error("coupon has already been claimed")]
    AlreadyClaimed,
    #[error("coupon has expired")]
    Expired,
    #[error("not enough unused links available")]
    InsufficientSupply { available: u64, requested: u64 },
    #[error("coupon code already exists")]
    DuplicateCode,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl CouponsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::MissingClaimLink => "MISSING_CLAIM_LINK",
            Self::MissingLinks => "MISSING_LINKS",
            Self::MissingCode => "MISSING_CODE",
            Self::InvalidExpiryDays => "INVALID_EXPIRY_DAYS",
            Self::InvalidCount => "INVALID_COUNT",
            Self::InvalidCouponId => "INVALID_COUPON_ID",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::CouponNotFound => "COUPON_NOT_FOUND",
            Self::AlreadyClaimed => "ALREADY_CLAIMED",
            Self::Expired => "EXPIRED",
            Self::InsufficientSupply { .. } => "INSUFFICIENT_SUPPLY",
            Self::DuplicateCode => "DUPLICATE_CODE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_)
            | Self::MissingClaimLink
            | Self::MissingLinks
            | Self::MissingCode
            | Self::InvalidExpiryDays
            | Self::InvalidCount
            | Self::InvalidCouponId
            | Self::AlreadyClaimed
            | Self::Expired
            | Self::InsufficientSupply { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::CouponNotFound => StatusCode::NOT_FOUND,
            Self::DuplicateCode => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CouponsServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx show up in the trace layer's response log.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let message = self.to_string();
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "error": message,
            "message": message,
        });
        if let Self::InsufficientSupply {
            available,
            requested,
        } = self
        {
            body["available"] = available.into();
            body["requested"] = requested.into();
        }
        (status, axum::Json(body)).into_response()
    }
}

impl From<JsonRejection> for CouponsServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}
