use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{header::USER_AGENT, request::Parts},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::domain::types::Claimant;
use crate::error::CouponsServiceError;
use crate::state::AppState;
use crate::usecase::claim::{ClaimCouponInput, ClaimCouponUseCase};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Requester metadata recorded on a claim. Taken verbatim, never validated.
///
/// `ip` is `x-forwarded-for` when present, else the socket peer address.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta(pub Claimant);

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        let ip = header(X_FORWARDED_FOR).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });
        let user_agent = header(USER_AGENT.as_str());

        async move { Ok(Self(Claimant { ip, user_agent })) }
    }
}

// ── POST /redeem, POST /coupons/claim ────────────────────────────────────────

#[derive(Deserialize)]
pub struct RedeemRequest {
    #[serde(default)]
    pub code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub claim_link: String,
}

pub async fn redeem(
    State(state): State<AppState>,
    ClientMeta(claimant): ClientMeta,
    WithRejection(Json(body), _): WithRejection<Json<RedeemRequest>, CouponsServiceError>,
) -> Result<Json<RedeemResponse>, CouponsServiceError> {
    let uc = ClaimCouponUseCase {
        repo: state.coupon_repo(),
    };
    let claim_link = uc
        .execute(ClaimCouponInput {
            code: body.code,
            claimant,
        })
        .await?;
    Ok(Json(RedeemResponse { claim_link }))
}
