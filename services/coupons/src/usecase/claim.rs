use chrono::Utc;

use crate::domain::repository::CouponRepository;
use crate::domain::types::Claimant;
use crate::error::CouponsServiceError;

// ── ClaimCoupon ──────────────────────────────────────────────────────────────

pub struct ClaimCouponInput {
    pub code: String,
    pub claimant: Claimant,
}

pub struct ClaimCouponUseCase<R: CouponRepository> {
    pub repo: R,
}

impl<R: CouponRepository> ClaimCouponUseCase<R> {
    /// Exchange a code for its claim link. Succeeds at most once per code.
    pub async fn execute(&self, input: ClaimCouponInput) -> Result<String, CouponsServiceError> {
        let code = input.code.trim();
        if code.is_empty() {
            return Err(CouponsServiceError::MissingCode);
        }
        let now = Utc::now();

        if let Some(claimed) = self
            .repo
            .claim_if_available(code, &input.claimant, now)
            .await?
        {
            tracing::info!(
                coupon_id = %claimed.id,
                ip = claimed.claimed_by.as_ref().and_then(|c| c.ip.as_deref()),
                "coupon claimed"
            );
            return Ok(claimed.claim_link);
        }

        // The update decided; this read only explains the refusal.
        let coupon = self
            .repo
            .find_by_code(code)
            .await?
            .ok_or(CouponsServiceError::CouponNotFound)?;
        if coupon.is_claimed {
            Err(CouponsServiceError::AlreadyClaimed)
        } else {
            Err(CouponsServiceError::Expired)
        }
    }
}
