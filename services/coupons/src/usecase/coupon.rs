use chrono::{DateTime, Utc};
use rand::RngExt;

use linkdrop_domain::coupon::{CouponSortBy, CouponSource};
use linkdrop_domain::id::CouponId;
use linkdrop_domain::pagination::PageRequest;

use crate::domain::repository::CouponRepository;
use crate::domain::types::{
    CODE_LEN, Coupon, CouponFilter, DEFAULT_COUPON_NAME, DEFAULT_IMPORT_EXPIRY_DAYS,
    MAX_CODE_ATTEMPTS, NewCoupon, clean_links, coupon_name, end_of_day_after, expiry_days,
};
use crate::error::CouponsServiceError;

/// Charset for coupon codes (mixed-case alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub(crate) fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Insert under a fresh code, regenerating on collision up to `MAX_CODE_ATTEMPTS` times.
pub(crate) async fn insert_coupon<R: CouponRepository>(
    repo: &R,
    coupon: &NewCoupon,
    now: DateTime<Utc>,
) -> Result<Coupon, CouponsServiceError> {
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let code = generate_code();
        match repo.insert(coupon, &code, now).await {
            Ok(created) => {
                tracing::info!(
                    coupon_id = %created.id,
                    source = created.source.as_str(),
                    expires_at = %created.expires_at,
                    "coupon created"
                );
                return Ok(created);
            }
            Err(CouponsServiceError::DuplicateCode) => {
                tracing::warn!(attempt, "coupon code collision, regenerating");
            }
            Err(e) => return Err(e),
        }
    }
    Err(CouponsServiceError::DuplicateCode)
}

/// Create one coupon per link, in order. The first failure aborts the rest; coupons already
/// written stay.
async fn create_each<R: CouponRepository>(
    repo: &R,
    links: Vec<String>,
    name: String,
    expires_at: DateTime<Utc>,
    created_by: &str,
    source: CouponSource,
    now: DateTime<Utc>,
) -> Result<Vec<Coupon>, CouponsServiceError> {
    let mut created = Vec::with_capacity(links.len());
    for claim_link in links {
        let coupon = NewCoupon {
            claim_link,
            name: name.clone(),
            expires_at,
            created_by: created_by.to_owned(),
            source,
        };
        created.push(insert_coupon(repo, &coupon, now).await?);
    }
    Ok(created)
}

// ── CreateCoupon ─────────────────────────────────────────────────────────────

pub struct CreateCouponInput {
    pub claim_link: String,
    pub name: Option<String>,
    pub days_until_expiry: i64,
    pub created_by: String,
}

pub struct CreateCouponUseCase<R: CouponRepository> {
    pub repo: R,
}

impl<R: CouponRepository> CreateCouponUseCase<R> {
    pub async fn execute(&self, input: CreateCouponInput) -> Result<Coupon, CouponsServiceError> {
        let claim_link = input.claim_link.trim();
        if claim_link.is_empty() {
            return Err(CouponsServiceError::MissingClaimLink);
        }
        let days = expiry_days(input.days_until_expiry)?;
        let now = Utc::now();

        let coupon = NewCoupon {
            claim_link: claim_link.to_owned(),
            name: coupon_name(input.name.as_deref(), DEFAULT_COUPON_NAME),
            expires_at: end_of_day_after(now, days),
            created_by: input.created_by,
            source: CouponSource::Added,
        };
        insert_coupon(&self.repo, &coupon, now).await
    }
}

// ── CreateBulkCoupons ────────────────────────────────────────────────────────

pub struct CreateBulkCouponsInput {
    pub links: Vec<String>,
    pub name: Option<String>,
    pub days_until_expiry: i64,
    pub created_by: String,
}

pub struct CreateBulkCouponsUseCase<R: CouponRepository> {
    pub repo: R,
}

impl<R: CouponRepository> CreateBulkCouponsUseCase<R> {
    pub async fn execute(
        &self,
        input: CreateBulkCouponsInput,
    ) -> Result<Vec<Coupon>, CouponsServiceError> {
        let links = clean_links(&input.links);
        if links.is_empty() {
            return Err(CouponsServiceError::MissingLinks);
        }
        let days = expiry_days(input.days_until_expiry)?;
        let now = Utc::now();

        create_each(
            &self.repo,
            links,
            coupon_name(input.name.as_deref(), DEFAULT_COUPON_NAME),
            end_of_day_after(now, days),
            &input.created_by,
            CouponSource::Added,
            now,
        )
        .await
    }
}

// ── ImportCoupons (line-delimited text) ──────────────────────────────────────

pub struct ImportCouponsInput {
    pub text: String,
    pub name: Option<String>,
    pub days_until_expiry: Option<i64>,
    pub created_by: String,
}

pub struct ImportCouponsUseCase<R: CouponRepository> {
    pub repo: R,
}

impl<R: CouponRepository> ImportCouponsUseCase<R> {
    pub async fn execute(
        &self,
        input: ImportCouponsInput,
    ) -> Result<Vec<Coupon>, CouponsServiceError> {
        let links = clean_links(input.text.lines());
        if links.is_empty() {
            return Err(CouponsServiceError::MissingLinks);
        }
        let days = expiry_days(
            input
                .days_until_expiry
                .unwrap_or(DEFAULT_IMPORT_EXPIRY_DAYS),
        )?;
        let now = Utc::now();

        create_each(
            &self.repo,
            links,
            coupon_name(input.name.as_deref(), DEFAULT_COUPON_NAME),
            end_of_day_after(now, days),
            &input.created_by,
            CouponSource::Imported,
            now,
        )
        .await
    }
}

// ── ExtendCoupon ─────────────────────────────────────────────────────────────

pub struct ExtendCouponInput {
    pub coupon_id: CouponId,
    pub days_to_add: i64,
}

pub struct ExtendCouponUseCase<R: CouponRepository> {
    pub repo: R,
}

impl<R: CouponRepository> ExtendCouponUseCase<R> {
    /// New expiry is the end of day `days_to_add` days from now, never earlier than the
    /// current expiry. Claimed coupons are frozen.
    pub async fn execute(&self, input: ExtendCouponInput) -> Result<Coupon, CouponsServiceError> {
        let days = expiry_days(input.days_to_add)?;
        let coupon = self
            .repo
            .find_by_id(input.coupon_id)
            .await?
            .ok_or(CouponsServiceError::CouponNotFound)?;
        if coupon.is_claimed {
            return Err(CouponsServiceError::AlreadyClaimed);
        }

        let target = coupon
            .expires_at
            .max(end_of_day_after(Utc::now(), days));
        if let Some(extended) = self
            .repo
            .raise_expiry_if_unclaimed(input.coupon_id, target)
            .await?
        {
            tracing::info!(
                coupon_id = %extended.id,
                expires_at = %extended.expires_at,
                "coupon expiry extended"
            );
            return Ok(extended);
        }

        // Lost a race with a claim, delete or a later extension.
        let current = self
            .repo
            .find_by_id(input.coupon_id)
            .await?
            .ok_or(CouponsServiceError::CouponNotFound)?;
        if current.is_claimed {
            return Err(CouponsServiceError::AlreadyClaimed);
        }
        Ok(current)
    }
}

// ── DeleteCoupon ─────────────────────────────────────────────────────────────

pub struct DeleteCouponUseCase<R: CouponRepository> {
    pub repo: R,
}

impl<R: CouponRepository> DeleteCouponUseCase<R> {
    pub async fn execute(&self, coupon_id: CouponId) -> Result<(), CouponsServiceError> {
        if !self.repo.delete(coupon_id).await? {
            return Err(CouponsServiceError::CouponNotFound);
        }
        tracing::info!(coupon_id = %coupon_id, "coupon deleted");
        Ok(())
    }
}

// ── ListCoupons ──────────────────────────────────────────────────────────────

pub struct ListCouponsUseCase<R: CouponRepository> {
    pub repo: R,
}

impl<R: CouponRepository> ListCouponsUseCase<R> {
    pub async fn execute(
        &self,
        filter: CouponFilter,
        sort_by: CouponSortBy,
        page: PageRequest,
    ) -> Result<Vec<Coupon>, CouponsServiceError> {
        self.repo
            .list(&filter, sort_by, page.clamped(), Utc::now())
            .await
    }
}
