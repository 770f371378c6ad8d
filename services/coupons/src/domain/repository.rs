#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use linkdrop_domain::coupon::CouponSortBy;
use linkdrop_domain::id::{CouponId, StoredLinkId};
use linkdrop_domain::pagination::PageRequest;

use crate::domain::types::{
    Claimant, Coupon, CouponCounts, CouponFilter, LinkStats, NewCoupon, StoredLink,
};
use crate::error::CouponsServiceError;

/// Repository for coupons.
pub trait CouponRepository: Send + Sync {
    /// Insert a coupon under `code`. Fails with `DuplicateCode` if the code is taken.
    async fn insert(&self, coupon: &NewCoupon, code: &str, now: DateTime<Utc>)
    -> Result<Coupon, CouponsServiceError>;

    async fn find_by_id(&self, id: CouponId) -> Result<Option<Coupon>, CouponsServiceError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, CouponsServiceError>;

    async fn list(
        &self,
        filter: &CouponFilter,
        sort_by: CouponSortBy,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, CouponsServiceError>;

    /// Mark the coupon claimed if it exists, is unclaimed and `now <= expires_at`, as one
    /// atomic step. Returns the updated coupon, or `None` if no row qualified.
    async fn claim_if_available(
        &self,
        code: &str,
        claimant: &Claimant,
        now: DateTime<Utc>,
    ) -> Result<Option<Coupon>, CouponsServiceError>;

    /// Set `expires_at` if the coupon is unclaimed and its current expiry is not later.
    /// Returns the updated coupon, or `None` if no row qualified.
    async fn raise_expiry_if_unclaimed(
        &self,
        id: CouponId,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<Coupon>, CouponsServiceError>;

    /// Delete a coupon. Returns `true` if a row was deleted.
    async fn delete(&self, id: CouponId) -> Result<bool, CouponsServiceError>;

    async fn counts(
        &self,
        owner: &str,
        now: DateTime<Utc>,
        since: DateTime<Utc>,
    ) -> Result<CouponCounts, CouponsServiceError>;
}

/// Repository for the per-owner pool of imported claim links.
pub trait StoredLinkRepository: Send + Sync {
    /// Insert all links as unused, all-or-nothing. Returns the number inserted.
    async fn insert_many(
        &self,
        links: &[String],
        owner: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, CouponsServiceError>;

    async fn stats(&self, owner: &str) -> Result<LinkStats, CouponsServiceError>;

    async fn count_created_since(
        &self,
        owner: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, CouponsServiceError>;

    /// Atomically mark up to `limit` unused links of `owner` as used and return them, oldest
    /// first. A link is handed to at most one caller.
    async fn reserve_unused(
        &self,
        owner: &str,
        limit: u64,
        now: DateTime<Utc>,
    ) -> Result<Vec<StoredLink>, CouponsServiceError>;

    /// Return reserved links to the pool.
    async fn release(&self, ids: &[StoredLinkId]) -> Result<(), CouponsServiceError>;
}
