use chrono::{DateTime, Duration, NaiveTime, Utc};

use linkdrop_domain::coupon::{CouponSource, CouponStatus};
use linkdrop_domain::id::{CouponId, StoredLinkId};

use crate::error::CouponsServiceError;

/// Coupon code length in characters.
pub const CODE_LEN: usize = 10;

/// Attempts at inserting a coupon with a fresh code before giving up on collisions.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Label used when a coupon is created without a name.
pub const DEFAULT_COUPON_NAME: &str = "general";

/// Label used for pool-generated coupons without a seller name.
pub const DEFAULT_GENERATED_NAME: &str = "generated";

/// Expiry applied to text imports that do not specify one.
pub const DEFAULT_IMPORT_EXPIRY_DAYS: i64 = 2;

/// Upper bound for any "days until expiry" input.
pub const MAX_EXPIRY_DAYS: i64 = 3650;

/// Upper bound for a single pool generation request.
pub const MAX_GENERATE_COUNT: i64 = 1000;

/// Window for the analytics "recent activity" counters.
pub const RECENT_ACTIVITY_DAYS: i64 = 7;

/// Who claimed a coupon, as reported by the request that claimed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claimant {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// A single-use code bound to a claim link.
#[derive(Debug, Clone)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub claim_link: String,
    pub name: String,
    pub is_claimed: bool,
    pub claimed_at: Option<DateTime<Utc>>,
    pub claimed_by: Option<Claimant>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub created_by: String,
    pub source: CouponSource,
}

impl Coupon {
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn status(&self, now: DateTime<Utc>) -> CouponStatus {
        CouponStatus::derive(self.is_claimed, self.is_past_expiry(now))
    }
}

/// Everything needed to create a coupon except its code and id.
#[derive(Debug, Clone)]
pub struct NewCoupon {
    pub claim_link: String,
    pub name: String,
    pub expires_at: DateTime<Utc>,
    pub created_by: String,
    pub source: CouponSource,
}

/// An imported claim link in the pool.
#[derive(Debug, Clone)]
pub struct StoredLink {
    pub id: StoredLinkId,
    pub link: String,
    pub is_used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// Pool size for one owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub total: u64,
    pub available: u64,
}

/// Coupon counters for the analytics report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CouponCounts {
    pub total: u64,
    pub claimed: u64,
    pub active: u64,
    pub expired: u64,
    pub generated_since: u64,
    pub claimed_since: u64,
}

/// Listing filter for `GET /coupons`.
#[derive(Debug, Clone, Default)]
pub struct CouponFilter {
    pub status: Option<CouponStatus>,
    pub name: Option<String>,
}

/// Last instant (23:59:59.999 UTC) of the day `days` days after `now`.
///
/// "Expires in N days" therefore always grants the whole final day.
pub fn end_of_day_after(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    let day = (now + Duration::days(i64::from(days))).date_naive();
    day.and_time(NaiveTime::default()).and_utc() + Duration::days(1) - Duration::milliseconds(1)
}

/// Validate a "days until expiry" input.
pub fn expiry_days(days: i64) -> Result<u32, CouponsServiceError> {
    if !(1..=MAX_EXPIRY_DAYS).contains(&days) {
        return Err(CouponsServiceError::InvalidExpiryDays);
    }
    Ok(days as u32)
}

/// Validate a pool generation count.
pub fn generate_count(count: i64) -> Result<u64, CouponsServiceError> {
    if !(1..=MAX_GENERATE_COUNT).contains(&count) {
        return Err(CouponsServiceError::InvalidCount);
    }
    Ok(count as u64)
}

/// Trimmed name, or `default` when absent or blank.
pub fn coupon_name(name: Option<&str>, default: &str) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_owned(),
        _ => default.to_owned(),
    }
}

/// Trim entries and drop the empty ones.
pub fn clean_links<I, S>(links: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    links
        .into_iter()
        .map(|l| l.as_ref().trim().to_owned())
        .filter(|l| !l.is_empty())
        .collect()
}
