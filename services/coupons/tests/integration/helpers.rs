use std::cmp::Reverse;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use linkdrop_coupons::domain::repository::{CouponRepository, StoredLinkRepository};
use linkdrop_coupons::domain::types::{
    Claimant, Coupon, CouponCounts, CouponFilter, DEFAULT_COUPON_NAME, LinkStats, NewCoupon,
    StoredLink,
};
use linkdrop_coupons::error::CouponsServiceError;
use linkdrop_domain::coupon::{CouponSortBy, CouponSource, CouponStatus};
use linkdrop_domain::id::{CouponId, StoredLinkId};
use linkdrop_domain::pagination::{PageRequest, Sort};

pub const ADMIN: &str = "admin";

// ── MockCouponRepo ───────────────────────────────────────────────────────────

/// In-memory coupon store. Conditional updates check and write under one lock, like the
/// single-statement updates of the real store.
#[derive(Clone, Default)]
pub struct MockCouponRepo {
    pub coupons: Arc<Mutex<Vec<Coupon>>>,
    /// Number of upcoming inserts to reject as code collisions.
    pub forced_collisions: Arc<AtomicUsize>,
    pub insert_attempts: Arc<AtomicUsize>,
    /// Fail every insert after this many have succeeded.
    pub fail_after: Option<usize>,
}

impl MockCouponRepo {
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self {
            coupons: Arc::new(Mutex::new(coupons)),
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_collisions(n: usize) -> Self {
        let repo = Self::default();
        repo.forced_collisions.store(n, Ordering::SeqCst);
        repo
    }

    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Default::default()
        }
    }

    /// Returns a shared handle to the internal coupon list for post-execution inspection.
    pub fn coupons_handle(&self) -> Arc<Mutex<Vec<Coupon>>> {
        Arc::clone(&self.coupons)
    }

    pub fn get(&self, code: &str) -> Option<Coupon> {
        self.coupons
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.code == code)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.coupons.lock().unwrap().len()
    }
}

impl CouponRepository for MockCouponRepo {
    async fn insert(
        &self,
        coupon: &NewCoupon,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Coupon, CouponsServiceError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        let forced = self
            .forced_collisions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if forced {
            return Err(CouponsServiceError::DuplicateCode);
        }

        let mut coupons = self.coupons.lock().unwrap();
        if self.fail_after.is_some_and(|n| coupons.len() >= n) {
            return Err(anyhow::anyhow!("connection reset").into());
        }
        if coupons.iter().any(|c| c.code == code) {
            return Err(CouponsServiceError::DuplicateCode);
        }
        let created = Coupon {
            id: CouponId::generate(),
            code: code.to_owned(),
            claim_link: coupon.claim_link.clone(),
            name: coupon.name.clone(),
            is_claimed: false,
            claimed_at: None,
            claimed_by: None,
            created_at: now,
            expires_at: coupon.expires_at,
            created_by: coupon.created_by.clone(),
            source: coupon.source,
        };
        coupons.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: CouponId) -> Result<Option<Coupon>, CouponsServiceError> {
        Ok(self
            .coupons
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, CouponsServiceError> {
        Ok(self.get(code))
    }

    async fn list(
        &self,
        filter: &CouponFilter,
        sort_by: CouponSortBy,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, CouponsServiceError> {
        let mut found: Vec<Coupon> = self
            .coupons
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filter.status.is_none_or(|s| c.status(now) == s))
            .filter(|c| filter.name.as_deref().is_none_or(|n| c.name == n))
            .cloned()
            .collect();
        match sort_by {
            CouponSortBy::CreatedAt(Sort::Desc) => found.sort_by_key(|c| Reverse(c.created_at)),
            CouponSortBy::CreatedAt(Sort::Asc) => found.sort_by_key(|c| c.created_at),
            CouponSortBy::ExpiresAt(Sort::Desc) => found.sort_by_key(|c| Reverse(c.expires_at)),
            CouponSortBy::ExpiresAt(Sort::Asc) => found.sort_by_key(|c| c.expires_at),
        }
        Ok(found
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn claim_if_available(
        &self,
        code: &str,
        claimant: &Claimant,
        now: DateTime<Utc>,
    ) -> Result<Option<Coupon>, CouponsServiceError> {
        // Let concurrent claimers interleave before the decision.
        tokio::task::yield_now().await;
        let mut coupons = self.coupons.lock().unwrap();
        let Some(coupon) = coupons
            .iter_mut()
            .find(|c| c.code == code && !c.is_claimed && c.expires_at >= now)
        else {
            return Ok(None);
        };
        coupon.is_claimed = true;
        coupon.claimed_at = Some(now);
        coupon.claimed_by = Some(claimant.clone());
        Ok(Some(coupon.clone()))
    }

    async fn raise_expiry_if_unclaimed(
        &self,
        id: CouponId,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<Coupon>, CouponsServiceError> {
        let mut coupons = self.coupons.lock().unwrap();
        let Some(coupon) = coupons
            .iter_mut()
            .find(|c| c.id == id && !c.is_claimed && c.expires_at <= expires_at)
        else {
            return Ok(None);
        };
        coupon.expires_at = expires_at;
        Ok(Some(coupon.clone()))
    }

    async fn delete(&self, id: CouponId) -> Result<bool, CouponsServiceError> {
        let mut coupons = self.coupons.lock().unwrap();
        let before = coupons.len();
        coupons.retain(|c| c.id != id);
        Ok(coupons.len() < before)
    }

    async fn counts(
        &self,
        owner: &str,
        now: DateTime<Utc>,
        since: DateTime<Utc>,
    ) -> Result<CouponCounts, CouponsServiceError> {
        let coupons = self.coupons.lock().unwrap();
        let owned: Vec<&Coupon> = coupons.iter().filter(|c| c.created_by == owner).collect();
        let with_status = |s: CouponStatus| {
            owned.iter().filter(|c| c.status(now) == s).count() as u64
        };
        Ok(CouponCounts {
            total: owned.len() as u64,
            claimed: with_status(CouponStatus::Claimed),
            active: with_status(CouponStatus::Available),
            expired: with_status(CouponStatus::Expired),
            generated_since: owned
                .iter()
                .filter(|c| c.source == CouponSource::Generated && c.created_at >= since)
                .count() as u64,
            claimed_since: owned
                .iter()
                .filter(|c| c.claimed_at.is_some_and(|at| at >= since))
                .count() as u64,
        })
    }
}

// ── MockStoredLinkRepo ───────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockStoredLinkRepo {
    pub links: Arc<Mutex<Vec<StoredLink>>>,
    pub fail_stats: bool,
}

impl MockStoredLinkRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn used_count(&self) -> usize {
        self.links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.is_used)
            .count()
    }
}

impl StoredLinkRepository for MockStoredLinkRepo {
    async fn insert_many(
        &self,
        links: &[String],
        owner: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, CouponsServiceError> {
        let mut stored = self.links.lock().unwrap();
        for (i, link) in links.iter().enumerate() {
            stored.push(StoredLink {
                id: StoredLinkId::generate(),
                link: link.clone(),
                is_used: false,
                used_at: None,
                // Keep import order observable through created_at.
                created_at: now + Duration::microseconds(i as i64),
                created_by: owner.to_owned(),
            });
        }
        Ok(links.len() as u64)
    }

    async fn stats(&self, owner: &str) -> Result<LinkStats, CouponsServiceError> {
        tokio::task::yield_now().await;
        if self.fail_stats {
            return Err(anyhow::anyhow!("stats unavailable").into());
        }
        let links = self.links.lock().unwrap();
        let owned = links.iter().filter(|l| l.created_by == owner);
        Ok(LinkStats {
            total: owned.clone().count() as u64,
            available: owned.filter(|l| !l.is_used).count() as u64,
        })
    }

    async fn count_created_since(
        &self,
        owner: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, CouponsServiceError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.created_by == owner && l.created_at >= since)
            .count() as u64)
    }

    async fn reserve_unused(
        &self,
        owner: &str,
        limit: u64,
        now: DateTime<Utc>,
    ) -> Result<Vec<StoredLink>, CouponsServiceError> {
        tokio::task::yield_now().await;
        let mut links = self.links.lock().unwrap();
        let mut reserved = Vec::new();
        for link in links
            .iter_mut()
            .filter(|l| l.created_by == owner && !l.is_used)
            .take(limit as usize)
        {
            link.is_used = true;
            link.used_at = Some(now);
            reserved.push(link.clone());
        }
        Ok(reserved)
    }

    async fn release(&self, ids: &[StoredLinkId]) -> Result<(), CouponsServiceError> {
        let mut links = self.links.lock().unwrap();
        for link in links.iter_mut().filter(|l| ids.contains(&l.id)) {
            link.is_used = false;
            link.used_at = None;
        }
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// An unclaimed coupon owned by [`ADMIN`].
pub fn test_coupon(code: &str, expires_at: DateTime<Utc>) -> Coupon {
    Coupon {
        id: CouponId::generate(),
        code: code.to_owned(),
        claim_link: format!("https://claim.example/{code}"),
        name: DEFAULT_COUPON_NAME.to_owned(),
        is_claimed: false,
        claimed_at: None,
        claimed_by: None,
        created_at: Utc::now() - Duration::days(1),
        expires_at,
        created_by: ADMIN.to_owned(),
        source: CouponSource::Added,
    }
}

pub fn claimed_coupon(code: &str) -> Coupon {
    let claimed_at = Utc::now() - Duration::hours(1);
    Coupon {
        is_claimed: true,
        claimed_at: Some(claimed_at),
        claimed_by: Some(Claimant {
            ip: Some("198.51.100.4".to_owned()),
            user_agent: Some("Mozilla/5.0".to_owned()),
        }),
        ..test_coupon(code, Utc::now() + Duration::days(3))
    }
}

pub fn claimant(ip: &str) -> Claimant {
    Claimant {
        ip: Some(ip.to_owned()),
        user_agent: Some("integration-test".to_owned()),
    }
}

pub fn links(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("https://claim.example/pool/{i}")).collect()
}
