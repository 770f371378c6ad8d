use chrono::{Duration, Utc};

use crate::domain::repository::{CouponRepository, StoredLinkRepository};
use crate::domain::types::{CouponCounts, LinkStats, RECENT_ACTIVITY_DAYS};
use crate::error::CouponsServiceError;

/// Aggregate view of one admin's links and coupons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analytics {
    pub links: LinkStats,
    pub coupons: CouponCounts,
    /// Links imported within the recent-activity window.
    pub recent_imports: u64,
}

pub struct AnalyticsUseCase<C: CouponRepository, L: StoredLinkRepository> {
    pub coupons: C,
    pub links: L,
}

impl<C: CouponRepository, L: StoredLinkRepository> AnalyticsUseCase<C, L> {
    pub async fn execute(&self, owner: &str) -> Result<Analytics, CouponsServiceError> {
        let now = Utc::now();
        let since = now - Duration::days(RECENT_ACTIVITY_DAYS);

        let links = self.links.stats(owner).await?;
        let recent_imports = self.links.count_created_since(owner, since).await?;
        let coupons = self.coupons.counts(owner, now, since).await?;

        Ok(Analytics {
            links,
            coupons,
            recent_imports,
        })
    }
}
