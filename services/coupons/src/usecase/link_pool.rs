use chrono::Utc;

use linkdrop_domain::coupon::CouponSource;
use linkdrop_domain::id::StoredLinkId;

use crate::domain::repository::{CouponRepository, StoredLinkRepository};
use crate::domain::types::{
    Coupon, DEFAULT_GENERATED_NAME, LinkStats, NewCoupon, clean_links, coupon_name,
    end_of_day_after, expiry_days, generate_count,
};
use crate::error::CouponsServiceError;
use crate::usecase::coupon::insert_coupon;

// ── ImportLinks ──────────────────────────────────────────────────────────────

pub struct ImportLinksInput {
    pub links: Vec<String>,
    pub owner: String,
}

pub struct ImportLinksOutput {
    pub count: u64,
    /// `None` if the post-import stats read failed; the import itself still stands.
    pub stats: Option<LinkStats>,
}

pub struct ImportLinksUseCase<L: StoredLinkRepository> {
    pub links: L,
}

impl<L: StoredLinkRepository> ImportLinksUseCase<L> {
    pub async fn execute(
        &self,
        input: ImportLinksInput,
    ) -> Result<ImportLinksOutput, CouponsServiceError> {
        let links = clean_links(&input.links);
        if links.is_empty() {
            return Err(CouponsServiceError::MissingLinks);
        }

        let count = self
            .links
            .insert_many(&links, &input.owner, Utc::now())
            .await?;
        tracing::info!(count, owner = %input.owner, "links imported");

        let stats = match self.links.stats(&input.owner).await {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::warn!(error = %e, "link stats refresh failed after import");
                None
            }
        };
        Ok(ImportLinksOutput { count, stats })
    }
}

// ── LinkStats ────────────────────────────────────────────────────────────────

pub struct LinkStatsUseCase<L: StoredLinkRepository> {
    pub links: L,
}

impl<L: StoredLinkRepository> LinkStatsUseCase<L> {
    pub async fn execute(&self, owner: &str) -> Result<LinkStats, CouponsServiceError> {
        self.links.stats(owner).await
    }
}

// ── GenerateFromPool ─────────────────────────────────────────────────────────

pub struct GenerateFromPoolInput {
    pub count: i64,
    pub days_until_expiry: i64,
    pub seller_name: Option<String>,
    pub owner: String,
}

pub struct GenerateFromPoolUseCase<C: CouponRepository, L: StoredLinkRepository> {
    pub coupons: C,
    pub links: L,
}

impl<C: CouponRepository, L: StoredLinkRepository> GenerateFromPoolUseCase<C, L> {
    /// Reserve `count` unused links of the owner, then write one coupon per link.
    ///
    /// Either all `count` links get coupons, or the links without a coupon are returned to
    /// the pool and the error surfaces.
    pub async fn execute(
        &self,
        input: GenerateFromPoolInput,
    ) -> Result<Vec<Coupon>, CouponsServiceError> {
        let requested = generate_count(input.count)?;
        let days = expiry_days(input.days_until_expiry)?;

        let available = self.links.stats(&input.owner).await?.available;
        if available < requested {
            return Err(CouponsServiceError::InsufficientSupply {
                available,
                requested,
            });
        }

        let now = Utc::now();
        let reserved = self
            .links
            .reserve_unused(&input.owner, requested, now)
            .await?;
        if (reserved.len() as u64) < requested {
            // A concurrent generation took some of the links we counted.
            let got = reserved.len() as u64;
            self.release(reserved.iter().map(|l| l.id).collect()).await;
            return Err(CouponsServiceError::InsufficientSupply {
                available: got,
                requested,
            });
        }

        let name = coupon_name(input.seller_name.as_deref(), DEFAULT_GENERATED_NAME);
        let expires_at = end_of_day_after(now, days);
        let mut created = Vec::with_capacity(reserved.len());
        for (i, link) in reserved.iter().enumerate() {
            let coupon = NewCoupon {
                claim_link: link.link.clone(),
                name: name.clone(),
                expires_at,
                created_by: input.owner.clone(),
                source: CouponSource::Generated,
            };
            match insert_coupon(&self.coupons, &coupon, now).await {
                Ok(c) => created.push(c),
                Err(e) => {
                    self.release(reserved[i..].iter().map(|l| l.id).collect())
                        .await;
                    return Err(e);
                }
            }
        }

        tracing::info!(
            count = created.len(),
            owner = %input.owner,
            "coupons generated from link pool"
        );
        Ok(created)
    }

    async fn release(&self, ids: Vec<StoredLinkId>) {
        if let Err(e) = self.links.release(&ids).await {
            tracing::error!(error = ?e, count = ids.len(), "failed to release reserved links");
        }
    }
}
