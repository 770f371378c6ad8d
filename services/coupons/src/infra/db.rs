use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, LockBehavior, LockType};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use linkdrop_coupons_schema::{coupons, stored_links};
use linkdrop_domain::coupon::{CouponSortBy, CouponSource, CouponStatus};
use linkdrop_domain::id::{CouponId, StoredLinkId};
use linkdrop_domain::pagination::{PageRequest, Sort};

use crate::domain::repository::{CouponRepository, StoredLinkRepository};
use crate::domain::types::{
    Claimant, Coupon, CouponCounts, CouponFilter, LinkStats, NewCoupon, StoredLink,
};
use crate::error::CouponsServiceError;

/// Rows per statement for multi-row link inserts; keeps bind parameters well under the
/// Postgres limit.
const INSERT_CHUNK: usize = 1000;

// ── Coupon repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCouponRepository {
    pub db: DatabaseConnection,
}

impl CouponRepository for DbCouponRepository {
    async fn insert(
        &self,
        coupon: &NewCoupon,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Coupon, CouponsServiceError> {
        let result = coupons::ActiveModel {
            id: Set(CouponId::generate().0),
            code: Set(code.to_owned()),
            claim_link: Set(coupon.claim_link.clone()),
            name: Set(coupon.name.clone()),
            is_claimed: Set(false),
            claimed_at: Set(None),
            claimed_ip: Set(None),
            claimed_user_agent: Set(None),
            created_at: Set(now),
            expires_at: Set(coupon.expires_at),
            created_by: Set(coupon.created_by.clone()),
            source: Set(coupon.source.as_str().to_owned()),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(model) => coupon_from_model(model),
            Err(err) if is_unique_violation(&err) => Err(CouponsServiceError::DuplicateCode),
            Err(err) => Err(anyhow::Error::new(err).context("insert coupon").into()),
        }
    }

    async fn find_by_id(&self, id: CouponId) -> Result<Option<Coupon>, CouponsServiceError> {
        let model = coupons::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find coupon by id")?;
        model.map(coupon_from_model).transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, CouponsServiceError> {
        let model = coupons::Entity::find()
            .filter(coupons::Column::Code.eq(code))
            .one(&self.db)
            .await
            .context("find coupon by code")?;
        model.map(coupon_from_model).transpose()
    }

    async fn list(
        &self,
        filter: &CouponFilter,
        sort_by: CouponSortBy,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, CouponsServiceError> {
        let mut query = coupons::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(status_condition(status, now));
        }
        if let Some(name) = &filter.name {
            query = query.filter(coupons::Column::Name.eq(name.as_str()));
        }
        query = match sort_by {
            CouponSortBy::CreatedAt(Sort::Desc) => query.order_by_desc(coupons::Column::CreatedAt),
            CouponSortBy::CreatedAt(Sort::Asc) => query.order_by_asc(coupons::Column::CreatedAt),
            CouponSortBy::ExpiresAt(Sort::Desc) => query.order_by_desc(coupons::Column::ExpiresAt),
            CouponSortBy::ExpiresAt(Sort::Asc) => query.order_by_asc(coupons::Column::ExpiresAt),
        };
        let models = query
            .order_by_desc(coupons::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list coupons")?;
        models.into_iter().map(coupon_from_model).collect()
    }

    async fn claim_if_available(
        &self,
        code: &str,
        claimant: &Claimant,
        now: DateTime<Utc>,
    ) -> Result<Option<Coupon>, CouponsServiceError> {
        // The WHERE clause is the whole decision: one row flips, every concurrent loser
        // sees zero rows.
        let mut models = coupons::Entity::update_many()
            .col_expr(coupons::Column::IsClaimed, Expr::value(true))
            .col_expr(coupons::Column::ClaimedAt, Expr::value(Some(now)))
            .col_expr(coupons::Column::ClaimedIp, Expr::value(claimant.ip.clone()))
            .col_expr(
                coupons::Column::ClaimedUserAgent,
                Expr::value(claimant.user_agent.clone()),
            )
            .filter(coupons::Column::Code.eq(code))
            .filter(coupons::Column::IsClaimed.eq(false))
            .filter(coupons::Column::ExpiresAt.gte(now))
            .exec_with_returning(&self.db)
            .await
            .context("claim coupon")?;
        models.pop().map(coupon_from_model).transpose()
    }

    async fn raise_expiry_if_unclaimed(
        &self,
        id: CouponId,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<Coupon>, CouponsServiceError> {
        let mut models = coupons::Entity::update_many()
            .col_expr(coupons::Column::ExpiresAt, Expr::value(expires_at))
            .filter(coupons::Column::Id.eq(id.0))
            .filter(coupons::Column::IsClaimed.eq(false))
            .filter(coupons::Column::ExpiresAt.lte(expires_at))
            .exec_with_returning(&self.db)
            .await
            .context("extend coupon expiry")?;
        models.pop().map(coupon_from_model).transpose()
    }

    async fn delete(&self, id: CouponId) -> Result<bool, CouponsServiceError> {
        let result = coupons::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .context("delete coupon")?;
        Ok(result.rows_affected > 0)
    }

    async fn counts(
        &self,
        owner: &str,
        now: DateTime<Utc>,
        since: DateTime<Utc>,
    ) -> Result<CouponCounts, CouponsServiceError> {
        let owned = || Condition::all().add(coupons::Column::CreatedBy.eq(owner));

        let total = self.count(owned(), "count coupons").await?;
        let claimed = self
            .count(
                owned().add(status_condition(CouponStatus::Claimed, now)),
                "count claimed coupons",
            )
            .await?;
        let active = self
            .count(
                owned().add(status_condition(CouponStatus::Available, now)),
                "count active coupons",
            )
            .await?;
        let expired = self
            .count(
                owned().add(status_condition(CouponStatus::Expired, now)),
                "count expired coupons",
            )
            .await?;
        let generated_since = self
            .count(
                owned()
                    .add(coupons::Column::Source.eq(CouponSource::Generated.as_str()))
                    .add(coupons::Column::CreatedAt.gte(since)),
                "count recently generated coupons",
            )
            .await?;
        let claimed_since = self
            .count(
                owned()
                    .add(coupons::Column::IsClaimed.eq(true))
                    .add(coupons::Column::ClaimedAt.gte(since)),
                "count recently claimed coupons",
            )
            .await?;

        Ok(CouponCounts {
            total,
            claimed,
            active,
            expired,
            generated_since,
            claimed_since,
        })
    }
}

impl DbCouponRepository {
    async fn count(
        &self,
        condition: Condition,
        what: &'static str,
    ) -> Result<u64, CouponsServiceError> {
        let count = coupons::Entity::find()
            .filter(condition)
            .count(&self.db)
            .await
            .context(what)?;
        Ok(count)
    }
}

fn status_condition(status: CouponStatus, now: DateTime<Utc>) -> Condition {
    match status {
        CouponStatus::Claimed => Condition::all().add(coupons::Column::IsClaimed.eq(true)),
        CouponStatus::Available => Condition::all()
            .add(coupons::Column::IsClaimed.eq(false))
            .add(coupons::Column::ExpiresAt.gte(now)),
        CouponStatus::Expired => Condition::all()
            .add(coupons::Column::IsClaimed.eq(false))
            .add(coupons::Column::ExpiresAt.lt(now)),
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn coupon_from_model(model: coupons::Model) -> Result<Coupon, CouponsServiceError> {
    let source = CouponSource::parse(&model.source)
        .with_context(|| format!("unknown coupon source {:?}", model.source))?;
    let claimed_by = model.is_claimed.then(|| Claimant {
        ip: model.claimed_ip,
        user_agent: model.claimed_user_agent,
    });
    Ok(Coupon {
        id: CouponId(model.id),
        code: model.code,
        claim_link: model.claim_link,
        name: model.name,
        is_claimed: model.is_claimed,
        claimed_at: model.claimed_at,
        claimed_by,
        created_at: model.created_at,
        expires_at: model.expires_at,
        created_by: model.created_by,
        source,
    })
}

// ── Stored link repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbStoredLinkRepository {
    pub db: DatabaseConnection,
}

impl StoredLinkRepository for DbStoredLinkRepository {
    async fn insert_many(
        &self,
        links: &[String],
        owner: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, CouponsServiceError> {
        if links.is_empty() {
            return Ok(0);
        }
        let models: Vec<stored_links::ActiveModel> = links
            .iter()
            .map(|link| stored_links::ActiveModel {
                id: Set(StoredLinkId::generate().0),
                link: Set(link.clone()),
                is_used: Set(false),
                used_at: Set(None),
                created_at: Set(now),
                created_by: Set(owner.to_owned()),
            })
            .collect();
        let count = models.len() as u64;

        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    let mut models = models;
                    while !models.is_empty() {
                        let rest = models.split_off(models.len().min(INSERT_CHUNK));
                        stored_links::Entity::insert_many(models).exec(txn).await?;
                        models = rest;
                    }
                    Ok(())
                })
            })
            .await
            .context("insert stored links")?;
        Ok(count)
    }

    async fn stats(&self, owner: &str) -> Result<LinkStats, CouponsServiceError> {
        let total = stored_links::Entity::find()
            .filter(stored_links::Column::CreatedBy.eq(owner))
            .count(&self.db)
            .await
            .context("count stored links")?;
        let available = stored_links::Entity::find()
            .filter(stored_links::Column::CreatedBy.eq(owner))
            .filter(stored_links::Column::IsUsed.eq(false))
            .count(&self.db)
            .await
            .context("count unused stored links")?;
        Ok(LinkStats { total, available })
    }

    async fn count_created_since(
        &self,
        owner: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, CouponsServiceError> {
        let count = stored_links::Entity::find()
            .filter(stored_links::Column::CreatedBy.eq(owner))
            .filter(stored_links::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .context("count recently imported links")?;
        Ok(count)
    }

    async fn reserve_unused(
        &self,
        owner: &str,
        limit: u64,
        now: DateTime<Utc>,
    ) -> Result<Vec<StoredLink>, CouponsServiceError> {
        let owner = owner.to_owned();
        let models = self
            .db
            .transaction::<_, Vec<stored_links::Model>, DbErr>(|txn| {
                Box::pin(async move {
                    // Rows locked by a concurrent reservation are skipped, not waited on.
                    let ids: Vec<Uuid> = stored_links::Entity::find()
                        .select_only()
                        .column(stored_links::Column::Id)
                        .filter(stored_links::Column::CreatedBy.eq(owner))
                        .filter(stored_links::Column::IsUsed.eq(false))
                        .order_by_asc(stored_links::Column::CreatedAt)
                        .order_by_asc(stored_links::Column::Id)
                        .limit(limit)
                        .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
                        .into_tuple()
                        .all(txn)
                        .await?;
                    if ids.is_empty() {
                        return Ok(Vec::new());
                    }
                    stored_links::Entity::update_many()
                        .col_expr(stored_links::Column::IsUsed, Expr::value(true))
                        .col_expr(stored_links::Column::UsedAt, Expr::value(Some(now)))
                        .filter(stored_links::Column::Id.is_in(ids))
                        .filter(stored_links::Column::IsUsed.eq(false))
                        .exec_with_returning(txn)
                        .await
                })
            })
            .await
            .context("reserve stored links")?;

        let mut links: Vec<StoredLink> = models.into_iter().map(stored_link_from_model).collect();
        links.sort_by(|a, b| (a.created_at, a.id.0).cmp(&(b.created_at, b.id.0)));
        Ok(links)
    }

    async fn release(&self, ids: &[StoredLinkId]) -> Result<(), CouponsServiceError> {
        if ids.is_empty() {
            return Ok(());
        }
        stored_links::Entity::update_many()
            .col_expr(stored_links::Column::IsUsed, Expr::value(false))
            .col_expr(
                stored_links::Column::UsedAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .filter(stored_links::Column::Id.is_in(ids.iter().map(|id| id.0)))
            .exec(&self.db)
            .await
            .context("release stored links")?;
        Ok(())
    }
}

fn stored_link_from_model(model: stored_links::Model) -> StoredLink {
    StoredLink {
        id: StoredLinkId(model.id),
        link: model.link,
        is_used: model.is_used,
        used_at: model.used_at,
        created_at: model.created_at,
        created_by: model.created_by,
    }
}
