use chrono::{Duration, Utc};

use linkdrop_coupons::domain::types::{CouponCounts, LinkStats};
use linkdrop_coupons::usecase::link_pool::{
    GenerateFromPoolInput, GenerateFromPoolUseCase, ImportLinksInput, ImportLinksUseCase,
};
use linkdrop_coupons::usecase::report::AnalyticsUseCase;
use linkdrop_testing::clock::days_ago;

use crate::helpers::{ADMIN, MockCouponRepo, MockStoredLinkRepo, claimed_coupon, links, test_coupon};

#[tokio::test]
async fn should_aggregate_links_coupons_and_recent_activity() {
    let mut stale_claim = claimed_coupon("OLDCLAIM01");
    stale_claim.claimed_at = Some(days_ago(30));
    let mut foreign = test_coupon("FOREIGN001", Utc::now() + Duration::days(1));
    foreign.created_by = "someone-else".to_owned();

    let coupons_repo = MockCouponRepo::new(vec![
        test_coupon("AVAILABLE1", Utc::now() + Duration::days(1)),
        test_coupon("EXPIRED001", days_ago(2)),
        claimed_coupon("CLAIMED001"),
        stale_claim,
        foreign,
    ]);
    let links_repo = MockStoredLinkRepo::empty();

    ImportLinksUseCase {
        links: links_repo.clone(),
    }
    .execute(ImportLinksInput {
        links: links(3),
        owner: ADMIN.to_owned(),
    })
    .await
    .unwrap();
    GenerateFromPoolUseCase {
        coupons: coupons_repo.clone(),
        links: links_repo.clone(),
    }
    .execute(GenerateFromPoolInput {
        count: 1,
        days_until_expiry: 3,
        seller_name: None,
        owner: ADMIN.to_owned(),
    })
    .await
    .unwrap();

    let uc = AnalyticsUseCase {
        coupons: coupons_repo,
        links: links_repo,
    };
    let analytics = uc.execute(ADMIN).await.unwrap();

    assert_eq!(
        analytics.links,
        LinkStats {
            total: 3,
            available: 2
        }
    );
    assert_eq!(analytics.recent_imports, 3);
    assert_eq!(
        analytics.coupons,
        CouponCounts {
            total: 5,
            claimed: 2,
            active: 2,
            expired: 1,
            generated_since: 1,
            claimed_since: 1,
        }
    );
}

#[tokio::test]
async fn should_report_zeroes_for_new_admin() {
    let uc = AnalyticsUseCase {
        coupons: MockCouponRepo::empty(),
        links: MockStoredLinkRepo::empty(),
    };

    let analytics = uc.execute(ADMIN).await.unwrap();

    assert_eq!(analytics.links, LinkStats::default());
    assert_eq!(analytics.coupons, CouponCounts::default());
    assert_eq!(analytics.recent_imports, 0);
}
