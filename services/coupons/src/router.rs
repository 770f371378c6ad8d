use axum::{
    Router,
    routing::{get, post},
};

use linkdrop_core::health::healthz;
use linkdrop_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    coupon::{
        create_bulk_coupons, create_coupon, delete_coupon, extend_coupon, import_coupons,
        list_coupons,
    },
    health::readyz,
    link::{generate_coupons, get_link_stats, import_links},
    redeem::redeem,
    report::get_analytics,
    session::{get_session, login, logout},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Public redemption
        .route("/redeem", post(redeem))
        .route("/coupons/claim", post(redeem))
        // Admin session
        .route(
            "/admin/session",
            post(login).get(get_session).delete(logout),
        )
        // Coupons
        .route("/coupons", get(list_coupons).post(create_coupon))
        .route("/coupons/bulk", post(create_bulk_coupons))
        .route("/coupons/import", post(import_coupons))
        .route("/coupons/extend", post(extend_coupon))
        .route("/coupons/delete", post(delete_coupon))
        // Link pool
        .route("/links/import", post(import_links))
        .route("/links/stats", get(get_link_stats))
        .route("/links/generate-coupons", post(generate_coupons))
        // Reporting
        .route("/analytics/stats", get(get_analytics))
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
