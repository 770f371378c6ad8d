use std::net::SocketAddr;

use sea_orm::Database;
use tracing::info;

use linkdrop_admin_auth::credentials::AdminCredentials;
use linkdrop_admin_auth::identity::SessionKey;
use linkdrop_core::tracing::init_tracing;

use linkdrop_coupons::config::CouponsConfig;
use linkdrop_coupons::router::build_router;
use linkdrop_coupons::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = CouponsConfig::from_env();
    info!(?config, "loaded configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        session_key: SessionKey::new(config.session_secret),
        admin: AdminCredentials::new(config.admin_username, config.admin_password),
        cookie_domain: config.cookie_domain,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.coupons_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("coupons service listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
