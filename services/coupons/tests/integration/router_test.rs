use axum::http::{HeaderValue, StatusCode, header::COOKIE};
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase};
use serde_json::{Value, json};

use linkdrop_admin_auth::cookie::LINKDROP_SESSION;
use linkdrop_admin_auth::credentials::AdminCredentials;
use linkdrop_admin_auth::identity::SessionKey;
use linkdrop_coupons::router::build_router;
use linkdrop_coupons::state::AppState;
use linkdrop_testing::auth::MockAdmin;

use crate::helpers::ADMIN;

const SECRET: &str = "router-test-secret";
const PASSWORD: &str = "hunter2";

fn server_over(db: DatabaseConnection) -> TestServer {
    let state = AppState {
        db,
        session_key: SessionKey::new(SECRET),
        admin: AdminCredentials::new(ADMIN, PASSWORD),
        cookie_domain: String::new(),
    };
    TestServer::new(build_router(state)).unwrap()
}

/// Server over a disconnected database: only paths that never reach the store succeed.
fn server() -> TestServer {
    server_over(DatabaseConnection::Disconnected)
}

fn admin_cookie() -> HeaderValue {
    MockAdmin::new(ADMIN, SECRET).cookie()
}

#[tokio::test]
async fn should_answer_liveness_probe() {
    let response = server().get("/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    let response = server().get("/readyz").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_attach_request_id_to_responses() {
    let response = server().get("/healthz").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_reject_admin_routes_without_session() {
    let server = server();
    let requests = [
        server.get("/coupons"),
        server.post("/coupons").json(&json!({})),
        server.post("/coupons/bulk").json(&json!({})),
        server.post("/coupons/import").json(&json!({})),
        server.post("/coupons/extend").json(&json!({})),
        server.post("/coupons/delete").json(&json!({})),
        server.post("/links/import").json(&json!({})),
        server.get("/links/stats"),
        server.post("/links/generate-coupons").json(&json!({})),
        server.get("/analytics/stats"),
        server.get("/admin/session"),
    ];
    for request in requests {
        let response = request.await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["kind"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn should_reject_session_signed_with_other_secret() {
    let forged = MockAdmin::new(ADMIN, "not-the-secret").cookie();
    let response = server()
        .post("/coupons")
        .add_header(COOKIE, forged)
        .json(&json!({ "claimLink": "https://claim.example/a", "daysUntilExpiry": 1 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_wrong_credentials() {
    let response = server()
        .post("/admin/session")
        .json(&json!({ "username": ADMIN, "password": "wrong" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn should_issue_session_cookie_that_opens_admin_routes() {
    let server = server();
    let login = server
        .post("/admin/session")
        .json(&json!({ "username": ADMIN, "password": PASSWORD }))
        .await;
    assert_eq!(login.status_code(), StatusCode::CREATED);
    assert_eq!(login.json::<Value>()["admin"], ADMIN);

    let cookie = login.cookie(LINKDROP_SESSION);
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));

    let header = HeaderValue::from_str(&format!("{LINKDROP_SESSION}={}", cookie.value())).unwrap();
    let session = server.get("/admin/session").add_header(COOKIE, header).await;
    assert_eq!(session.status_code(), StatusCode::OK);
    assert_eq!(session.json::<Value>()["admin"], ADMIN);
}

#[tokio::test]
async fn should_render_session_expiry_as_rfc3339() {
    let login = server()
        .post("/admin/session")
        .json(&json!({ "username": ADMIN, "password": PASSWORD }))
        .await;
    let body = login.json::<Value>();
    let raw = body["expiresAt"].as_str().unwrap();

    assert!(raw.ends_with('Z'));
    let expires_at = DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc);
    let lifetime = expires_at - Utc::now();
    assert!(lifetime > Duration::days(29) && lifetime <= Duration::days(30));
}

#[tokio::test]
async fn should_clear_cookie_on_logout() {
    let response = server()
        .delete("/admin/session")
        .add_header(COOKIE, admin_cookie())
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(response.cookie(LINKDROP_SESSION).value(), "");
}

#[tokio::test]
async fn should_reject_blank_redeem_code() {
    for path in ["/redeem", "/coupons/claim"] {
        let response = server().post(path).json(&json!({ "code": "  " })).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["kind"], "MISSING_CODE");
        assert_eq!(body["error"], "coupon code is required");
    }
}

#[tokio::test]
async fn should_reject_non_json_redeem_body_as_structured_error() {
    let response = server().post("/redeem").text("code=ABCDEFGHIJ").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["kind"], "INVALID_BODY");
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn should_reject_wrongly_typed_redeem_code_as_structured_error() {
    for path in ["/redeem", "/coupons/claim"] {
        let response = server().post(path).json(&json!({ "code": 12345 })).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["kind"], "INVALID_BODY");
        assert!(body["error"].as_str().is_some_and(|e| e.contains("code")));
    }
}

#[tokio::test]
async fn should_reject_malformed_admin_body_as_structured_error() {
    let response = server()
        .post("/coupons")
        .add_header(COOKIE, admin_cookie())
        .json(&json!({ "claimLink": "https://claim.example/a", "daysUntilExpiry": "two" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_BODY");
}

#[tokio::test]
async fn should_validate_create_body_before_storing() {
    let response = server()
        .post("/coupons")
        .add_header(COOKIE, admin_cookie())
        .json(&json!({ "claimLink": "   ", "daysUntilExpiry": 2 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "MISSING_CLAIM_LINK");

    let response = server()
        .post("/coupons")
        .add_header(COOKIE, admin_cookie())
        .json(&json!({ "claimLink": "https://claim.example/a", "daysUntilExpiry": 0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_EXPIRY_DAYS");
}

#[tokio::test]
async fn should_reject_malformed_coupon_id() {
    for path in ["/coupons/extend", "/coupons/delete"] {
        let response = server()
            .post(path)
            .add_header(COOKIE, admin_cookie())
            .json(&json!({ "couponId": "not-a-uuid", "daysToAdd": 1 }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["kind"], "INVALID_COUPON_ID");
    }
}

#[tokio::test]
async fn should_validate_generation_count_before_storing() {
    let response = server()
        .post("/links/generate-coupons")
        .add_header(COOKIE, admin_cookie())
        .json(&json!({ "count": 0, "daysUntilExpiry": 3 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_COUNT");
}

#[tokio::test]
async fn should_report_internal_error_when_store_is_unreachable() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection refused".to_owned())])
        .into_connection();
    let response = server_over(db)
        .get("/links/stats")
        .add_header(COOKIE, admin_cookie())
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert_eq!(body["kind"], "INTERNAL");
    assert_eq!(body["error"], "internal error");
}
