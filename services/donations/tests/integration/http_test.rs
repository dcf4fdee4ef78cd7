//! Router-level checks: extractor rejections, validation that runs before any
//! query, and static endpoints. Admin routes re-read the session's account, so
//! they run against a mock connection that answers that single lookup.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use tower::ServiceExt;
use uuid::Uuid;

use charity_auth_types::identity::SessionKey;
use charity_testing::auth::{MockSession, TEST_SESSION_SECRET};
use charity_testing::body::json_body;

use charity_donations::router::build_router;
use charity_donations_schema::users;
use charity_donations::state::AppState;
use charity_donations::usecase::admin::AdminRegistry;
use charity_donations::usecase::mail::SiteLinks;

fn app() -> Router {
    app_with_db(DatabaseConnection::Disconnected)
}

fn app_with_db(db: DatabaseConnection) -> Router {
    // Pools connect lazily; nothing here dials Redis unless a chart is requested.
    let redis = deadpool_redis::Config::from_url("redis://127.0.0.1:6399")
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .unwrap();
    build_router(AppState {
        db,
        redis,
        session_key: SessionKey::new(TEST_SESSION_SECRET),
        cookie_domain: "charity.test".to_owned(),
        links: SiteLinks::new("charity.test"),
        from_email: "noreply@charity.test".to_owned(),
        admin: Arc::new(AdminRegistry::with_defaults()),
    })
}

fn stored_account(id: Uuid, is_superuser: bool) -> users::Model {
    users::Model {
        id,
        email: "root@charity.test".to_owned(),
        first_name: "Root".to_owned(),
        last_name: "Admin".to_owned(),
        password_hash: String::new(),
        is_active: true,
        is_superuser,
        date_joined: Utc::now(),
        last_login: None,
    }
}

/// App whose database answers the staff lookup with `account`, or with nothing.
fn staff_app(account: Option<users::Model>) -> Router {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([account.into_iter().collect::<Vec<_>>()])
        .into_connection();
    app_with_db(db)
}

/// Superuser session plus an app that confirms the role from storage.
fn superuser_app() -> (MockSession, Router) {
    let id = Uuid::now_v7();
    (MockSession::superuser(id), staff_app(Some(stored_account(id, true))))
}

fn get(uri: &str, session: Option<&MockSession>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(session) = session {
        builder = builder.header(header::COOKIE, session.cookie_value(TEST_SESSION_SECRET));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, session: Option<&MockSession>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(session) = session {
        builder = builder.header(header::COOKIE, session.cookie_value(TEST_SESSION_SECRET));
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

#[tokio::test]
async fn should_answer_liveness_and_fail_readiness_without_database() {
    let live = app().oneshot(get("/healthz", None)).await.unwrap();
    assert_eq!(live.status(), StatusCode::OK);

    let ready = app().oneshot(get("/readyz", None)).await.unwrap();
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_echo_request_id() {
    let resp = app().oneshot(get("/healthz", None)).await.unwrap();
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_require_login_for_profile_and_donation_form() {
    for uri in ["/user_profile/", "/add_donation/"] {
        let resp = app().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(json_body(resp).await["kind"], "UNAUTHENTICATED");
    }
}

#[tokio::test]
async fn should_reject_session_signed_with_another_key() {
    let session = MockSession::user(Uuid::now_v7());
    let req = Request::builder()
        .uri("/user_profile/")
        .header(header::COOKIE, session.cookie_value("some-other-secret"))
        .body(Body::empty())
        .unwrap();

    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_forbid_admin_console_to_regular_user() {
    let session = MockSession::user(Uuid::now_v7());

    for uri in ["/admin/", "/admin/donations/", "/admin/reports/"] {
        let resp = app().oneshot(get(uri, Some(&session))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn should_forbid_admin_console_when_stored_account_lost_superuser() {
    let id = Uuid::now_v7();
    let session = MockSession::superuser(id);

    let resp = staff_app(Some(stored_account(id, false)))
        .oneshot(post_form("/admin/categories/delete/", "ids=1", Some(&session)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(resp).await["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_reject_admin_session_of_deleted_account() {
    let session = MockSession::superuser(Uuid::now_v7());

    let resp = staff_app(None)
        .oneshot(get("/admin/donations/export/", Some(&session)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_list_registered_resources_for_superuser() {
    let (session, app) = superuser_app();

    let resp = app.oneshot(get("/admin/", Some(&session))).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    let slugs: Vec<&str> = json["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["slug"].as_str().unwrap())
        .collect();
    assert_eq!(
        slugs,
        vec![
            "categories",
            "contact_messages",
            "donations",
            "institutions",
            "problem_reports"
        ]
    );
}

#[tokio::test]
async fn should_return_not_found_for_unknown_admin_resource() {
    let (session, app) = superuser_app();

    let resp = app
        .oneshot(get("/admin/wallets/", Some(&session)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["kind"], "UNKNOWN_RESOURCE");
}

#[tokio::test]
async fn should_reject_empty_bulk_delete() {
    let (session, app) = superuser_app();

    let resp = app
        .oneshot(post_form("/admin/categories/delete/", "", Some(&session)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(resp).await;
    assert_eq!(json["errors"]["ids"][0], "Select at least one row.");
}

#[tokio::test]
async fn should_only_allow_lifecycle_actions_on_donations() {
    let (session, app) = superuser_app();

    let resp = app
        .oneshot(post_form(
            "/admin/categories/1/status/",
            "status=completed",
            Some(&session),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_validate_report_filters_before_touching_storage() {
    let (session, app) = superuser_app();

    let resp = app
        .oneshot(get(
            "/admin/reports/?start_date=2026-05-10&end_date=2026-05-01",
            Some(&session),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_body(resp).await["errors"].get("end_date").is_some());
}

#[tokio::test]
async fn should_validate_contact_form_before_storing() {
    let resp = app()
        .oneshot(post_form("/contact/", "name=Jan&email=nope", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(resp).await;
    assert_eq!(json["kind"], "VALIDATION");
    assert!(json["errors"].get("surname").is_some());
    assert!(json["errors"].get("email").is_some());
}

#[tokio::test]
async fn should_require_login_to_report_problem() {
    let resp = app()
        .oneshot(post_form("/report_problem/", "subject=x&description=y", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_clear_session_cookie_on_logout() {
    let session = MockSession::user(Uuid::now_v7());

    let resp = app().oneshot(get("/logout/", Some(&session))).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/");
    let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("charity_session="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn should_thank_donor_on_success_page() {
    let resp = app().oneshot(get("/form_success/", None)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "success");
}

#[tokio::test]
async fn should_answer_malformed_toggle_body_with_json_error() {
    let session = MockSession::user(Uuid::now_v7());
    let cookie = session.cookie_value(TEST_SESSION_SECRET);

    let wrong_type = Request::builder()
        .method("POST")
        .uri("/user_profile/")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie.clone())
        .body(Body::from(r#"{"donation_id":"abc"}"#))
        .unwrap();
    let missing_content_type = Request::builder()
        .method("POST")
        .uri("/user_profile/")
        .header(header::COOKIE, cookie)
        .body(Body::from(r#"{"donation_id":1}"#))
        .unwrap();

    for req in [wrong_type, missing_content_type] {
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = json_body(resp).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "BAD_REQUEST");
    }
}
