#![allow(clippy::unused_async, unused_must_use)]
//! Tests for calendar tokens and the public feed.

use coursecal_test::component::calendar::token;
use salvo::http::StatusCode;

use super::helpers::*;

const TOKEN_PATH: &str = "/api/calendar/token";
const ROTATE_PATH: &str = "/api/calendar/token/rotate";

/// ## Summary
/// The token endpoint is stable across calls and names the public path.
#[test_log::test(tokio::test)]
async fn token_endpoint_returns_stable_token() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let user = test_db.seed_user("Ada", "ada@example.edu").await.expect("user");
    let service = create_db_test_service(&test_db.url()).await;

    let first = TestRequest::get(TOKEN_PATH)
        .as_user(user)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    let value = first["token"].as_str().expect("token string").to_string();
    assert!(token::is_well_formed(&value));
    assert_eq!(first["urlPath"], format!("/api/calendar/{value}.ics"));

    let second = TestRequest::get(TOKEN_PATH)
        .as_user(user)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(second["token"], value);
}

/// ## Summary
/// Token endpoints need an identity.
#[test_log::test(tokio::test)]
async fn token_endpoints_require_identity() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;

    TestRequest::get(TOKEN_PATH)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    TestRequest::post(ROTATE_PATH)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

/// ## Summary
/// The public path serves the same calendar as the authenticated one and
/// records the token's last use.
#[test_log::test(tokio::test)]
async fn public_feed_matches_authenticated_feed() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let user = test_db.seed_user("Ada", "ada@example.edu").await.expect("user");
    let course = test_db.seed_course("CS1", "Intro").await.expect("course");
    test_db
        .seed_titled(TitledKind::Assignment, course, "HW1", Some(chrono::Utc::now()))
        .await
        .expect("assignment");
    test_db.enroll(user, course).await.expect("enroll");
    let service = create_db_test_service(&test_db.url()).await;

    let url_path = TestRequest::get(TOKEN_PATH)
        .as_user(user)
        .send(&service)
        .await
        .json()["urlPath"]
        .as_str()
        .expect("urlPath")
        .to_string();

    let authed = TestRequest::get("/api/calendar.ics")
        .as_user(user)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
    let public = TestRequest::get(&url_path)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header("Content-Type", "text/calendar; charset=utf-8");

    assert_eq!(public.body_string(), authed.body_string());
    assert_eq!(public.get_etag(), authed.get_etag());

    let mut conn = test_db.get_conn().await.expect("conn");
    let row = coursecal_test::component::db::query::calendar_token::by_user(&mut conn, user)
        .await
        .expect("query")
        .expect("token row");
    assert!(row.last_used_at.is_some());
}

/// ## Summary
/// After rotation the old path is gone and the new one works.
#[test_log::test(tokio::test)]
async fn rotated_token_stops_resolving() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let user = test_db.seed_user("Ada", "ada@example.edu").await.expect("user");
    let service = create_db_test_service(&test_db.url()).await;

    let old = TestRequest::get(TOKEN_PATH)
        .as_user(user)
        .send(&service)
        .await
        .json();
    let old_path = old["urlPath"].as_str().expect("urlPath").to_string();

    let rotated = TestRequest::post(ROTATE_PATH)
        .as_user(user)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    let new_path = rotated["urlPath"].as_str().expect("urlPath").to_string();
    assert_ne!(new_path, old_path);

    TestRequest::get(&old_path)
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    TestRequest::get(&new_path)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    let current = TestRequest::get(TOKEN_PATH)
        .as_user(user)
        .send(&service)
        .await
        .json();
    assert_eq!(current["token"], rotated["token"]);
}

/// ## Summary
/// Unknown and malformed tokens are both plain 404s.
#[test_log::test(tokio::test)]
async fn unknown_tokens_are_not_found() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = create_db_test_service(&test_db.url()).await;

    let unknown = token::mint_token();
    TestRequest::get(&format!("/api/calendar/{unknown}.ics"))
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    TestRequest::get("/api/calendar/not-a-token.ics")
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    TestRequest::get(&format!("/api/calendar/{unknown}"))
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// ## Summary
/// Concurrent first requests for one user converge on a single token.
#[test_log::test(tokio::test)]
async fn concurrent_get_or_create_converges() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let user = test_db.seed_user("Ada", "ada@example.edu").await.expect("user");

    let mut conn_a = test_db.get_conn().await.expect("conn");
    let mut conn_b = test_db.get_conn().await.expect("conn");

    let (a, b) = tokio::join!(
        token::get_or_create(&mut conn_a, user),
        token::get_or_create(&mut conn_b, user),
    );
    let a = a.expect("first caller");
    let b = b.expect("second caller");
    assert_eq!(a, b);

    assert_eq!(token::resolve(&mut conn_a, &a).await.expect("resolve"), Some(user));
}
