// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Logout clears both the server-side session and the browser cookie.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;
use trip_planner::config::Config;
use trip_planner::middleware::auth::SESSION_COOKIE;

fn logout_request(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/auth/logout");
    if let Some(jwt) = cookie {
        builder = builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, jwt));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_logout_clears_cookie_with_matching_attributes() {
    let (app, state, _) = common::create_test_app();
    let jwt = common::sign_in(&state, None);

    let response = app.oneshot(logout_request(Some(&jwt))).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/sign-in");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("logout should set a removal cookie")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with(&format!("{}=", SESSION_COOKIE)));
    assert!(set_cookie.contains("Max-Age=0"));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert!(!set_cookie.contains("Secure"));
}

#[tokio::test]
async fn test_logout_cookie_is_secure_for_https_frontend() {
    let config = Config {
        frontend_url: "https://trips.example.com".to_string(),
        ..Config::test_default()
    };
    let (app, state, _) = common::create_test_app_with_config(config);
    let jwt = common::sign_in(&state, None);

    let response = app.oneshot(logout_request(Some(&jwt))).await.unwrap();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("Secure"));
}

#[tokio::test]
async fn test_logout_ends_server_session() {
    let (app, state, _) = common::create_test_app();
    let jwt = common::sign_in(&state, None);
    assert_eq!(state.sessions.len(), 1);

    let response = app
        .clone()
        .oneshot(logout_request(Some(&jwt)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(state.sessions.is_empty());

    // A replayed token no longer opens the API
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", jwt))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session_still_redirects() {
    let (app, _, _) = common::create_test_app();

    let response = app.oneshot(logout_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/sign-in");
}
