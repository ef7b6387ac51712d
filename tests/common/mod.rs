// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    extract::{Form, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use trip_planner::config::{Config, StoreBackend};
use trip_planner::db::{Collections, DocumentStore, MemoryStore};
use trip_planner::middleware::auth::create_jwt;
use trip_planner::models::{Account, TripRecord};
use trip_planner::routes::create_router;
use trip_planner::AppState;

/// Authorization code the Google stub accepts.
#[allow(dead_code)]
pub const STUB_CODE: &str = "good-code";
/// Access token the Google stub issues and accepts.
#[allow(dead_code)]
pub const STUB_ACCESS_TOKEN: &str = "stub-access-token";
/// Photo URL the Google stub returns from the People API.
#[allow(dead_code)]
pub const STUB_PHOTO_URL: &str = "https://photos.example/ada.jpg";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Connect to the Firestore emulator, with per-test collections.
#[allow(dead_code)]
pub async fn test_db(prefix: &str) -> DocumentStore {
    let collections = Collections {
        users: format!("{}_users", prefix),
        trips: format!("{}_trips", prefix),
    };
    DocumentStore::new("test-project", "(default)", collections)
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Build an app around a config and an in-memory store.
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (Router, Arc<AppState>, MemoryStore) {
    assert_eq!(config.store_backend, StoreBackend::Memory);
    let memory = MemoryStore::new();
    let db = DocumentStore::new_in_memory(memory.clone());
    let state = Arc::new(AppState::new(config, db).expect("state should build"));
    (create_router(state.clone()), state, memory)
}

/// Create a test app with an empty in-memory store.
/// Returns the router, the shared state, and a handle on the store.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>, MemoryStore) {
    create_test_app_with_config(Config::test_default())
}

/// The account used by most tests.
#[allow(dead_code)]
pub fn test_account() -> Account {
    Account {
        id: "g-123".to_string(),
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
    }
}

/// Open a session directly and mint its JWT.
#[allow(dead_code)]
pub fn sign_in(state: &AppState, provider_access_token: Option<&str>) -> String {
    let session = state
        .sessions
        .create(test_account(), provider_access_token.map(str::to_string))
        .expect("session should be created");
    create_jwt(&session, &state.config.jwt_signing_key).expect("JWT should be created")
}

/// Insert `count` trips named "Trip 00".."Trip NN", newest last.
#[allow(dead_code)]
pub async fn seed_trips(memory: &MemoryStore, count: usize) {
    for i in 0..count {
        let trip = TripRecord {
            id: format!("trip-{:02}", i),
            trip_detail: format!(
                r#"{{"name":"Trip {:02}","country":"Japan","interests":"Food","travelStyle":"Relaxed","estimatedPrice":"$1,200","duration":5,"itinerary":[{{"day":1,"location":"Tokyo","activities":[{{"time":"Morning","description":"Tsukiji market"}}]}}]}}"#,
                i
            ),
            image_urls: Some(vec![format!("https://img.example/{}.jpg", i)]),
            created_at: format!("2026-01-{:02}T00:00:00Z", i + 1),
            user_id: Some("g-123".to_string()),
        };
        assert!(memory.create_trip(&trip).await);
    }
}

/// Ordered trip IDs for `seed_trips(_, count)` as returned newest first.
#[allow(dead_code)]
pub fn newest_first_ids(count: usize) -> Vec<String> {
    (0..count).rev().map(|i| format!("trip-{:02}", i)).collect()
}

async fn stub_token(Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
    if form.get("code").map(String::as_str) != Some(STUB_CODE)
        || form.get("grant_type").map(String::as_str) != Some("authorization_code")
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "invalid_grant"})),
        );
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "access_token": STUB_ACCESS_TOKEN,
            "expires_in": 3599,
            "scope": "openid email profile",
            "token_type": "Bearer"
        })),
    )
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        == Some(format!("Bearer {}", STUB_ACCESS_TOKEN).as_str())
}

async fn stub_userinfo(headers: HeaderMap) -> impl IntoResponse {
    if !bearer_ok(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})));
    }
    let account = test_account();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "sub": account.id,
            "name": account.name,
            "email": account.email,
            "email_verified": true
        })),
    )
}

async fn stub_people(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if !bearer_ok(&headers) || query.get("personFields").map(String::as_str) != Some("photos") {
        return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})));
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "resourceName": "people/g-123",
            "photos": [{"url": STUB_PHOTO_URL, "default": false}]
        })),
    )
}

/// Serve stand-ins for Google's token, userinfo and People endpoints on a
/// local port. Returns a config pointing at them.
#[allow(dead_code)]
pub async fn spawn_google_stub() -> Config {
    let app = Router::new()
        .route("/token", post(stub_token))
        .route("/userinfo", get(stub_userinfo))
        .route("/people/me", get(stub_people));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("stub should bind");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server failed");
    });

    let base = format!("http://{}", addr);
    Config {
        google_token_url: format!("{}/token", base),
        google_userinfo_url: format!("{}/userinfo", base),
        google_people_url: format!("{}/people/me", base),
        ..Config::test_default()
    }
}

/// Read a response body as a string.
#[allow(dead_code)]
pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).expect("body should be JSON")
}
