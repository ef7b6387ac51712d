// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthSession;
use crate::models::UserProfile;
use crate::services::trips::{parse_page, TripDetailPage, TripsPage};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/profile", get(get_profile))
        .route("/api/trips", get(get_trips))
        .route("/api/trips/{trip_id}", get(get_trip))
}

// ─── User Profile ────────────────────────────────────────────

/// Profile response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub joined_at: String,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            account_id: profile.account_id,
            name: profile.name,
            email: profile.email,
            image_url: profile.image_url,
            joined_at: profile.joined_at,
        }
    }
}

/// Get the current user's profile, creating it on first use.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(AuthSession(session)): Extension<AuthSession>,
) -> Result<Json<ProfileResponse>> {
    let profile = state.profiles.current_user(&session).await?;
    Ok(Json(profile.into()))
}

/// Get the current user's profile without creating it.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(AuthSession(session)): Extension<AuthSession>,
) -> Result<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .existing_profile(&session.account)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Profile for account {}", session.account.id))
        })?;

    Ok(Json(profile.into()))
}

// ─── Trips ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TripsQuery {
    /// Pagination: page number (1-indexed). Out-of-range pages load empty.
    #[serde(default = "default_page", deserialize_with = "lenient_page")]
    pub page: i64,
}

pub fn default_page() -> i64 {
    1
}

fn lenient_page<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_page(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid page number: {}", raw)))
}

/// Get one page of trips.
async fn get_trips(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TripsQuery>,
) -> Result<Json<TripsPage>> {
    Ok(Json(state.trips.list_page(params.page).await?))
}

/// Get a trip plus the first page of all trips.
async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<String>,
) -> Result<Json<TripDetailPage>> {
    Ok(Json(state.trips.detail(&trip_id).await?))
}
