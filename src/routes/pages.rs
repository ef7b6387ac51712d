// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-rendered pages (require a session).

use crate::error::Result;
use crate::middleware::auth::AuthSession;
use crate::routes::api::TripsQuery;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::get,
    Extension, Router,
};
use std::sync::Arc;

/// Page routes. The page auth middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(|| async { Redirect::to(crate::views::TRIPS_PATH) }))
        .route("/trips", get(trips_page))
        .route("/trips/{trip_id}", get(trip_detail_page))
}

/// Trip grid for the page named in the query string.
async fn trips_page(
    State(state): State<Arc<AppState>>,
    Extension(AuthSession(session)): Extension<AuthSession>,
    Query(params): Query<TripsQuery>,
) -> Result<Html<String>> {
    let page = state.trips.list_page(params.page).await?;
    Ok(Html(state.views.trips(&page, &session.account.name)?))
}

/// Trip detail with a sidebar of recent trips.
async fn trip_detail_page(
    State(state): State<Arc<AppState>>,
    Extension(AuthSession(session)): Extension<AuthSession>,
    Path(trip_id): Path<String>,
) -> Result<Html<String>> {
    let detail = state.trips.detail(&trip_id).await?;
    Ok(Html(state.views.trip_detail(&detail, &session.account.name)?))
}
