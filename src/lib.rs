// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Trip Planner: browse AI-generated travel itineraries
//!
//! This crate provides the web backend: Google sign-in with server-side
//! sessions, profile sync into the document store, and paginated trip
//! listing and detail pages.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod views;

use config::Config;
use db::DocumentStore;
use services::{GoogleClient, ProfileService, SessionStore, TripService};
use views::Views;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: DocumentStore,
    pub sessions: SessionStore,
    pub google: GoogleClient,
    pub profiles: ProfileService,
    pub trips: TripService,
    pub views: Views,
}

impl AppState {
    /// Wire services around a config and a connected store.
    pub fn new(config: Config, db: DocumentStore) -> Result<Self, error::AppError> {
        let google = GoogleClient::new(&config);
        Ok(Self {
            profiles: ProfileService::new(db.clone(), google.clone()),
            trips: TripService::new(db.clone()),
            sessions: SessionStore::new(),
            views: Views::new()?,
            google,
            config,
            db,
        })
    }
}
