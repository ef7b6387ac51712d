// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod google;
pub mod profile;
pub mod session;
pub mod trips;

pub use google::GoogleClient;
pub use profile::ProfileService;
pub use session::{Session, SessionStore};
pub use trips::{TripService, TRIPS_PAGE_SIZE};
