// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

mod lenient;
pub mod trip;
pub mod user;

pub use trip::{parse_trip_data, TripCard, TripDetail, TripRecord, TripView};
pub use user::{Account, UserProfile};
