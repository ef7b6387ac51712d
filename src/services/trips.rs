// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip loaders: paginated listing and detail view data.

use crate::db::{DocumentStore, TripWindow};
use crate::error::AppError;
use crate::models::TripView;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Trips shown per page.
pub const TRIPS_PAGE_SIZE: u32 = 4;

/// Map a 1-based page number to a store window.
///
/// Pages below 1, and pages whose offset does not fit the store's offset
/// type, have no window: they lie outside the collection and load as an
/// empty page.
pub fn page_window(page: i64, page_size: u32) -> Option<TripWindow> {
    if page < 1 {
        return None;
    }

    let offset = u64::try_from(page - 1)
        .ok()?
        .checked_mul(u64::from(page_size))?;

    Some(TripWindow {
        offset: u32::try_from(offset).ok()?,
        limit: page_size,
    })
}

/// Parse a `page` query value.
///
/// Any integer is accepted. Integers too large for `i64` saturate, since
/// they address pages past the end either way. Returns `None` for
/// non-integers.
pub fn parse_page(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let negative = raw.starts_with('-');
    let digits = raw
        .strip_prefix('-')
        .or_else(|| raw.strip_prefix('+'))
        .unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(raw.parse().unwrap_or(if negative { i64::MIN } else { i64::MAX }))
}

/// One page of trips.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TripsPage {
    pub trips: Vec<TripView>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_records: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub current_page: i64,
    pub page_size: u32,
}

/// A single trip plus the first page of all trips.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TripDetailPage {
    pub trip: TripView,
    pub all_trips: Vec<TripView>,
}

/// Trip loaders over the document store.
#[derive(Clone)]
pub struct TripService {
    db: DocumentStore,
}

impl TripService {
    pub fn new(db: DocumentStore) -> Self {
        Self { db }
    }

    /// Load one page of trips with the total count.
    pub async fn list_page(&self, page: i64) -> Result<TripsPage, AppError> {
        let (records, total) = match page_window(page, TRIPS_PAGE_SIZE) {
            Some(window) => {
                let (records, total) =
                    tokio::try_join!(self.db.list_trips(window), self.db.count_trips())?;
                tracing::debug!(
                    page,
                    limit = window.limit,
                    offset = window.offset,
                    fetched = records.len(),
                    total,
                    "Loaded trips page"
                );
                (records, total)
            }
            None => {
                let total = self.db.count_trips().await?;
                tracing::debug!(page, total, "Page outside the collection, nothing to fetch");
                (Vec::new(), total)
            }
        };

        Ok(TripsPage {
            trips: records.into_iter().map(TripView::from).collect(),
            total_records: total,
            current_page: page,
            page_size: TRIPS_PAGE_SIZE,
        })
    }

    /// Load a trip by ID.
    pub async fn get_trip(&self, trip_id: &str) -> Result<TripView, AppError> {
        let record = self
            .db
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip {} not found", trip_id)))?;

        Ok(TripView::from(record))
    }

    /// Load a trip and the first page of all trips concurrently.
    pub async fn detail(&self, trip_id: &str) -> Result<TripDetailPage, AppError> {
        let (trip, first_page) = tokio::try_join!(self.get_trip(trip_id), self.list_page(1))?;

        Ok(TripDetailPage {
            trip,
            all_trips: first_page.trips,
        })
    }
}
