// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-rendered HTML views.
//!
//! Templates are compiled into the binary and registered with `.html`
//! names so tera autoescapes every interpolation.

use crate::error::AppError;
use crate::models::{TripCard, TripView};
use crate::services::trips::{TripDetailPage, TripsPage};
use serde::Serialize;
use tera::{Context, Tera};

const TEMPLATES: [(&str, &str); 6] = [
    ("base.html", include_str!("../templates/base.html")),
    ("pager.html", include_str!("../templates/pager.html")),
    ("trip_card.html", include_str!("../templates/trip_card.html")),
    ("sign_in.html", include_str!("../templates/sign_in.html")),
    ("trips.html", include_str!("../templates/trips.html")),
    ("trip_detail.html", include_str!("../templates/trip_detail.html")),
];

/// Path of the trips listing.
pub const TRIPS_PATH: &str = "/trips";

/// Numbered link in the pager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub active: bool,
}

/// Pager state derived from the requested page and the total count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pager {
    pub current: i64,
    pub total_pages: u32,
    pub pages: Vec<PageLink>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Link to a page of the trips listing.
pub fn page_href(page: u32) -> String {
    format!("{}?page={}", TRIPS_PATH, page)
}

impl Pager {
    /// `current` is the page from the URL and may lie outside
    /// `1..=total_pages`; prev/next then lead back into range.
    pub fn new(current: i64, total_records: u64, page_size: u32) -> Self {
        let page_size = u64::from(page_size.max(1));
        let total_pages = total_records.div_ceil(page_size).clamp(1, u64::from(u32::MAX)) as u32;

        let pages = (1..=total_pages)
            .map(|number| PageLink {
                number,
                href: page_href(number),
                active: i64::from(number) == current,
            })
            .collect();

        Self {
            current,
            total_pages,
            pages,
            prev: (current > 1)
                .then(|| page_href((current - 1).min(i64::from(total_pages)) as u32)),
            next: (current < i64::from(total_pages))
                .then(|| page_href((current + 1).max(1) as u32)),
        }
    }
}

#[derive(Serialize)]
struct TripsContext<'a> {
    user_name: Option<&'a str>,
    cards: Vec<TripCard>,
    pager: Pager,
}

#[derive(Serialize)]
struct DetailContext<'a> {
    user_name: Option<&'a str>,
    trip: &'a TripView,
    tags: Vec<&'a str>,
    cards: Vec<TripCard>,
}

#[derive(Serialize)]
struct SignInContext<'a> {
    user_name: Option<&'a str>,
    error: Option<&'a str>,
}

/// Compiled page templates.
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self, AppError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String, AppError> {
        let context = Context::from_serialize(data)?;
        Ok(self.tera.render(template, &context)?)
    }

    pub fn sign_in(&self, error: Option<&str>) -> Result<String, AppError> {
        self.render(
            "sign_in.html",
            &SignInContext {
                user_name: None,
                error,
            },
        )
    }

    /// Trips grid with pager. The pager follows the page that was
    /// requested in the URL.
    pub fn trips(&self, page: &TripsPage, user_name: &str) -> Result<String, AppError> {
        self.render(
            "trips.html",
            &TripsContext {
                user_name: Some(user_name),
                cards: page.trips.iter().map(TripView::card).collect(),
                pager: Pager::new(page.current_page, page.total_records, page.page_size),
            },
        )
    }

    pub fn trip_detail(&self, detail: &TripDetailPage, user_name: &str) -> Result<String, AppError> {
        let d = &detail.trip.detail;
        let tags = [&d.travel_style, &d.group_type, &d.budget, &d.interests]
            .into_iter()
            .filter(|t| !t.is_empty())
            .map(String::as_str)
            .collect();

        self.render(
            "trip_detail.html",
            &DetailContext {
                user_name: Some(user_name),
                trip: &detail.trip,
                tags,
                cards: detail.all_trips.iter().map(TripView::card).collect(),
            },
        )
    }
}
