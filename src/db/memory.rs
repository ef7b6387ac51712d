// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-local document store.
//!
//! Mirrors the Firestore query semantics the app relies on (equality
//! filter, create-only insert, ordered offset/limit window, count) so the
//! server can run without GCP and tests can seed data directly.

use crate::models::{TripRecord, UserProfile};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::TripWindow;

#[derive(Default)]
struct Inner {
    /// Keyed by document ID
    profiles: BTreeMap<String, UserProfile>,
    /// Keyed by document ID
    trips: BTreeMap<String, TripRecord>,
}

/// In-memory store, cheap to clone (shared state).
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Profiles whose `account_id` matches, in document ID order.
    pub async fn find_profiles_by_account(&self, account_id: &str) -> Vec<UserProfile> {
        self.inner
            .read()
            .await
            .profiles
            .values()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect()
    }

    pub async fn get_profile(&self, id: &str) -> Option<UserProfile> {
        self.inner.read().await.profiles.get(id).cloned()
    }

    /// Insert a profile unless its document ID is taken.
    ///
    /// Returns `false` when a document with the same ID already exists.
    pub async fn create_profile(&self, profile: &UserProfile) -> bool {
        let mut inner = self.inner.write().await;
        if inner.profiles.contains_key(&profile.id) {
            return false;
        }
        inner.profiles.insert(profile.id.clone(), profile.clone());
        true
    }

    pub async fn profile_count(&self) -> usize {
        self.inner.read().await.profiles.len()
    }

    /// Insert a trip unless its document ID is taken.
    pub async fn create_trip(&self, trip: &TripRecord) -> bool {
        let mut inner = self.inner.write().await;
        if inner.trips.contains_key(&trip.id) {
            return false;
        }
        inner.trips.insert(trip.id.clone(), trip.clone());
        true
    }

    pub async fn get_trip(&self, id: &str) -> Option<TripRecord> {
        self.inner.read().await.trips.get(id).cloned()
    }

    /// Trips newest first (ties broken by document ID), windowed.
    pub async fn list_trips(&self, window: TripWindow) -> Vec<TripRecord> {
        let inner = self.inner.read().await;
        let mut trips: Vec<&TripRecord> = inner.trips.values().collect();
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        trips
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .cloned()
            .collect()
    }

    pub async fn count_trips(&self) -> u64 {
        self.inner.read().await.trips.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(id: &str, created_at: &str) -> TripRecord {
        TripRecord {
            id: id.to_string(),
            trip_detail: "{}".to_string(),
            image_urls: None,
            created_at: created_at.to_string(),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_list_trips_newest_first() {
        let store = MemoryStore::new();
        store.create_trip(&trip("a", "2026-01-01T00:00:00Z")).await;
        store.create_trip(&trip("b", "2026-03-01T00:00:00Z")).await;
        store.create_trip(&trip("c", "2026-02-01T00:00:00Z")).await;

        let ids: Vec<String> = store
            .list_trips(TripWindow { offset: 0, limit: 10 })
            .await
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let window = store.list_trips(TripWindow { offset: 1, limit: 1 }).await;
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].id, "c");
    }

    #[tokio::test]
    async fn test_create_trip_is_create_only() {
        let store = MemoryStore::new();
        assert!(store.create_trip(&trip("a", "2026-01-01T00:00:00Z")).await);
        assert!(!store.create_trip(&trip("a", "2026-05-01T00:00:00Z")).await);

        let stored = store.get_trip("a").await.unwrap();
        assert_eq!(stored.created_at, "2026-01-01T00:00:00Z");
        assert_eq!(store.count_trips().await, 1);
    }
}
