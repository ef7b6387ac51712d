// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document store client with typed operations.
//!
//! Provides high-level operations for:
//! - User profiles (one per identity-provider account)
//! - Trips (generated itineraries, read-mostly)
//!
//! Backed by Firestore in production, or by [`MemoryStore`] for local
//! development and tests.

use super::{Collections, MemoryStore};
use crate::error::AppError;
use crate::models::{TripRecord, UserProfile};
use serde::Deserialize;

/// Profile fields fetched by the account lookup.
const PROFILE_FIELDS: [&str; 5] = ["account_id", "name", "email", "image_url", "joined_at"];

/// Offset/limit window over the trips collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripWindow {
    pub offset: u32,
    pub limit: u32,
}

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(MemoryStore),
    Offline,
}

/// Aggregation result for the trips count query.
#[derive(Deserialize)]
struct TripCount {
    count: u64,
}

/// Document store client.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Backend,
    collections: Collections,
}

impl DocumentStore {
    /// Connect to Firestore.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(
        project_id: &str,
        database_id: &str,
        collections: Collections,
    ) -> Result<Self, AppError> {
        let options = firestore::FirestoreDbOptions::new(project_id.to_string())
            .with_database_id(database_id.to_string());

        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(options, collections).await;
        }

        let client = firestore::FirestoreDb::with_options(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(
            project = project_id,
            database = database_id,
            "Connected to Firestore"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
            collections,
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(
        options: firestore::FirestoreDbOptions,
        collections: Collections,
    ) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!("Connected to Firestore (Emulator/Unauthenticated)");

        Ok(Self {
            backend: Backend::Firestore(client),
            collections,
        })
    }

    /// Create a store backed by process memory.
    pub fn new_in_memory(store: MemoryStore) -> Self {
        Self {
            backend: Backend::Memory(store),
            collections: Collections::default(),
        }
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
            collections: Collections::default(),
        }
    }

    fn offline() -> AppError {
        AppError::Database("Database not connected (offline mode)".to_string())
    }

    // ─── User Profile Operations ─────────────────────────────────

    /// List profiles whose `account_id` equals the given account.
    pub async fn find_profiles_by_account(
        &self,
        account_id: &str,
    ) -> Result<Vec<UserProfile>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .fields(PROFILE_FIELDS)
                .from(self.collections.users.as_str())
                .filter(|q| q.field("account_id").eq(account_id))
                .obj()
                .query()
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(store) => Ok(store.find_profiles_by_account(account_id).await),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Get a profile by document ID.
    pub async fn get_profile(&self, id: &str) -> Result<Option<UserProfile>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(self.collections.users.as_str())
                .obj()
                .one(id)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(store) => Ok(store.get_profile(id).await),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Create a profile document keyed by `profile.id`.
    ///
    /// Create-only: returns `Ok(false)` without writing when the document
    /// already exists.
    pub async fn create_profile(&self, profile: &UserProfile) -> Result<bool, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let result: Result<UserProfile, _> = client
                    .fluent()
                    .insert()
                    .into(self.collections.users.as_str())
                    .document_id(&profile.id)
                    .object(profile)
                    .execute()
                    .await;

                match result {
                    Ok(_) => Ok(true),
                    Err(firestore::errors::FirestoreError::DataConflictError(_)) => Ok(false),
                    Err(e) => Err(AppError::Database(e.to_string())),
                }
            }
            Backend::Memory(store) => Ok(store.create_profile(profile).await),
            Backend::Offline => Err(Self::offline()),
        }
    }

    // ─── Trip Operations ─────────────────────────────────────────

    /// Get a trip by document ID.
    pub async fn get_trip(&self, id: &str) -> Result<Option<TripRecord>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(self.collections.trips.as_str())
                .obj()
                .one(id)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(store) => Ok(store.get_trip(id).await),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Get a window of trips, newest first.
    pub async fn list_trips(&self, window: TripWindow) -> Result<Vec<TripRecord>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .from(self.collections.trips.as_str())
                .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
                .offset(window.offset)
                .limit(window.limit)
                .obj()
                .query()
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(store) => Ok(store.list_trips(window).await),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Total number of trip documents.
    pub async fn count_trips(&self) -> Result<u64, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let counts: Vec<TripCount> = client
                    .fluent()
                    .select()
                    .from(self.collections.trips.as_str())
                    .aggregate(|a| a.fields([a.field("count").count()]))
                    .obj()
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                Ok(counts.first().map(|c| c.count).unwrap_or(0))
            }
            Backend::Memory(store) => Ok(store.count_trips().await),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Store a trip, generating a document ID when `trip.id` is empty.
    ///
    /// Returns the document ID.
    pub async fn create_trip(&self, trip: &TripRecord) -> Result<String, AppError> {
        let mut trip = trip.clone();
        if trip.id.is_empty() {
            trip.id = super::unique_id()
                .map_err(|_| AppError::Internal(anyhow::anyhow!("Random ID generation failed")))?;
        }

        let created = match &self.backend {
            Backend::Firestore(client) => {
                let result: Result<TripRecord, _> = client
                    .fluent()
                    .insert()
                    .into(self.collections.trips.as_str())
                    .document_id(&trip.id)
                    .object(&trip)
                    .execute()
                    .await;

                match result {
                    Ok(_) => true,
                    Err(firestore::errors::FirestoreError::DataConflictError(_)) => false,
                    Err(e) => return Err(AppError::Database(e.to_string())),
                }
            }
            Backend::Memory(store) => store.create_trip(&trip).await,
            Backend::Offline => return Err(Self::offline()),
        };

        if !created {
            return Err(AppError::BadRequest(format!("Trip {} already exists", trip.id)));
        }

        tracing::debug!(trip_id = %trip.id, "Trip stored");
        Ok(trip.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_store_errors() {
        let store = DocumentStore::new_mock();
        let err = store.count_trips().await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert!(store.get_profile("x").await.is_err());
    }

    #[tokio::test]
    async fn test_create_trip_generates_id() {
        let store = DocumentStore::new_in_memory(MemoryStore::new());
        let trip = TripRecord {
            id: String::new(),
            trip_detail: "{}".to_string(),
            image_urls: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            user_id: None,
        };

        let id = store.create_trip(&trip).await.unwrap();
        assert_eq!(id.len(), 20);
        assert!(store.get_trip(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_trip_rejects_duplicate_id() {
        let store = DocumentStore::new_in_memory(MemoryStore::new());
        let trip = TripRecord {
            id: "fixed".to_string(),
            trip_detail: "{}".to_string(),
            image_urls: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            user_id: None,
        };

        store.create_trip(&trip).await.unwrap();
        let err = store.create_trip(&trip).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
