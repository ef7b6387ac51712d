// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile sync: mirror identity-provider accounts into profile documents.

use crate::db::DocumentStore;
use crate::error::AppError;
use crate::models::{Account, UserProfile};
use crate::services::google::GoogleClient;
use crate::services::session::Session;
use crate::time_utils::format_utc_rfc3339;

/// Profile lookup and first-login creation.
#[derive(Clone)]
pub struct ProfileService {
    db: DocumentStore,
    google: GoogleClient,
}

impl ProfileService {
    pub fn new(db: DocumentStore, google: GoogleClient) -> Self {
        Self { db, google }
    }

    /// Find the profile for an account.
    ///
    /// Returns `None` when no profile document matches, otherwise the first
    /// match.
    pub async fn existing_profile(
        &self,
        account: &Account,
    ) -> Result<Option<UserProfile>, AppError> {
        let profiles = self.db.find_profiles_by_account(&account.id).await?;
        if profiles.len() > 1 {
            tracing::warn!(
                account_id = %account.id,
                count = profiles.len(),
                "Multiple profiles for one account, using the first"
            );
        }
        Ok(profiles.into_iter().next())
    }

    /// Return the account's profile, creating it if absent.
    ///
    /// Never creates a second profile for an account: the existing one is
    /// returned instead.
    pub async fn store_profile(&self, session: &Session) -> Result<UserProfile, AppError> {
        if let Some(profile) = self.existing_profile(&session.account).await? {
            tracing::debug!(account_id = %session.account.id, "Profile already exists");
            return Ok(profile);
        }

        self.create_profile(session).await
    }

    /// Profile for the current session's account.
    pub async fn current_user(&self, session: &Session) -> Result<UserProfile, AppError> {
        self.store_profile(session).await
    }

    /// Create the profile document, keyed by account ID.
    async fn create_profile(&self, session: &Session) -> Result<UserProfile, AppError> {
        let image_url = self.google_picture(session).await;
        let profile = UserProfile::for_account(
            &session.account,
            image_url,
            format_utc_rfc3339(chrono::Utc::now()),
        );

        if self.db.create_profile(&profile).await? {
            tracing::info!(account_id = %profile.account_id, "Profile created");
            return Ok(profile);
        }

        // A concurrent first login created it between our check and write
        tracing::info!(
            account_id = %profile.account_id,
            "Profile created concurrently, using stored copy"
        );
        self.db.get_profile(&profile.id).await?.ok_or_else(|| {
            AppError::Database(format!(
                "Profile {} reported as existing but not found",
                profile.id
            ))
        })
    }

    /// Best-effort lookup of the account's Google profile photo.
    ///
    /// Returns `None` on any failure, and without a network call when the
    /// session carries no provider access token.
    pub async fn google_picture(&self, session: &Session) -> Option<String> {
        let access_token = session.provider_access_token.as_deref()?;

        match self.google.get_photo_url(access_token).await {
            Ok(url) => url,
            Err(e) if e.is_google_token_error() => {
                tracing::warn!(account_id = %session.account.id, "Provider token rejected by People API");
                None
            }
            Err(e) => {
                tracing::warn!(account_id = %session.account.id, error = %e, "Profile photo lookup failed");
                None
            }
        }
    }
}
