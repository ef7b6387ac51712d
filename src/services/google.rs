// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google API client for OAuth sign-in and profile photos.
//!
//! Handles:
//! - Authorization URL construction
//! - Authorization code exchange
//! - Account lookup (OpenID Connect userinfo)
//! - Profile photo lookup (People API)

use crate::config::Config;
use crate::error::AppError;
use crate::models::Account;
use serde::Deserialize;

/// OAuth scopes requested at sign-in.
pub const OAUTH_SCOPES: &str = "openid email profile";

/// Google API client.
#[derive(Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
    people_url: String,
}

impl GoogleClient {
    /// Create a new Google client from OAuth credentials and endpoints.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            auth_url: config.google_auth_url.clone(),
            token_url: config.google_token_url.clone(),
            userinfo_url: config.google_userinfo_url.clone(),
            people_url: config.google_people_url.clone(),
        }
    }

    /// Build the consent-screen URL the browser is redirected to.
    pub fn authorize_url(&self, callback_url: &str, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(callback_url),
            urlencoding::encode(OAUTH_SCOPES),
            state
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token exchange failed");
            return Err(AppError::GoogleApi(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Failed to parse token response: {}", e)))
    }

    /// Get the signed-in account.
    pub async fn get_account(&self, access_token: &str) -> Result<Account, AppError> {
        let info: UserInfo = self.get_json(&self.userinfo_url, &[], access_token).await?;

        Ok(Account {
            id: info.sub,
            name: info.name.unwrap_or_default(),
            email: info.email.unwrap_or_default(),
        })
    }

    /// Get the URL of the account's first profile photo, if any.
    pub async fn get_photo_url(&self, access_token: &str) -> Result<Option<String>, AppError> {
        let person: Person = self
            .get_json(&self.people_url, &[("personFields", "photos")], access_token)
            .await?;

        Ok(person.photos.into_iter().next().and_then(|p| p.url))
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        access_token: &str,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GoogleApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GoogleApi(format!("JSON parse error: {}", e)))
    }
}

/// Token response from Google's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// OpenID Connect userinfo response.
#[derive(Debug, Clone, Deserialize)]
struct UserInfo {
    sub: String,
    name: Option<String>,
    email: Option<String>,
}

/// People API person resource (photos only).
#[derive(Debug, Clone, Deserialize)]
struct Person {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Clone, Deserialize)]
struct Photo {
    url: Option<String>,
}
