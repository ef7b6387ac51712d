// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth authentication routes.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, Redirect},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, decode_jwt, SESSION_COOKIE};
use crate::services::session::SESSION_TTL_SECS;
use crate::time_utils::unix_millis;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// How long a signed OAuth state stays valid (10 minutes).
const OAUTH_STATE_MAX_AGE_MS: u64 = 10 * 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sign-in", get(sign_in))
        .route("/auth/google", get(auth_start))
        .route("/auth/google/callback", get(auth_callback))
        .route("/auth/logout", post(logout))
}

#[derive(Deserialize)]
pub struct SignInParams {
    #[serde(default)]
    error: Option<String>,
}

/// Sign-in page.
async fn sign_in(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SignInParams>,
) -> Result<Html<String>> {
    Ok(Html(state.views.sign_in(params.error.as_deref())?))
}

/// Query parameters for starting OAuth flow.
#[derive(Deserialize)]
pub struct AuthStartParams {
    /// Where to land after sign-in: a local path or a URL under
    /// FRONTEND_URL. Anything else falls back to FRONTEND_URL.
    #[serde(default)]
    redirect_uri: Option<String>,
}

/// Start OAuth flow - redirect to Google's consent screen.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthStartParams>,
    headers: HeaderMap,
) -> Result<Redirect> {
    let return_url = params
        .redirect_uri
        .filter(|url| is_allowed_return_url(url, &state.config.frontend_url))
        .unwrap_or_else(|| state.config.frontend_url.clone());

    let oauth_state = sign_state(
        &return_url,
        unix_millis(chrono::Utc::now()),
        &state.config.oauth_state_key,
    )?;

    let callback_url = callback_url(&headers);
    let auth_url = state.google.authorize_url(&callback_url, &oauth_state);

    tracing::info!(
        return_url = %return_url,
        callback_url = %callback_url,
        "Starting OAuth flow, redirecting to Google"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    state: String,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for a token, create the session, sync
/// the profile.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    let return_url = verify_and_decode_state(
        &params.state,
        &state.config.oauth_state_key,
        unix_millis(chrono::Utc::now()),
    )
    .unwrap_or_else(|| {
        tracing::warn!("Invalid or expired state parameter, falling back to default frontend URL");
        state.config.frontend_url.clone()
    });

    // Check for OAuth errors
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Google");
        let redirect = format!("/sign-in?error={}", urlencoding::encode(&error));
        return Ok((jar, Redirect::to(&redirect)));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");

    let callback_url = callback_url(&headers);
    let tokens = state.google.exchange_code(&code, &callback_url).await?;
    let account = state.google.get_account(&tokens.access_token).await?;
    let session = state
        .sessions
        .create(account, Some(tokens.access_token))?;

    // Profile sync must not block sign-in; /api/me retries it
    if let Err(e) = state.profiles.store_profile(&session).await {
        tracing::warn!(
            account_id = %session.account.id,
            error = %e,
            "Failed to store user profile, continuing anyway"
        );
    }

    let jwt = create_jwt(&session, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(account_id = %session.account.id, "OAuth successful, session created");

    let secure = state.config.frontend_url.starts_with("https://");
    Ok((jar.add(session_cookie(jwt, secure)), Redirect::to(&return_url)))
}

/// Logout - delete the server-side session and clear the cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    let deleted = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| decode_jwt(cookie.value(), &state.config.jwt_signing_key).ok())
        .map(|claims| state.sessions.delete(&claims.sid))
        .unwrap_or(false);

    tracing::info!(deleted, "Logout");

    let secure = state.config.frontend_url.starts_with("https://");
    (jar.remove(removal_cookie(secure)), Redirect::to("/sign-in"))
}

/// Session cookie holding the JWT.
fn session_cookie(jwt: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, jwt))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS))
        .build()
}

/// Cookie with matching attributes, for removal.
fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Callback URL on this server, derived from the Host header.
fn callback_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| {
            std::env::var("API_HOST").unwrap_or_else(|_| "localhost:8080".to_string())
        });

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}/auth/google/callback", scheme, host)
}

/// Local paths and URLs under the configured frontend are allowed.
fn is_allowed_return_url(url: &str, frontend_url: &str) -> bool {
    // Browsers drop tabs and newlines, so "/\t/host" would become "//host"
    if url.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return false;
    }

    let local_path = url.starts_with('/') && !url.starts_with("//") && !url.contains('\\');
    let under_frontend = url == frontend_url
        || url
            .strip_prefix(frontend_url)
            .is_some_and(|rest| rest.starts_with('/'));
    local_path || under_frontend
}

/// Build the OAuth state: base64url("return_url|timestamp_hex|signature_hex").
fn sign_state(return_url: &str, now_ms: u64, secret: &[u8]) -> Result<String> {
    let payload = format!("{}|{:x}", return_url, now_ms);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature)))
}

/// Verify HMAC signature and age, and decode the return URL from the
/// OAuth state parameter.
fn verify_and_decode_state(state: &str, secret: &[u8], now_ms: u64) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Split from the right: the return URL itself may contain '|'
    let mut parts = state_str.rsplitn(3, '|');
    let signature_hex = parts.next()?;
    let timestamp_hex = parts.next()?;
    let return_url = parts.next()?;

    let payload = format!("{}|{}", return_url, timestamp_hex);
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if !bool::from(signature_hex.as_bytes().ct_eq(expected_signature.as_bytes())) {
        tracing::warn!("OAuth state signature mismatch");
        return None;
    }

    let issued_ms = u64::from_str_radix(timestamp_hex, 16).ok()?;
    if now_ms.saturating_sub(issued_ms) > OAUTH_STATE_MAX_AGE_MS {
        tracing::warn!("OAuth state expired");
        return None;
    }

    Some(return_url.to_string())
}
