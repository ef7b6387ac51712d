// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.

use crate::error::AppError;
use crate::services::session::{Session, SESSION_TTL_SECS};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "tp_session";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (external account ID)
    pub sub: String,
    /// Server-side session ID
    pub sid: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated session extracted from the request.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

/// Resolve the request's session from cookie or bearer token.
pub fn authenticate(
    state: &AppState,
    jar: &CookieJar,
    request: &Request,
) -> Result<Session, AppError> {
    // Browsers send the cookie; API clients may send a bearer token
    let token = match jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string)
            .ok_or(AppError::Unauthorized)?,
    };

    let claims = decode_jwt(&token, &state.config.jwt_signing_key)?;

    let session = state
        .sessions
        .get(&claims.sid)
        .ok_or(AppError::InvalidToken)?;

    if session.account.id != claims.sub {
        tracing::warn!(sid = %claims.sid, "Session token subject mismatch");
        return Err(AppError::InvalidToken);
    }

    Ok(session)
}

/// Middleware for API routes: 401 without a valid session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = authenticate(&state, &jar, &request)?;
    request.extensions_mut().insert(AuthSession(session));
    Ok(next.run(request).await)
}

/// Middleware for HTML pages: redirect to the sign-in page without a
/// valid session.
pub async fn require_page_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, &jar, &request) {
        Ok(session) => {
            request.extensions_mut().insert(AuthSession(session));
            next.run(request).await
        }
        Err(_) => Redirect::to("/sign-in").into_response(),
    }
}

/// Decode and validate a session JWT.
pub fn decode_jwt(token: &str, signing_key: &[u8]) -> Result<Claims, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

/// Create a JWT for a user session.
pub fn create_jwt(session: &Session, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: session.account.id.clone(),
        sid: session.id.clone(),
        iat: now,
        exp: now + SESSION_TTL_SECS as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Account;
    use chrono::{Duration, Utc};

    fn session() -> Session {
        let now = Utc::now();
        Session {
            id: "sid-1".to_string(),
            account: Account {
                id: "acct-1".to_string(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            provider_access_token: None,
            created_at: now,
            expires_at: now + Duration::hours(1),
        }
    }

    #[test]
    fn test_jwt_round_trip() {
        let key = b"test_jwt_key_32_bytes_minimum!!";
        let token = create_jwt(&session(), key).unwrap();
        let claims = decode_jwt(&token, key).unwrap();

        assert_eq!(claims.sub, "acct-1");
        assert_eq!(claims.sid, "sid-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_jwt_wrong_key() {
        let token = create_jwt(&session(), b"key-one-key-one-key-one-key-one").unwrap();
        let err = decode_jwt(&token, b"key-two-key-two-key-two-key-two").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
