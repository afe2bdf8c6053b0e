// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password authentication routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::middleware::auth::{extract_token, verify_token, TOKEN_COOKIE};
use crate::AppState;

/// Assumed access token lifetime when the provider does not report one.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SignupResponse {
    pub message: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub user_id: Uuid,
    pub email: Option<String>,
}

fn token_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Register a new account.
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    let outcome = state.auth.sign_up(&req.email, &req.password).await?;

    let message = if outcome.confirmation_required {
        "Check your email to confirm your account"
    } else {
        "Account created"
    };

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: message.to_string(),
        }),
    ))
}

/// Sign in and set the session cookie.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<CredentialsRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let session = state.auth.sign_in(&req.email, &req.password).await?;

    let lifetime = session.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    let expires_at = chrono::Utc::now().timestamp() + lifetime;
    state.sessions.open(session.user.id, expires_at);

    let jar = jar.add(token_cookie(
        session.access_token,
        state.config.secure_cookies(),
    ));

    Ok((
        jar,
        Json(LoginResponse {
            user_id: session.user.id,
            email: session.user.email,
        }),
    ))
}

/// Sign out: revoke at the provider, drop the session and clear the cookie.
///
/// Always succeeds; an invalid or missing token just clears the cookie.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: axum::http::HeaderMap,
) -> (CookieJar, StatusCode) {
    if let Some(token) = extract_token(&jar, &headers) {
        match verify_token(&token, &state.config.jwt_secret) {
            Ok(user) => {
                state.sessions.close(user.user_id);
                if let Err(e) = state.auth.sign_out(&user.access_token).await {
                    tracing::warn!(user_id = %user.user_id, error = %e, "Provider sign-out failed");
                }
                tracing::info!(user_id = %user.user_id, "Signed out");
            }
            Err(_) => tracing::debug!("Logout with invalid token, clearing cookie only"),
        }
    }

    let jar = jar.remove(token_cookie(String::new(), state.config.secure_cookies()));
    (jar, StatusCode::NO_CONTENT)
}
