// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the hosted identity provider (email + password accounts).
//!
//! Handles:
//! - Sign-in, returning an access token the backend accepts
//! - Sign-up (the provider sends the verification email)
//! - Sign-out, revoking the session's refresh tokens

use crate::error::{AppError, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone)]
struct Endpoint {
    base_url: String,
    anon_key: String,
}

/// Identity provider client.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    endpoint: Option<Endpoint>,
}

/// Signed-in user as reported by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUserInfo {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// A provider session.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUserInfo,
}

/// Outcome of a sign-up request.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub user_id: Option<Uuid>,
    /// The account cannot sign in until the email is verified
    pub confirmation_required: bool,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    confirmed_at: Option<String>,
    #[serde(default)]
    email_confirmed_at: Option<String>,
    #[serde(default)]
    user: Option<AuthUserInfo>,
    #[serde(default)]
    access_token: Option<String>,
}

/// Error body returned by the provider (field names vary by endpoint).
#[derive(Deserialize, Default)]
struct ProviderError {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl AuthClient {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: Some(Endpoint {
                base_url: base_url.trim_end_matches('/').to_string(),
                anon_key: anon_key.to_string(),
            }),
        }
    }

    /// Create a mock client for testing (offline mode).
    pub fn new_mock() -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: None,
        }
    }

    fn get_endpoint(&self) -> Result<&Endpoint, AppError> {
        self.endpoint
            .as_ref()
            .ok_or_else(|| AppError::AuthFailed("Identity provider not connected (offline mode)".to_string()))
    }

    fn post(&self, path: &str) -> Result<reqwest::RequestBuilder, AppError> {
        let endpoint = self.get_endpoint()?;
        Ok(self
            .http
            .post(format!("{}/auth/v1/{}", endpoint.base_url, path))
            .header("apikey", &endpoint.anon_key))
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        require_credentials(email, password)?;

        let response = self
            .post("token")?
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password })
            .send()
            .await
            .map_err(|e| AppError::AuthFailed(e.to_string()))?;

        let response = check_response(response).await?;
        let session: Session = response
            .json()
            .await
            .map_err(|e| AppError::AuthFailed(format!("JSON parse error: {}", e)))?;

        tracing::info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    /// Register a new account.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp, AppError> {
        require_credentials(email, password)?;

        let response = self
            .post("signup")?
            .json(&Credentials { email, password })
            .send()
            .await
            .map_err(|e| AppError::AuthFailed(e.to_string()))?;

        let response = check_response(response).await?;
        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| AppError::AuthFailed(format!("JSON parse error: {}", e)))?;

        // Autoconfirm projects answer with a full session, others with the bare user.
        let user_id = body.user.as_ref().map(|u| u.id).or(body.id);
        let confirmation_required = body.access_token.is_none()
            && body.confirmed_at.is_none()
            && body.email_confirmed_at.is_none();

        tracing::info!(user_id = ?user_id, confirmation_required, "Signed up");
        Ok(SignUp {
            user_id,
            confirmation_required,
        })
    }

    /// Revoke the session behind `access_token`.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let response = self
            .post("logout")?
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::AuthFailed(e.to_string()))?;

        check_response(response).await?;
        Ok(())
    }
}

fn require_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: ProviderError = serde_json::from_str(&body).unwrap_or_default();
    let message = parsed
        .error_description
        .or(parsed.msg)
        .or(parsed.message)
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body));

    tracing::debug!(status = status.as_u16(), "Identity provider rejected request");
    Err(AppError::AuthFailed(message))
}
