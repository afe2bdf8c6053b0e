// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile routes.

use crate::error::{Result, ValidationError};
use crate::middleware::auth::AuthUser;
use crate::models::Profile;
use crate::services::profile::MAX_AVATAR_BYTES;
use crate::services::{AvatarFile, ProfileForm};
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, State},
    routing::get,
    Extension, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Room for a maximum-size avatar after base64 expansion, plus the fields.
const MAX_PROFILE_BODY_BYTES: usize = MAX_AVATAR_BYTES / 3 * 4 + 64 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", get(get_profile).put(update_profile))
        .layer(DefaultBodyLimit::max(MAX_PROFILE_BODY_BYTES))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub bio: String,
    /// Storage path of the avatar (empty when none)
    pub avatar_path: String,
    pub avatar_url: Option<String>,
    /// Present when the new avatar could not be uploaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_error: Option<String>,
}

impl ProfileResponse {
    fn new(profile: Profile, avatar_url: Option<String>, avatar_error: Option<String>) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            location: profile.location,
            bio: profile.bio,
            avatar_path: profile.avatar_url,
            avatar_url,
            avatar_error,
        }
    }
}

#[derive(Deserialize)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: String,
    /// Base64-encoded file contents
    pub data: String,
}

#[derive(Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar: Option<AvatarUpload>,
}

impl AvatarUpload {
    fn decode(self) -> std::result::Result<AvatarFile, ValidationError> {
        let bytes = STANDARD
            .decode(self.data.trim())
            .map_err(|_| ValidationError::InvalidAvatarData)?;
        Ok(AvatarFile {
            file_name: self.file_name,
            content_type: self.content_type,
            bytes,
        })
    }
}

/// Get the user's profile, creating an empty one on first visit.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let repo = state.db.for_user(&user.access_token);
    let profile = state.profiles.load_or_create(&repo, user.user_id).await?;
    let avatar_url = state.profiles.avatar_public_url(&repo, &profile);

    Ok(Json(ProfileResponse::new(profile, avatar_url, None)))
}

/// Save profile fields and an optional new avatar.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<ProfileResponse>> {
    // Validate the avatar before touching the backend.
    let avatar = req.avatar.map(AvatarUpload::decode).transpose()?;
    if let Some(avatar) = &avatar {
        avatar.validate()?;
    }

    let repo = state.db.for_user(&user.access_token);
    let current = state.profiles.load_or_create(&repo, user.user_id).await?;

    let mut form = ProfileForm::from_profile(&current);
    form.name = req.name;
    form.location = req.location;
    form.set_bio(&req.bio);
    if let Some(avatar) = avatar {
        form.select_avatar(avatar)?;
    }

    let saved = state.profiles.save(&repo, user.user_id, &mut form).await?;
    let avatar_url = state.profiles.avatar_public_url(&repo, &saved.profile);

    Ok(Json(ProfileResponse::new(
        saved.profile,
        avatar_url,
        saved.avatar_error,
    )))
}
