// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile loading and saving, including avatar uploads.

use crate::db::repository::{BucketOptions, UploadOptions};
use crate::db::{BlobStorage, ProfilesRepository};
use crate::error::{AppError, Result, ValidationError};
use crate::models::profile::MAX_BIO_CHARS;
use crate::models::Profile;
use uuid::Uuid;
use validator::Validate;

/// Largest accepted avatar, in bytes (5 MiB).
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

const AVATAR_CACHE_SECS: u32 = 3600;
const DEFAULT_AVATAR_EXTENSION: &str = "png";

/// An image chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AvatarFile {
    /// Must be an image no larger than [`MAX_AVATAR_BYTES`].
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !self.content_type.starts_with("image/") {
            return Err(ValidationError::NotAnImage);
        }
        if self.bytes.len() > MAX_AVATAR_BYTES {
            return Err(ValidationError::AvatarTooLarge {
                max: MAX_AVATAR_BYTES,
            });
        }
        Ok(())
    }

    /// File extension taken from the file name.
    pub fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext,
            _ => DEFAULT_AVATAR_EXTENSION,
        }
    }
}

/// Editable profile fields plus a pending avatar.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: String,
    pub location: String,
    bio: String,
    /// Storage path of the current avatar
    avatar_path: String,
    pending_avatar: Option<AvatarFile>,
    uploading_avatar: bool,
}

impl ProfileForm {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            location: profile.location.clone(),
            bio: profile.bio.chars().take(MAX_BIO_CHARS).collect(),
            avatar_path: profile.avatar_url.clone(),
            pending_avatar: None,
            uploading_avatar: false,
        }
    }

    pub fn bio(&self) -> &str {
        &self.bio
    }

    /// Input beyond the character cap is dropped.
    pub fn set_bio(&mut self, raw: &str) {
        self.bio = raw.chars().take(MAX_BIO_CHARS).collect();
    }

    pub fn avatar_path(&self) -> &str {
        &self.avatar_path
    }

    /// Queue an image to upload on the next save.
    pub fn select_avatar(&mut self, file: AvatarFile) -> std::result::Result<(), ValidationError> {
        file.validate()?;
        self.pending_avatar = Some(file);
        Ok(())
    }

    pub fn has_pending_avatar(&self) -> bool {
        self.pending_avatar.is_some()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading_avatar
    }
}

/// Result of a profile save.
#[derive(Debug, Clone)]
pub struct SavedProfile {
    pub profile: Profile,
    /// Set when the avatar upload failed but the other fields were saved
    pub avatar_error: Option<String>,
}

/// Profile operations for a configured avatar bucket.
#[derive(Debug, Clone)]
pub struct ProfileService {
    bucket: String,
}

impl ProfileService {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Fetch the owner's profile, creating a blank one if none exists.
    pub async fn load_or_create<R: ProfilesRepository>(
        &self,
        repo: &R,
        owner: Uuid,
    ) -> Result<Profile> {
        if let Some(profile) = repo.get_profile(owner).await.map_err(AppError::Fetch)? {
            return Ok(profile);
        }

        tracing::info!(user_id = %owner, "No profile yet, creating one");
        let profile = Profile::empty(owner);
        repo.insert_profile(&profile)
            .await
            .map_err(AppError::Write)?;
        Ok(profile)
    }

    /// Public URL of the profile's avatar, if it has one.
    pub fn avatar_public_url<S: BlobStorage>(&self, storage: &S, profile: &Profile) -> Option<String> {
        storage.public_url(&self.bucket, &profile.avatar_url)
    }

    /// Upload a pending avatar (if any) and replace the stored profile.
    ///
    /// A failed upload keeps the previous avatar and does not stop the save.
    pub async fn save<R: ProfilesRepository + BlobStorage>(
        &self,
        repo: &R,
        owner: Uuid,
        form: &mut ProfileForm,
    ) -> Result<SavedProfile> {
        let mut avatar_error = None;

        if let Some(avatar) = form.pending_avatar.take() {
            form.uploading_avatar = true;
            match self.upload_avatar(repo, owner, avatar.clone()).await {
                Ok(path) => form.avatar_path = path,
                Err(e) => {
                    tracing::warn!(user_id = %owner, error = %e, "Avatar upload failed, keeping previous avatar");
                    avatar_error = Some(e.to_string());
                    form.pending_avatar = Some(avatar);
                }
            }
            form.uploading_avatar = false;
        }

        let profile = Profile {
            id: owner,
            name: form.name.clone(),
            location: form.location.clone(),
            bio: form.bio.clone(),
            avatar_url: form.avatar_path.clone(),
        };
        profile.validate().map_err(|_| ValidationError::BioTooLong {
            max: MAX_BIO_CHARS,
        })?;

        repo.upsert_profile(&profile)
            .await
            .map_err(AppError::Write)?;

        tracing::info!(user_id = %owner, "Profile saved");
        Ok(SavedProfile {
            profile,
            avatar_error,
        })
    }

    /// Returns the stored object path.
    async fn upload_avatar<S: BlobStorage>(
        &self,
        storage: &S,
        owner: Uuid,
        avatar: AvatarFile,
    ) -> Result<String> {
        let bucket_options = BucketOptions {
            public: true,
            file_size_limit: MAX_AVATAR_BYTES,
        };
        if let Err(e) = storage.ensure_bucket(&self.bucket, &bucket_options).await {
            tracing::warn!(bucket = %self.bucket, error = %e, "Could not ensure avatar bucket exists");
        }

        let key = format!(
            "{}-{}.{}",
            owner,
            chrono::Utc::now().timestamp_millis(),
            avatar.extension()
        );
        let options = UploadOptions {
            content_type: avatar.content_type,
            cache_control_secs: AVATAR_CACHE_SECS,
            upsert: true,
        };

        let stored = storage
            .upload(&self.bucket, &key, avatar.bytes, &options)
            .await
            .map_err(AppError::Upload)?;

        tracing::info!(user_id = %owner, path = %stored.path, "Avatar uploaded");
        Ok(stored.path)
    }
}
