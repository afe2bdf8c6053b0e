// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed ports onto the hosted backend, one per table plus object storage.
//!
//! Every record operation that touches an existing row takes both the row ID
//! and the owner, so a write can never reach another user's data even where
//! the backend's row-level policies are misconfigured.

use crate::error::StoreError;
use crate::models::{PersonalRecord, Profile, RecordUpdate};
use std::future::Future;
use uuid::Uuid;

pub trait PersonalRecordsRepository {
    /// All records of `owner`, most recent `date_achieved` first.
    fn list_for_owner(
        &self,
        owner: Uuid,
    ) -> impl Future<Output = Result<Vec<PersonalRecord>, StoreError>> + Send;

    fn insert(
        &self,
        record: &PersonalRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fails with [`StoreError::NoMatch`] when no row has this ID and owner.
    fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: &RecordUpdate,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fails with [`StoreError::NoMatch`] when no row has this ID and owner.
    fn delete(&self, id: Uuid, owner: Uuid)
        -> impl Future<Output = Result<(), StoreError>> + Send;
}

pub trait ProfilesRepository {
    fn get_profile(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Profile>, StoreError>> + Send;

    fn insert_profile(
        &self,
        profile: &Profile,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Full replace keyed by `id`.
    fn upsert_profile(
        &self,
        profile: &Profile,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Options for a single object upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
    /// `Cache-Control` max-age, in seconds
    pub cache_control_secs: u32,
    /// Overwrite an existing object with the same key
    pub upsert: bool,
}

/// Settings applied when a bucket has to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketOptions {
    pub public: bool,
    pub file_size_limit: usize,
}

/// Location of an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object key within the bucket
    pub path: String,
    pub public_url: String,
}

pub trait BlobStorage {
    fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> impl Future<Output = Result<StoredObject, StoreError>> + Send;

    /// Create `bucket` with `options` unless it already exists.
    fn ensure_bucket(
        &self,
        bucket: &str,
        options: &BucketOptions,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Public URL of an object, or `None` for an empty path.
    fn public_url(&self, bucket: &str, path: &str) -> Option<String>;
}
