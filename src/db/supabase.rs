// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hosted backend client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (one row per user)
//! - Personal records (scoped by owner)
//! - Object storage (avatar uploads)
//!
//! Requests are made on behalf of a signed-in user: [`SupabaseDb::for_user`]
//! binds the user's access token so the backend's row-level policies apply.

use crate::db::query::{Column, Direction, Filters, ProfileColumn, RecordColumn};
use crate::db::repository::{
    BlobStorage, BucketOptions, PersonalRecordsRepository, ProfilesRepository, StoredObject,
    UploadOptions,
};
use crate::db::tables;
use crate::error::StoreError;
use crate::models::{PersonalRecord, Profile, RecordUpdate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone)]
struct Connection {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

/// Backend client shared across requests.
#[derive(Clone)]
pub struct SupabaseDb {
    conn: Option<Connection>,
}

impl SupabaseDb {
    /// Create a client for the project at `base_url`.
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        tracing::info!(url = base_url, "Backend client configured");
        Self {
            conn: Some(Connection {
                http: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                anon_key: anon_key.to_string(),
            }),
        }
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All backend operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { conn: None }
    }

    /// Bind a user's access token for subsequent calls.
    pub fn for_user(&self, access_token: &str) -> UserScopedDb {
        UserScopedDb {
            conn: self.conn.clone(),
            access_token: access_token.to_string(),
        }
    }
}

/// Backend client acting as one signed-in user.
#[derive(Clone)]
pub struct UserScopedDb {
    conn: Option<Connection>,
    access_token: String,
}

impl UserScopedDb {
    /// Helper to get the connection or return an error if offline.
    fn get_conn(&self) -> Result<&Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::Offline)
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: &str,
    ) -> Result<reqwest::RequestBuilder, StoreError> {
        let conn = self.get_conn()?;
        Ok(conn
            .http
            .request(method, url)
            .header("apikey", &conn.anon_key)
            .bearer_auth(&self.access_token))
    }

    fn table_url(&self, table: &str) -> Result<String, StoreError> {
        Ok(format!("{}/rest/v1/{}", self.get_conn()?.base_url, table))
    }

    // ─── Table Operations ────────────────────────────────────────

    async fn select<T: DeserializeOwned, C: Column>(
        &self,
        table: &str,
        filters: &Filters<C>,
    ) -> Result<Vec<T>, StoreError> {
        tracing::debug!(table, "Selecting rows");
        let response = self
            .request(reqwest::Method::GET, &self.table_url(table)?)?
            .query(&[("select", "*")])
            .query(&filters.to_query())
            .send()
            .await?;

        Ok(check_response(response).await?.json().await?)
    }

    async fn insert_rows<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<(), StoreError> {
        tracing::debug!(table, count = rows.len(), "Inserting rows");
        let response = self
            .request(reqwest::Method::POST, &self.table_url(table)?)?
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;

        check_response(response).await?;
        Ok(())
    }

    async fn upsert_rows<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<(), StoreError> {
        tracing::debug!(table, count = rows.len(), "Upserting rows");
        let response = self
            .request(reqwest::Method::POST, &self.table_url(table)?)?
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .await?;

        check_response(response).await?;
        Ok(())
    }

    /// Returns the number of rows changed.
    async fn update_rows<T: Serialize, C: Column>(
        &self,
        table: &str,
        changes: &T,
        filters: &Filters<C>,
    ) -> Result<usize, StoreError> {
        // PostgREST happily updates every row when given no filter.
        if filters.is_unfiltered() {
            return Err(StoreError::Request("refusing unfiltered update".to_string()));
        }

        tracing::debug!(table, "Updating rows");
        let response = self
            .request(reqwest::Method::PATCH, &self.table_url(table)?)?
            .header("Prefer", "return=representation")
            .query(&filters.to_query())
            .json(changes)
            .send()
            .await?;

        let rows: Vec<serde_json::Value> = check_response(response).await?.json().await?;
        Ok(rows.len())
    }

    /// Returns the number of rows removed.
    async fn delete_rows<C: Column>(
        &self,
        table: &str,
        filters: &Filters<C>,
    ) -> Result<usize, StoreError> {
        if filters.is_unfiltered() {
            return Err(StoreError::Request("refusing unfiltered delete".to_string()));
        }

        tracing::debug!(table, "Deleting rows");
        let response = self
            .request(reqwest::Method::DELETE, &self.table_url(table)?)?
            .header("Prefer", "return=representation")
            .query(&filters.to_query())
            .send()
            .await?;

        let rows: Vec<serde_json::Value> = check_response(response).await?.json().await?;
        Ok(rows.len())
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status { status, body })
}

fn scoped(id: Uuid, owner: Uuid) -> Filters<RecordColumn> {
    Filters::new()
        .eq(RecordColumn::Id, id)
        .eq(RecordColumn::UserId, owner)
}

// ─── Personal Records ────────────────────────────────────────────

impl PersonalRecordsRepository for UserScopedDb {
    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<PersonalRecord>, StoreError> {
        let filters = Filters::new()
            .eq(RecordColumn::UserId, owner)
            .order_by(RecordColumn::DateAchieved, Direction::Descending);
        self.select(tables::PERSONAL_RECORDS, &filters).await
    }

    async fn insert(&self, record: &PersonalRecord) -> Result<(), StoreError> {
        self.insert_rows(tables::PERSONAL_RECORDS, std::slice::from_ref(record))
            .await
    }

    async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: &RecordUpdate,
    ) -> Result<(), StoreError> {
        let changed = self
            .update_rows(tables::PERSONAL_RECORDS, changes, &scoped(id, owner))
            .await?;
        if changed == 0 {
            return Err(StoreError::NoMatch);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), StoreError> {
        let removed = self
            .delete_rows(tables::PERSONAL_RECORDS, &scoped(id, owner))
            .await?;
        if removed == 0 {
            return Err(StoreError::NoMatch);
        }
        Ok(())
    }
}

// ─── Profiles ────────────────────────────────────────────────────

impl ProfilesRepository for UserScopedDb {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let filters = Filters::new().eq(ProfileColumn::Id, id);
        let rows: Vec<Profile> = self.select(tables::PROFILES, &filters).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.insert_rows(tables::PROFILES, std::slice::from_ref(profile))
            .await
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.upsert_rows(tables::PROFILES, std::slice::from_ref(profile))
            .await
    }
}

// ─── Object Storage ──────────────────────────────────────────────

#[derive(Serialize)]
struct CreateBucketRequest<'a> {
    id: &'a str,
    name: &'a str,
    public: bool,
    file_size_limit: usize,
}

impl BlobStorage for UserScopedDb {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<StoredObject, StoreError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.get_conn()?.base_url,
            bucket,
            urlencoding::encode(key)
        );

        tracing::debug!(bucket, key, size = bytes.len(), "Uploading object");
        let response = self
            .request(reqwest::Method::POST, &url)?
            .header(reqwest::header::CONTENT_TYPE, &options.content_type)
            .header(
                reqwest::header::CACHE_CONTROL,
                format!("max-age={}", options.cache_control_secs),
            )
            .header("x-upsert", options.upsert.to_string())
            .body(bytes)
            .send()
            .await?;

        check_response(response).await?;

        let public_url = self
            .public_url(bucket, key)
            .ok_or_else(|| StoreError::Decode("empty object key".to_string()))?;

        Ok(StoredObject {
            path: key.to_string(),
            public_url,
        })
    }

    async fn ensure_bucket(&self, bucket: &str, options: &BucketOptions) -> Result<(), StoreError> {
        let base_url = &self.get_conn()?.base_url;

        let response = self
            .request(
                reqwest::Method::GET,
                &format!("{}/storage/v1/bucket/{}", base_url, bucket),
            )?
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        tracing::info!(bucket, "Bucket missing, creating it");
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("{}/storage/v1/bucket", base_url),
            )?
            .json(&CreateBucketRequest {
                id: bucket,
                name: bucket,
                public: options.public,
                file_size_limit: options.file_size_limit,
            })
            .send()
            .await?;

        check_response(response).await?;
        tracing::info!(bucket, "Bucket created");
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> Option<String> {
        if path.is_empty() {
            return None;
        }
        let conn = self.conn.as_ref()?;
        Some(format!(
            "{}/storage/v1/object/public/{}/{}",
            conn.base_url,
            bucket,
            urlencoding::encode(path)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_for_object() {
        let db = SupabaseDb::new("https://example.supabase.co/", "anon").for_user("token");
        assert_eq!(
            db.public_url("avatars", "user-1.png").as_deref(),
            Some("https://example.supabase.co/storage/v1/object/public/avatars/user-1.png")
        );
        assert_eq!(db.public_url("avatars", ""), None);
    }

    #[tokio::test]
    async fn test_offline_client_errors() {
        let db = SupabaseDb::new_mock().for_user("token");

        let err = db.list_for_owner(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::Offline));

        let err = db.delete(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::Offline));

        assert_eq!(db.public_url("avatars", "user-1.png"), None);
    }
}
