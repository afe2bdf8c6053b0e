// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use pr_tracker::config::Config;
use pr_tracker::db::repository::{BucketOptions, StoredObject, UploadOptions};
use pr_tracker::db::{BlobStorage, PersonalRecordsRepository, ProfilesRepository, SupabaseDb};
use pr_tracker::error::StoreError;
use pr_tracker::middleware::auth::Claims;
use pr_tracker::models::{PersonalRecord, Profile, RecordUpdate};
use pr_tracker::routes::create_router;
use pr_tracker::services::{AuthClient, ProfileService, SessionRegistry};
use pr_tracker::AppState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();
    create_test_app_with_config(config)
}

fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let profiles = ProfileService::new(config.avatar_bucket.clone());
    let state = Arc::new(AppState {
        config,
        db: SupabaseDb::new_mock(),
        auth: AuthClient::new_mock(),
        sessions: SessionRegistry::new(),
        profiles,
    });

    (create_router(state.clone()), state)
}

/// Mint an access token the way the identity provider does.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: Uuid, secret: &[u8]) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        aud: Some("authenticated".to_string()),
        email: Some("runner@example.com".to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}

fn injected() -> StoreError {
    StoreError::Status {
        status: 500,
        body: "injected failure".to_string(),
    }
}

/// In-memory stand-in for the hosted backend, with switchable failures.
#[allow(dead_code)]
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<PersonalRecord>>,
    profiles: Mutex<HashMap<Uuid, Profile>>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_uploads: AtomicBool,
    pub fail_buckets: AtomicBool,
    writes: Mutex<usize>,
}

#[allow(dead_code)]
impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_buckets(&self, fail: bool) {
        self.fail_buckets.store(fail, Ordering::SeqCst);
    }

    /// Number of write calls that reached the store (successful or not).
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    /// Rows as stored, bypassing the owner filter.
    pub fn stored_records(&self) -> Vec<PersonalRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn seed_record(&self, record: PersonalRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn stored_profile(&self, id: Uuid) -> Option<Profile> {
        self.profiles.lock().unwrap().get(&id).cloned()
    }

    pub fn object_keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    fn begin_write(&self) -> Result<(), StoreError> {
        *self.writes.lock().unwrap() += 1;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected());
        }
        Ok(())
    }
}

impl PersonalRecordsRepository for InMemoryStore {
    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<PersonalRecord>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected());
        }
        let mut records: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == owner)
            .cloned()
            .collect();
        // Newest first, undated last
        records.sort_by(|a, b| match (a.date_achieved, b.date_achieved) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(records)
    }

    async fn insert(&self, record: &PersonalRecord) -> Result<(), StoreError> {
        self.begin_write()?;
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: &RecordUpdate,
    ) -> Result<(), StoreError> {
        self.begin_write()?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id && r.user_id == owner)
            .ok_or(StoreError::NoMatch)?;
        changes.apply_to(record);
        Ok(())
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), StoreError> {
        self.begin_write()?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.id == id && r.user_id == owner));
        if records.len() == before {
            return Err(StoreError::NoMatch);
        }
        Ok(())
    }
}

impl ProfilesRepository for InMemoryStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected());
        }
        Ok(self.profiles.lock().unwrap().get(&id).cloned())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.begin_write()?;
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.id, profile.clone());
        Ok(())
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.begin_write()?;
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.id, profile.clone());
        Ok(())
    }
}

impl BlobStorage for InMemoryStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        _options: &UploadOptions,
    ) -> Result<StoredObject, StoreError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.objects
            .lock()
            .unwrap()
            .insert(format!("{bucket}/{key}"), bytes);
        Ok(StoredObject {
            path: key.to_string(),
            public_url: format!("memory://{bucket}/{key}"),
        })
    }

    async fn ensure_bucket(&self, _bucket: &str, _options: &BucketOptions) -> Result<(), StoreError> {
        if self.fail_buckets.load(Ordering::SeqCst) {
            return Err(injected());
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> Option<String> {
        (!path.is_empty()).then(|| format!("memory://{bucket}/{path}"))
    }
}
