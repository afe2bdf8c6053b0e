// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Locally cached list of one user's personal records.
//!
//! The local list only changes after the backend has confirmed a call:
//! - `load` replaces it wholesale
//! - `create` inserts and then reloads, so the list reflects the stored rows
//! - `update` merges the confirmed fields into the matching entry
//! - `delete` drops the matching entry
//!
//! Any failure leaves the list exactly as it was. Nothing is retried.

use crate::db::PersonalRecordsRepository;
use crate::error::{AppError, Result};
use crate::models::{PersonalRecord, RecordPayload, RecordUpdate};
use crate::services::editor::{EditTarget, RecordEditor};
use uuid::Uuid;

/// Record list and edit form of a signed-in user.
#[derive(Debug)]
pub struct RecordCollection {
    owner: Uuid,
    records: Vec<PersonalRecord>,
    loaded: bool,
    editor: RecordEditor,
}

impl RecordCollection {
    pub fn new(owner: Uuid) -> Self {
        Self {
            owner,
            records: Vec::new(),
            loaded: false,
            editor: RecordEditor::new(),
        }
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn records(&self) -> &[PersonalRecord] {
        &self.records
    }

    /// Whether a `load` has succeeded at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn find(&self, id: Uuid) -> Option<&PersonalRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn editor(&self) -> &RecordEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut RecordEditor {
        &mut self.editor
    }

    /// Replace the local list with the owner's stored records.
    pub async fn load<R: PersonalRecordsRepository>(
        &mut self,
        repo: &R,
    ) -> Result<&[PersonalRecord]> {
        let records = repo
            .list_for_owner(self.owner)
            .await
            .map_err(AppError::Fetch)?;

        tracing::debug!(owner = %self.owner, count = records.len(), "Records loaded");
        self.records = records;
        self.loaded = true;
        Ok(&self.records)
    }

    /// Load only if nothing has been loaded yet.
    pub async fn ensure_loaded<R: PersonalRecordsRepository>(&mut self, repo: &R) -> Result<()> {
        if !self.loaded {
            self.load(repo).await?;
        }
        Ok(())
    }

    /// Store a new record, then refresh the list. Returns the new record's ID.
    ///
    /// A failed refresh is reported even though the record was stored.
    pub async fn create<R: PersonalRecordsRepository>(
        &mut self,
        repo: &R,
        payload: RecordPayload,
    ) -> Result<Uuid> {
        let id = self.insert(repo, payload).await?;
        self.load(repo).await?;
        Ok(id)
    }

    async fn insert<R: PersonalRecordsRepository>(
        &self,
        repo: &R,
        payload: RecordPayload,
    ) -> Result<Uuid> {
        let record = PersonalRecord::from_payload(self.owner, payload);
        repo.insert(&record).await.map_err(AppError::Write)?;

        tracing::info!(owner = %self.owner, record_id = %record.id, distance = %record.distance, "Record created");
        Ok(record.id)
    }

    /// Apply `changes` to the owner's record `id`.
    pub async fn update<R: PersonalRecordsRepository>(
        &mut self,
        repo: &R,
        id: Uuid,
        changes: &RecordUpdate,
    ) -> Result<()> {
        repo.update(id, self.owner, changes)
            .await
            .map_err(AppError::Write)?;

        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => changes.apply_to(record),
            None => tracing::debug!(record_id = %id, "Updated record not in local list"),
        }

        tracing::info!(owner = %self.owner, record_id = %id, "Record updated");
        Ok(())
    }

    /// Remove the owner's record `id`.
    pub async fn delete<R: PersonalRecordsRepository>(&mut self, repo: &R, id: Uuid) -> Result<()> {
        repo.delete(id, self.owner)
            .await
            .map_err(AppError::Write)?;

        self.records.retain(|r| r.id != id);
        tracing::info!(owner = %self.owner, record_id = %id, "Record deleted");
        Ok(())
    }

    /// Open the edit form on a record from the local list.
    pub fn begin_edit(&mut self, id: Uuid) -> Result<()> {
        let record = self
            .records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Record {}", id)))?;
        self.editor.begin_edit(record)?;
        Ok(())
    }

    /// Submit the open form to the backend. Returns the affected record's ID.
    ///
    /// Invalid input never reaches the backend. Once the backend has stored
    /// the submission the form is cleared, even if the list refresh after a
    /// create then fails. On a rejected write the form stays open with its
    /// values.
    pub async fn submit_edit<R: PersonalRecordsRepository>(&mut self, repo: &R) -> Result<Uuid> {
        let submission = self.editor.submit()?;

        let stored = match submission.target {
            EditTarget::New => self.insert(repo, submission.payload).await,
            EditTarget::Existing(id) => {
                let changes = RecordUpdate::from_payload(&submission.payload);
                self.update(repo, id, &changes).await.map(|()| id)
            }
        };

        let id = match stored {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(owner = %self.owner, error = %e, "Record submission failed");
                self.editor.submission_failed();
                return Err(e);
            }
        };

        self.editor.submission_succeeded();
        if submission.target == EditTarget::New {
            self.load(repo).await?;
        }
        Ok(id)
    }
}
