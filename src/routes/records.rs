// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Personal record routes.
//!
//! Each request drives the signed-in user's record editor through one full
//! add or edit cycle. If the cycle fails part way the editor is cancelled,
//! so the next request always starts from an idle form.

use crate::db::UserScopedDb;
use crate::error::{AppError, Result, ValidationError};
use crate::middleware::auth::AuthUser;
use crate::models::record::{CUSTOM_DISTANCE, PRESET_DISTANCES};
use crate::models::PersonalRecord;
use crate::services::editor::{RecordEditor, RecordField};
use crate::services::RecordCollection;
use crate::time_utils::{display_date, format_date, DATE_FORMAT};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/distances", get(list_distances))
        .route("/api/records", get(list_records).post(create_record))
        .route("/api/records/{id}", put(update_record).delete(delete_record))
}

/// Raw form fields, as typed by the user. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct RecordFormRequest {
    pub distance: Option<String>,
    pub custom_distance: Option<String>,
    pub hours: Option<String>,
    pub minutes: Option<String>,
    pub seconds: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
}

impl RecordFormRequest {
    fn fields(&self) -> impl Iterator<Item = (RecordField, &str)> {
        [
            (RecordField::Distance, &self.distance),
            (RecordField::CustomDistance, &self.custom_distance),
            (RecordField::Hours, &self.hours),
            (RecordField::Minutes, &self.minutes),
            (RecordField::Seconds, &self.seconds),
            (RecordField::Location, &self.location),
            (RecordField::Date, &self.date),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
    }

    /// Feed the fields into the open form.
    ///
    /// An unchanged distance is accepted on edit so clients can send the
    /// whole record back.
    fn apply(&self, editor: &mut RecordEditor) -> std::result::Result<(), ValidationError> {
        for (field, value) in self.fields() {
            let unchanged_distance = matches!(field, RecordField::Distance)
                && !editor.form().is_custom_distance
                && editor.form().distance == value;
            if unchanged_distance {
                continue;
            }
            editor.set_field(field, value)?;
        }
        Ok(())
    }

    /// Check the time and date fields, which need no stored record.
    fn precheck(&self) -> std::result::Result<(), ValidationError> {
        let mut scratch = RecordEditor::new();
        scratch.begin_add()?;
        for (field, value) in self.fields() {
            if matches!(
                field,
                RecordField::Hours | RecordField::Minutes | RecordField::Seconds
            ) {
                scratch.set_field(field, value)?;
            }
        }

        if let Some(date) = self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            NaiveDate::parse_from_str(date, DATE_FORMAT)
                .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;
        }
        Ok(())
    }
}

/// Distance choices offered by the record form.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DistancesResponse {
    pub presets: Vec<String>,
    /// Selector value that switches the form to a free-text distance
    pub custom: String,
}

async fn list_distances() -> Json<DistancesResponse> {
    Json(DistancesResponse {
        presets: PRESET_DISTANCES.iter().map(|d| d.to_string()).collect(),
        custom: CUSTOM_DISTANCE.to_string(),
    })
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecordResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub id: Uuid,
    pub distance: String,
    pub hours: u32,
    pub minutes: u8,
    pub seconds: u8,
    /// `HH:MM:SS`
    pub time: String,
    pub race_location: Option<String>,
    /// `YYYY-MM-DD`
    pub date_achieved: Option<String>,
    pub date_display: Option<String>,
}

impl From<&PersonalRecord> for RecordResponse {
    fn from(record: &PersonalRecord) -> Self {
        Self {
            id: record.id,
            distance: record.distance.clone(),
            hours: record.time.hours,
            minutes: record.time.minutes,
            seconds: record.time.seconds,
            time: record.time.to_string(),
            race_location: record.race_location.clone(),
            date_achieved: record.date_achieved.map(format_date),
            date_display: record.date_achieved.map(display_date),
        }
    }
}

fn to_responses(records: &[PersonalRecord]) -> Vec<RecordResponse> {
    records.iter().map(RecordResponse::from).collect()
}

/// List the user's records, newest first.
async fn list_records(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<RecordResponse>>> {
    let session = state.sessions.open(user.user_id, user.expires_at);
    let mut collection = session.lock().await;
    let repo = state.db.for_user(&user.access_token);

    let records = collection.load(&repo).await?;
    Ok(Json(to_responses(records)))
}

async fn add_record(
    collection: &mut RecordCollection,
    repo: &UserScopedDb,
    req: &RecordFormRequest,
) -> Result<Uuid> {
    collection.editor_mut().begin_add()?;
    req.apply(collection.editor_mut())?;
    collection.submit_edit(repo).await
}

/// Add a record. Responds with the reloaded list.
async fn create_record(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<RecordFormRequest>,
) -> Result<(StatusCode, Json<Vec<RecordResponse>>)> {
    let session = state.sessions.open(user.user_id, user.expires_at);
    let mut collection = session.lock().await;
    let repo = state.db.for_user(&user.access_token);

    if let Err(e) = add_record(&mut collection, &repo, &req).await {
        collection.editor_mut().cancel();
        return Err(e);
    }

    Ok((StatusCode::CREATED, Json(to_responses(collection.records()))))
}

async fn edit_record(
    collection: &mut RecordCollection,
    repo: &UserScopedDb,
    id: Uuid,
    req: &RecordFormRequest,
) -> Result<Uuid> {
    req.precheck()?;
    collection.ensure_loaded(repo).await?;
    collection.begin_edit(id)?;
    req.apply(collection.editor_mut())?;
    collection.submit_edit(repo).await
}

/// Change time, location or date of an existing record.
async fn update_record(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecordFormRequest>,
) -> Result<Json<RecordResponse>> {
    let session = state.sessions.open(user.user_id, user.expires_at);
    let mut collection = session.lock().await;
    let repo = state.db.for_user(&user.access_token);

    if let Err(e) = edit_record(&mut collection, &repo, id, &req).await {
        collection.editor_mut().cancel();
        return Err(e);
    }

    let record = collection
        .find(id)
        .ok_or_else(|| AppError::NotFound(format!("Record {}", id)))?;
    Ok(Json(RecordResponse::from(record)))
}

async fn delete_record(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let session = state.sessions.open(user.user_id, user.expires_at);
    let mut collection = session.lock().await;
    let repo = state.db.for_user(&user.access_token);

    collection.delete(&repo, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_follow_form_order_and_skip_absent() {
        let req = RecordFormRequest {
            seconds: Some("5".to_string()),
            distance: Some("10K".to_string()),
            date: Some("2025-04-01".to_string()),
            ..Default::default()
        };

        let fields: Vec<_> = req.fields().map(|(f, _)| f).collect();
        assert_eq!(
            fields,
            vec![RecordField::Distance, RecordField::Seconds, RecordField::Date]
        );
    }

    #[test]
    fn test_precheck_rejects_bad_time_and_date() {
        let minutes = RecordFormRequest {
            minutes: Some("75".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            minutes.precheck(),
            Err(ValidationError::OutOfRange { field: "minutes", .. })
        ));

        let date = RecordFormRequest {
            date: Some("2025/04/01".to_string()),
            ..Default::default()
        };
        assert!(matches!(date.precheck(), Err(ValidationError::InvalidDate(_))));

        let fine = RecordFormRequest {
            distance: Some("5K".to_string()),
            minutes: Some("59".to_string()),
            date: Some("".to_string()),
            ..Default::default()
        };
        assert!(fine.precheck().is_ok());
    }

    #[test]
    fn test_apply_reports_first_bad_field() {
        let mut editor = RecordEditor::new();
        editor.begin_add().unwrap();

        let req = RecordFormRequest {
            distance: Some("5K".to_string()),
            minutes: Some("75".to_string()),
            ..Default::default()
        };

        let err = req.apply(&mut editor).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "minutes", .. }));
        assert_eq!(editor.form().distance, "5K");
    }
}
