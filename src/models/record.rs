// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Personal record model for storage and API.

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Distances offered by the add form, in display order.
pub const PRESET_DISTANCES: &[&str] = &[
    "5K",
    "10K",
    "Half Marathon",
    "Marathon",
    "1 Mile",
    "5 Mile",
    "10 Mile",
    "400m",
    "800m",
    "1500m",
    "3000m",
];

/// Distance selector value that switches the form to free-text entry.
pub const CUSTOM_DISTANCE: &str = "custom";

/// Largest value accepted for the minutes and seconds components.
pub const MAX_MINUTES_OR_SECONDS: u8 = 59;

/// A race duration as hours, minutes and seconds.
///
/// Minutes and seconds are always in `0..=59`; hours are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElapsedTime {
    pub hours: u32,
    pub minutes: u8,
    pub seconds: u8,
}

impl ElapsedTime {
    pub fn new(hours: u32, minutes: u8, seconds: u8) -> Result<Self, ValidationError> {
        if minutes > MAX_MINUTES_OR_SECONDS {
            return Err(ValidationError::OutOfRange {
                field: "minutes",
                value: minutes.to_string(),
            });
        }
        if seconds > MAX_MINUTES_OR_SECONDS {
            return Err(ValidationError::OutOfRange {
                field: "seconds",
                value: seconds.to_string(),
            });
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Stored row of the `personal_records` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalRecord {
    /// Client-generated record ID
    pub id: Uuid,
    /// Owner (auth user ID)
    pub user_id: Uuid,
    /// Preset label or custom text, e.g. "5K"
    pub distance: String,
    /// Time achieved (stored as hours/minutes/seconds columns)
    #[serde(flatten)]
    pub time: ElapsedTime,
    /// Race or place where the time was run
    pub race_location: Option<String>,
    /// Calendar date the time was run
    pub date_achieved: Option<NaiveDate>,
}

/// Normalized user-supplied fields of a record, as produced by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPayload {
    pub distance: String,
    pub time: ElapsedTime,
    pub race_location: Option<String>,
    pub date_achieved: Option<NaiveDate>,
}

impl PersonalRecord {
    /// Build a new row for `owner` with a freshly generated ID.
    pub fn from_payload(owner: Uuid, payload: RecordPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: owner,
            distance: payload.distance,
            time: payload.time,
            race_location: payload.race_location,
            date_achieved: payload.date_achieved,
        }
    }

    /// Whether the user-supplied fields equal `payload`.
    pub fn matches_payload(&self, payload: &RecordPayload) -> bool {
        self.distance == payload.distance
            && self.time == payload.time
            && self.race_location == payload.race_location
            && self.date_achieved == payload.date_achieved
    }
}

/// Partial update of a record. `None` fields are left untouched.
///
/// Distance is deliberately absent: it is fixed once a record exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u8>,
    /// `Some(None)` clears the column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race_location: Option<Option<String>>,
    /// `Some(None)` clears the column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_achieved: Option<Option<NaiveDate>>,
}

impl RecordUpdate {
    /// Every editable field taken from an edit-form payload.
    pub fn from_payload(payload: &RecordPayload) -> Self {
        Self {
            hours: Some(payload.time.hours),
            minutes: Some(payload.time.minutes),
            seconds: Some(payload.time.seconds),
            race_location: Some(payload.race_location.clone()),
            date_achieved: Some(payload.date_achieved),
        }
    }

    /// Merge the present fields into `record`.
    pub fn apply_to(&self, record: &mut PersonalRecord) {
        if let Some(hours) = self.hours {
            record.time.hours = hours;
        }
        if let Some(minutes) = self.minutes {
            record.time.minutes = minutes;
        }
        if let Some(seconds) = self.seconds {
            record.time.seconds = seconds;
        }
        if let Some(location) = &self.race_location {
            record.race_location = location.clone();
        }
        if let Some(date) = self.date_achieved {
            record.date_achieved = date;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PersonalRecord {
        PersonalRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            distance: "10K".to_string(),
            time: ElapsedTime::new(0, 45, 10).unwrap(),
            race_location: Some("Bay Breakers".to_string()),
            date_achieved: NaiveDate::from_ymd_opt(2024, 5, 19),
        }
    }

    #[test]
    fn test_elapsed_time_rejects_out_of_range_components() {
        assert!(ElapsedTime::new(3, 60, 0).is_err());
        assert!(ElapsedTime::new(3, 0, 60).is_err());
        assert!(ElapsedTime::new(100, 59, 59).is_ok());
    }

    #[test]
    fn test_elapsed_time_display_is_zero_padded() {
        let time = ElapsedTime::new(1, 5, 3).unwrap();
        assert_eq!(time.to_string(), "01:05:03");
        assert_eq!(ElapsedTime::default().to_string(), "00:00:00");
    }

    #[test]
    fn test_record_row_uses_column_names() {
        let record = sample_record();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["hours"], 0);
        assert_eq!(json["minutes"], 45);
        assert_eq!(json["seconds"], 10);
        assert_eq!(json["race_location"], "Bay Breakers");
        assert_eq!(json["date_achieved"], "2024-05-19");
        assert!(json.get("time").is_none());
    }

    #[test]
    fn test_record_row_parses_backend_response() {
        let json = serde_json::json!({
            "id": "6f1c1f06-5f2b-4f1e-9d7e-0f7ad6f0b6a1",
            "user_id": "0c9f54a4-64a5-4a59-9c3f-7cbb0a3b9c2d",
            "distance": "Marathon",
            "hours": 3,
            "minutes": 29,
            "seconds": 59,
            "race_location": null,
            "date_achieved": null,
            "created_at": "2024-01-01T00:00:00Z"
        });

        let record: PersonalRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.time.to_string(), "03:29:59");
        assert_eq!(record.race_location, None);
        assert_eq!(record.date_achieved, None);
    }

    #[test]
    fn test_update_serializes_only_present_fields() {
        let update = RecordUpdate {
            minutes: Some(44),
            race_location: Some(None),
            ..Default::default()
        };

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "minutes": 44, "race_location": null }));
    }

    #[test]
    fn test_update_apply_is_idempotent() {
        let mut record = sample_record();
        let update = RecordUpdate {
            seconds: Some(2),
            date_achieved: Some(None),
            ..Default::default()
        };

        update.apply_to(&mut record);
        let once = record.clone();
        update.apply_to(&mut record);

        assert_eq!(record, once);
        assert_eq!(record.time.seconds, 2);
        assert_eq!(record.date_achieved, None);
        assert_eq!(record.distance, "10K");
    }
}
