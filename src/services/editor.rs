// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Add/edit form state for a single personal record.
//!
//! The editor coerces raw form input into valid field values and packages a
//! [`Submission`] for the record collection. It never talks to storage.
//!
//! ```text
//! Idle ──begin_add/begin_edit──▶ Editing ──submit──▶ Submitting
//!  ▲                               │  ▲                  │
//!  └──────────cancel───────────────┘  └────failed────────┤
//!  ▲                                                     │
//!  └────────────────────succeeded────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::models::record::{CUSTOM_DISTANCE, MAX_MINUTES_OR_SECONDS};
use crate::models::{ElapsedTime, PersonalRecord, RecordPayload};
use crate::time_utils::{format_date, DATE_FORMAT};
use chrono::NaiveDate;
use std::str::FromStr;
use uuid::Uuid;

/// A form field of the record editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    /// Preset selector; the value `"custom"` switches to free text
    Distance,
    /// Free-text distance
    CustomDistance,
    Hours,
    Minutes,
    Seconds,
    Location,
    Date,
}

impl RecordField {
    pub fn name(self) -> &'static str {
        match self {
            RecordField::Distance => "distance",
            RecordField::CustomDistance => "custom_distance",
            RecordField::Hours => "hours",
            RecordField::Minutes => "minutes",
            RecordField::Seconds => "seconds",
            RecordField::Location => "location",
            RecordField::Date => "date",
        }
    }
}

impl FromStr for RecordField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distance" => Ok(RecordField::Distance),
            "custom_distance" => Ok(RecordField::CustomDistance),
            "hours" => Ok(RecordField::Hours),
            "minutes" => Ok(RecordField::Minutes),
            "seconds" => Ok(RecordField::Seconds),
            "location" => Ok(RecordField::Location),
            "date" => Ok(RecordField::Date),
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }
}

/// Which record the form is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    New,
    Existing(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Editing(EditTarget),
    Submitting(EditTarget),
}

/// Raw form values, exactly as the user last successfully entered them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordForm {
    pub distance: String,
    pub custom_distance: String,
    pub is_custom_distance: bool,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
    pub location: String,
    pub date: String,
}

impl RecordForm {
    fn from_record(record: &PersonalRecord) -> Self {
        Self {
            distance: record.distance.clone(),
            custom_distance: String::new(),
            is_custom_distance: false,
            hours: record.time.hours.to_string(),
            minutes: record.time.minutes.to_string(),
            seconds: record.time.seconds.to_string(),
            location: record.race_location.clone().unwrap_or_default(),
            date: record
                .date_achieved
                .map(format_date)
                .unwrap_or_default(),
        }
    }

    /// The distance the form would submit.
    pub fn effective_distance(&self) -> &str {
        if self.is_custom_distance {
            &self.custom_distance
        } else {
            &self.distance
        }
    }

    /// Current time rendered as `HH:MM:SS`.
    pub fn time_display(&self) -> String {
        format_for_display(&self.hours, &self.minutes, &self.seconds)
    }
}

/// A validated form, ready for the record collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub target: EditTarget,
    pub payload: RecordPayload,
}

/// Edit controller for one record at a time.
#[derive(Debug, Clone)]
pub struct RecordEditor {
    state: EditorState,
    form: RecordForm,
}

impl Default for RecordEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordEditor {
    pub fn new() -> Self {
        Self {
            state: EditorState::Idle,
            form: RecordForm::default(),
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn form(&self) -> &RecordForm {
        &self.form
    }

    pub fn is_idle(&self) -> bool {
        self.state == EditorState::Idle
    }

    /// Open an empty form for a new record.
    pub fn begin_add(&mut self) -> Result<(), ValidationError> {
        self.ensure_idle()?;
        self.form = RecordForm::default();
        self.state = EditorState::Editing(EditTarget::New);
        Ok(())
    }

    /// Open the form pre-filled with `record`.
    pub fn begin_edit(&mut self, record: &PersonalRecord) -> Result<(), ValidationError> {
        self.ensure_idle()?;
        self.form = RecordForm::from_record(record);
        self.state = EditorState::Editing(EditTarget::Existing(record.id));
        Ok(())
    }

    /// Abandon the current form.
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn ensure_idle(&self) -> Result<(), ValidationError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(ValidationError::EditInProgress)
        }
    }

    fn editing_target(&self) -> Result<EditTarget, ValidationError> {
        match self.state {
            EditorState::Editing(target) => Ok(target),
            _ => Err(ValidationError::NotEditing),
        }
    }

    fn reset(&mut self) {
        self.state = EditorState::Idle;
        self.form = RecordForm::default();
    }

    /// Update one field from raw input.
    ///
    /// On `Err` the field keeps its previous value.
    pub fn set_field(&mut self, field: RecordField, raw: &str) -> Result<(), ValidationError> {
        let target = self.editing_target()?;

        match field {
            RecordField::Distance | RecordField::CustomDistance
                if target != EditTarget::New =>
            {
                Err(ValidationError::DistanceLocked)
            }
            RecordField::Distance => {
                if raw == CUSTOM_DISTANCE {
                    self.form.is_custom_distance = true;
                    self.form.distance.clear();
                } else {
                    self.form.is_custom_distance = false;
                    self.form.distance = raw.to_string();
                }
                Ok(())
            }
            RecordField::CustomDistance => {
                self.form.is_custom_distance = true;
                self.form.distance.clear();
                self.form.custom_distance = raw.to_string();
                Ok(())
            }
            RecordField::Hours => {
                self.form.hours = digits_only(raw);
                Ok(())
            }
            RecordField::Minutes => {
                self.form.minutes = clock_component("minutes", raw)?;
                Ok(())
            }
            RecordField::Seconds => {
                self.form.seconds = clock_component("seconds", raw)?;
                Ok(())
            }
            RecordField::Location => {
                self.form.location = raw.to_string();
                Ok(())
            }
            RecordField::Date => {
                self.form.date = raw.to_string();
                Ok(())
            }
        }
    }

    /// Normalize the form into record fields.
    pub fn to_persistable_payload(&self) -> Result<RecordPayload, ValidationError> {
        let distance = self.form.effective_distance().trim();
        if distance.is_empty() {
            return Err(ValidationError::MissingDistance);
        }

        let hours = parse_component("hours", &self.form.hours)?;
        let minutes = parse_component("minutes", &self.form.minutes)?;
        let seconds = parse_component("seconds", &self.form.seconds)?;
        let time = ElapsedTime::new(
            hours,
            narrow("minutes", minutes)?,
            narrow("seconds", seconds)?,
        )?;

        let location = self.form.location.trim();
        let race_location = (!location.is_empty()).then(|| location.to_string());

        let date = self.form.date.trim();
        let date_achieved = if date.is_empty() {
            None
        } else {
            Some(
                NaiveDate::parse_from_str(date, DATE_FORMAT)
                    .map_err(|_| ValidationError::InvalidDate(date.to_string()))?,
            )
        };

        Ok(RecordPayload {
            distance: distance.to_string(),
            time,
            race_location,
            date_achieved,
        })
    }

    /// Validate and hand off the form. The editor stays in `Submitting`
    /// until [`Self::submission_succeeded`] or [`Self::submission_failed`].
    ///
    /// A validation failure leaves the editor in `Editing`.
    pub fn submit(&mut self) -> Result<Submission, ValidationError> {
        let target = self.editing_target()?;
        let payload = self.to_persistable_payload()?;
        self.state = EditorState::Submitting(target);
        Ok(Submission { target, payload })
    }

    /// The store confirmed the submission: clear the form.
    pub fn submission_succeeded(&mut self) {
        if let EditorState::Submitting(_) = self.state {
            self.reset();
        }
    }

    /// The store rejected the submission: back to editing, values kept.
    pub fn submission_failed(&mut self) {
        if let EditorState::Submitting(target) = self.state {
            self.state = EditorState::Editing(target);
        }
    }
}

/// Render raw time components as `HH:MM:SS`, treating missing ones as zero.
pub fn format_for_display(hours: &str, minutes: &str, seconds: &str) -> String {
    format!(
        "{}:{}:{}",
        pad_component(hours),
        pad_component(minutes),
        pad_component(seconds)
    )
}

fn pad_component(raw: &str) -> String {
    let digits = digits_only(raw);
    format!("{:0>2}", digits.trim_start_matches('0'))
}

fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Digits of `raw` if they form a valid minutes/seconds value (or nothing).
fn clock_component(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return Ok(digits);
    }
    match digits.parse::<u32>() {
        Ok(value) if value <= u32::from(MAX_MINUTES_OR_SECONDS) => Ok(digits),
        _ => Err(ValidationError::OutOfRange {
            field,
            value: raw.to_string(),
        }),
    }
}

fn parse_component(field: &'static str, digits: &str) -> Result<u32, ValidationError> {
    if digits.is_empty() {
        return Ok(0);
    }
    digits.parse().map_err(|_| ValidationError::OutOfRange {
        field,
        value: digits.to_string(),
    })
}

fn narrow(field: &'static str, value: u32) -> Result<u8, ValidationError> {
    u8::try_from(value).map_err(|_| ValidationError::OutOfRange {
        field,
        value: value.to_string(),
    })
}
