// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod profile;
pub mod record;

pub use profile::Profile;
pub use record::{ElapsedTime, PersonalRecord, RecordPayload, RecordUpdate};
