// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod editor;
pub mod profile;
pub mod records;
pub mod session;

pub use auth::{AuthClient, Session, SignUp};
pub use editor::{format_for_display, EditTarget, EditorState, RecordEditor, RecordField};
pub use profile::{AvatarFile, ProfileForm, ProfileService, SavedProfile};
pub use records::RecordCollection;
pub use session::{SessionHandle, SessionRegistry};
