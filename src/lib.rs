// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! PR Tracker: keep a list of personal-best running times.
//!
//! This crate provides the backend API that validates record entries,
//! keeps each user's record list in sync with the hosted backend, and
//! manages the user's profile and avatar.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::SupabaseDb;
use services::{AuthClient, ProfileService, SessionRegistry};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SupabaseDb,
    pub auth: AuthClient,
    pub sessions: SessionRegistry,
    pub profiles: ProfileService,
}

impl AppState {
    /// Wire up clients for the configured backend.
    pub fn new(config: Config) -> Self {
        let db = SupabaseDb::new(&config.supabase_url, &config.supabase_anon_key);
        let auth = AuthClient::new(&config.supabase_url, &config.supabase_anon_key);
        let profiles = ProfileService::new(config.avatar_bucket.clone());
        Self {
            config,
            db,
            auth,
            sessions: SessionRegistry::new(),
            profiles,
        }
    }
}
