//! Database layer (hosted PostgREST tables and object storage).

pub mod query;
pub mod repository;
pub mod supabase;

pub use repository::{BlobStorage, PersonalRecordsRepository, ProfilesRepository};
pub use supabase::{SupabaseDb, UserScopedDb};

/// Table names as constants.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const PERSONAL_RECORDS: &str = "personal_records";
}
