//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// OAuth credentials (keyed by athlete_id)
    pub const CREDENTIALS: &str = "credentials";
}
