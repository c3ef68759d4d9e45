//! Diesel table definitions for the Record Store.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` when a migration changes the table.

diesel::table! {
    /// Authoritative user records.
    ///
    /// `email` carries a unique index; violations surface as
    /// `AlreadyExists` through the repository error mapping.
    users (id) {
        /// Store-assigned positive identifier.
        id -> Int8,
        /// Unique contact address.
        email -> Varchar,
        /// Display name.
        name -> Varchar,
        /// Creation timestamp, assigned by the database.
        created_at -> Timestamptz,
    }
}
