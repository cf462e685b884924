//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.

diesel::table! {
    /// Authoritative domain classification table.
    ///
    /// One row per domain; the unique index on `domain` guarantees a domain
    /// is never simultaneously disposable and allowlisted.
    domain_lists (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique, lowercased domain key.
        domain -> Varchar,
        /// Classification tag: `disposable` or `allowlist`.
        list -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit log of classification dispositions.
    audit_logs (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Normalized email address that was checked.
        email -> Varchar,
        /// Extracted domain.
        domain -> Varchar,
        /// Source IP reported by the transport, when available.
        ip -> Nullable<Varchar>,
        /// Disposition tag, e.g. `blocked_disposable_db`.
        action -> Varchar,
        /// When the entry was recorded.
        recorded_at -> Timestamptz,
    }
}
