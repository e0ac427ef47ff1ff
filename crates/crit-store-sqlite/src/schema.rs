//! SQL schema for the crit SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS reviews (
    review_id  TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL,
    kind       TEXT NOT NULL,   -- reviewable type, e.g. 'restaurant'
    uri        TEXT NOT NULL,   -- reviewable uri; (kind, uri) is the aggregate reference
    body       TEXT NOT NULL DEFAULT '',
    rating     INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    photos     TEXT NOT NULL DEFAULT '[]',  -- JSON list of PhotoEntry
    location   TEXT,                        -- JSON Location or NULL
    category   TEXT,
    created_at TEXT NOT NULL                -- ISO 8601 UTC; server-assigned
);

-- The aggregate rollup, keyed directly on the natural (kind, uri) key.
-- The counter columns are nullable: rows written before a counter existed
-- read as NULL and are COALESCEd to zero by the atomic update.
CREATE TABLE IF NOT EXISTS reviewables (
    kind              TEXT NOT NULL,
    uri               TEXT NOT NULL,
    created_by        TEXT NOT NULL,
    created_at        TEXT NOT NULL,
    status            TEXT NOT NULL DEFAULT 'active',
    number_of_reviews INTEGER NOT NULL DEFAULT 0,
    cumulative_rating INTEGER DEFAULT 0,
    one_star          INTEGER DEFAULT 0,
    two_star          INTEGER DEFAULT 0,
    three_star        INTEGER DEFAULT 0,
    four_star         INTEGER DEFAULT 0,
    five_star         INTEGER DEFAULT 0,
    photos            TEXT NOT NULL DEFAULT '[]',
    location          TEXT,
    categories        TEXT NOT NULL DEFAULT '[]',
    review_ids        TEXT NOT NULL DEFAULT '[]',
    PRIMARY KEY (kind, uri)
);

-- Owner profiles, maintained by an external service; read-only here apart
-- from the seeding helper.
CREATE TABLE IF NOT EXISTS profiles (
    user_id  TEXT PRIMARY KEY,
    name     TEXT,
    location TEXT,
    email    TEXT,
    phone    TEXT,
    photos   TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS reviews_user_idx   ON reviews(user_id);
CREATE INDEX IF NOT EXISTS reviews_target_idx ON reviews(kind, uri);
CREATE INDEX IF NOT EXISTS reviewables_kind_idx ON reviewables(kind);

PRAGMA user_version = 1;
";
