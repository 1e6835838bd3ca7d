//! SQL schema for the Linkboard SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,     -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- Tags are created on first use and never renamed or deleted.
CREATE TABLE IF NOT EXISTS tags (
    tag_id TEXT PRIMARY KEY,
    name   TEXT NOT NULL UNIQUE      -- trimmed, case-sensitive
);

-- Job links are never updated or deleted.
CREATE TABLE IF NOT EXISTS job_links (
    job_link_id TEXT PRIMARY KEY,
    url         TEXT NOT NULL,
    created_at  TEXT NOT NULL,       -- fixed-width RFC 3339 UTC
    created_by  TEXT REFERENCES users(user_id) ON DELETE SET NULL
);

-- Settles concurrent ingestion of the same URL: the losing insert is a no-op.
CREATE UNIQUE INDEX IF NOT EXISTS job_links_url_idx ON job_links(url);
CREATE INDEX IF NOT EXISTS job_links_order_idx
    ON job_links(created_at DESC, job_link_id DESC);

CREATE TABLE IF NOT EXISTS job_link_tags (
    job_link_id TEXT NOT NULL REFERENCES job_links(job_link_id),
    tag_id      TEXT NOT NULL REFERENCES tags(tag_id),
    PRIMARY KEY (job_link_id, tag_id)
);

CREATE INDEX IF NOT EXISTS job_link_tags_tag_idx ON job_link_tags(tag_id);

-- Append-only event log. Ids are not validated against users or links.
CREATE TABLE IF NOT EXISTS open_events (
    open_event_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       TEXT NOT NULL,
    job_link_id   TEXT NOT NULL,
    opened_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS open_events_user_link_idx
    ON open_events(user_id, job_link_id, opened_at);

PRAGMA user_version = 1;
";
