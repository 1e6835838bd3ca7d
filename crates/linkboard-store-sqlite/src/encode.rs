//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with exactly six fractional
//! digits, so string comparison (`ORDER BY`, `MAX`) agrees with time order.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use linkboard_core::{
  link::LinkRecord,
  open::LastOpened,
  tag::Tag,
  user::{User, UserCredentials},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Tag names ───────────────────────────────────────────────────────────────

/// Decode a `json_group_array` of tag names, sorted alphabetically.
pub fn decode_tag_names(s: &str) -> Result<Vec<String>> {
  let mut names: Vec<String> = serde_json::from_str(s)?;
  names.sort();
  Ok(names)
}

// ─── Placeholders ────────────────────────────────────────────────────────────

/// `?, ?, ?` for an `IN (...)` list of `n` values.
pub fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_credentials(self) -> Result<UserCredentials> {
    Ok(UserCredentials {
      user:          User {
        user_id:    decode_uuid(&self.user_id)?,
        email:      self.email,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }
}

/// Raw strings read directly from a `tags` row.
pub struct RawTag {
  pub tag_id: String,
  pub name:   String,
}

impl RawTag {
  pub fn into_tag(self) -> Result<Tag> {
    Ok(Tag { tag_id: decode_uuid(&self.tag_id)?, name: self.name })
  }
}

/// Raw strings read from a `job_links` row joined with its creator and an
/// aggregated array of tag names.
pub struct RawLink {
  pub job_link_id:      String,
  pub url:              String,
  pub created_at:       String,
  pub created_by:       Option<String>,
  pub created_by_email: Option<String>,
  pub tag_names:        String,
}

impl RawLink {
  pub fn into_record(self) -> Result<LinkRecord> {
    Ok(LinkRecord {
      job_link_id:      decode_uuid(&self.job_link_id)?,
      url:              self.url,
      created_at:       decode_dt(&self.created_at)?,
      created_by:       self.created_by.as_deref().map(decode_uuid).transpose()?,
      created_by_email: self.created_by_email,
      tag_names:        decode_tag_names(&self.tag_names)?,
    })
  }
}

/// Raw strings from the grouped `MAX(opened_at)` query.
pub struct RawLastOpened {
  pub job_link_id:    String,
  pub last_opened_at: String,
}

impl RawLastOpened {
  pub fn into_last_opened(self) -> Result<LastOpened> {
    Ok(LastOpened {
      job_link_id:    decode_uuid(&self.job_link_id)?,
      last_opened_at: decode_dt(&self.last_opened_at)?,
    })
  }
}
