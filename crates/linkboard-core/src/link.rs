//! Job links — stored job-posting URLs with their tags and creator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tag::Tag;

/// A persisted job link. Immutable once created; tag associations are
/// append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLink {
  pub job_link_id: Uuid,
  /// Exact string as pasted (trimmed). No normalisation is applied, so
  /// `http://x` and `http://x/` are different links.
  pub url:         String,
  pub created_at:  DateTime<Utc>,
  /// Weak reference; becomes `None` if the creator is deleted.
  pub created_by:  Option<Uuid>,
  pub tags:        Vec<Tag>,
}

/// Input to [`crate::store::LinkStore::create_link_with_tags`].
/// `job_link_id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewJobLink {
  pub url:        String,
  pub created_by: Option<Uuid>,
  pub tags:       Vec<Tag>,
}

/// A job link as read back by the browse query, joined with its creator's
/// email and its tag names.
#[derive(Debug, Clone)]
pub struct LinkRecord {
  pub job_link_id:      Uuid,
  pub url:              String,
  pub created_at:       DateTime<Utc>,
  pub created_by:       Option<Uuid>,
  pub created_by_email: Option<String>,
  /// Sorted alphabetically by the store.
  pub tag_names:        Vec<String>,
}

/// The read model returned to browsing clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobLinkView {
  pub id:                    Uuid,
  pub url:                   String,
  pub created_at:            DateTime<Utc>,
  pub created_by_user_id:    Option<Uuid>,
  pub created_by_user_email: Option<String>,
  pub tags:                  Vec<String>,
  /// Only filled in for an authenticated viewer, see
  /// [`crate::open::annotate`].
  pub last_opened_at:        Option<DateTime<Utc>>,
}

impl From<LinkRecord> for JobLinkView {
  fn from(r: LinkRecord) -> Self {
    Self {
      id:                    r.job_link_id,
      url:                   r.url,
      created_at:            r.created_at,
      created_by_user_id:    r.created_by,
      created_by_user_email: r.created_by_email,
      tags:                  r.tag_names,
      last_opened_at:        None,
    }
  }
}
