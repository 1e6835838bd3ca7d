//! The `LinkStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `linkboard-store-sqlite`). The engines in this crate and the HTTP layer
//! depend on this abstraction, not on any concrete backend.

use std::{collections::HashSet, future::Future};

use uuid::Uuid;

use crate::{
  link::{JobLink, LinkRecord, NewJobLink},
  open::LastOpened,
  tag::Tag,
  user::{User, UserCredentials},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`LinkStore::list_links`].
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
  /// A link qualifies only if it carries every one of these tag names.
  /// Empty means no filter. Names are expected to be distinct.
  pub tag_names: Vec<String>,
  pub offset:    u64,
  pub limit:     u64,
}

/// One page of links plus the size of the whole qualifying set, both read
/// from the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct LinkPage {
  pub total_count: u64,
  pub links:       Vec<LinkRecord>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Linkboard storage backend.
///
/// Job links and open events are append-only. Tags are created lazily and
/// never removed.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait LinkStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register a user. Returns `Ok(None)` if the email is already in use.
  fn create_user(
    &self,
    email: String,
    password_hash: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user and their password hash by exact email.
  fn find_user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<UserCredentials>, Self::Error>> + Send + '_;

  // ── Tags ──────────────────────────────────────────────────────────────

  /// Insert a tag if no tag with this exact name exists, and return the
  /// stored row either way.
  fn upsert_tag(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Tag, Self::Error>> + Send + '_;

  /// All tags, ordered by name.
  fn list_tags(
    &self,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  // ── Links ─────────────────────────────────────────────────────────────

  /// Return the subset of `urls` already stored as a job link's URL.
  fn find_existing_urls(
    &self,
    urls: Vec<String>,
  ) -> impl Future<Output = Result<HashSet<String>, Self::Error>> + Send + '_;

  /// Persist a job link and all of its tag associations atomically.
  ///
  /// Returns `Ok(None)` when the URL collides with an existing link; the
  /// caller treats that as an already-existing duplicate.
  fn create_link_with_tags(
    &self,
    input: NewJobLink,
  ) -> impl Future<Output = Result<Option<JobLink>, Self::Error>> + Send + '_;

  /// Count and fetch one page of links matching `filter`, newest first,
  /// inside a single read transaction.
  fn list_links(
    &self,
    filter: LinkFilter,
  ) -> impl Future<Output = Result<LinkPage, Self::Error>> + Send + '_;

  // ── Opens ─────────────────────────────────────────────────────────────

  /// Append one open event per id (repeats included), all stamped with the
  /// same store-assigned time. Returns the number of rows written.
  fn record_opens(
    &self,
    user_id: Uuid,
    job_link_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// For each id with at least one open by `user_id`, the latest open time.
  /// Ids never opened are absent from the result.
  fn last_opened(
    &self,
    user_id: Uuid,
    job_link_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<Vec<LastOpened>, Self::Error>> + Send + '_;
}
