//! Bulk ingestion of pasted job-posting URLs.
//!
//! A paste is split into lines and each line is trimmed. Blank lines are
//! reported, the rest are candidate URLs compared as exact strings: first
//! against each other, then against the store. Only URLs new on both counts
//! are written, each as its own atomic link-plus-tags insert.
//!
//! The existence check and the inserts are separate calls. Two concurrent
//! pastes of the same URL are settled by the store's unique constraint on
//! `url`: the loser's insert comes back as `None` and that URL is folded
//! into `duplicates_existing`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{Error, Result, link::NewJobLink, store::LinkStore, tag};

/// Most candidate URLs accepted in one paste.
pub const MAX_URLS_PER_PASTE: usize = 100;

// ─── Result ──────────────────────────────────────────────────────────────────

/// A link written by this ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedLink {
  pub id:   Uuid,
  pub url:  String,
  /// Resolved tag names, in the order they were requested.
  pub tags: Vec<String>,
}

/// Per-item account of what an ingestion did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionResult {
  pub created:             Vec<CreatedLink>,
  /// Each URL repeated within the paste, listed once however many extra
  /// copies there were.
  pub duplicates_in_paste: Vec<String>,
  /// URLs that were already stored, in paste order.
  pub duplicates_existing: Vec<String>,
  /// One empty entry per blank line, or a single diagnostic when the paste
  /// was rejected outright.
  pub invalid_or_empty:    Vec<String>,
}

impl IngestionResult {
  fn rejected(reason: &Error) -> Self {
    Self { invalid_or_empty: vec![reason.to_string()], ..Self::default() }
  }
}

// ─── Planning ────────────────────────────────────────────────────────────────

/// The store-independent part of an ingestion: line splitting, the size cap,
/// and intra-paste deduplication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestPlan {
  /// First occurrence of every candidate URL, in paste order.
  pub unique:              Vec<String>,
  pub duplicates_in_paste: Vec<String>,
  pub blank_lines:         usize,
}

impl IngestPlan {
  /// Plan an ingestion of `raw_text`.
  ///
  /// Fails with [`Error::TooManyUrls`] when more than
  /// [`MAX_URLS_PER_PASTE`] non-blank lines are present.
  pub fn from_text(raw_text: &str) -> Result<Self> {
    let lines: Vec<&str> = if raw_text.is_empty() {
      Vec::new()
    } else {
      // `\r\n` endings leave a trailing `\r`, which the trim removes.
      raw_text.split('\n').map(str::trim).collect()
    };

    let blank_lines = lines.iter().filter(|l| l.is_empty()).count();
    let candidates: Vec<&str> =
      lines.into_iter().filter(|l| !l.is_empty()).collect();

    if candidates.len() > MAX_URLS_PER_PASTE {
      return Err(Error::TooManyUrls {
        count: candidates.len(),
        max:   MAX_URLS_PER_PASTE,
      });
    }

    let mut seen = HashSet::new();
    let mut repeated = HashSet::new();
    let mut plan = Self { blank_lines, ..Self::default() };

    for url in candidates {
      if seen.insert(url) {
        plan.unique.push(url.to_owned());
      } else if repeated.insert(url) {
        plan.duplicates_in_paste.push(url.to_owned());
      }
    }

    Ok(plan)
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Ingest a paste of URLs on behalf of `actor`, tagging every new link with
/// `tag_names`.
///
/// A paste over the cap is answered with a single diagnostic and no writes
/// at all. Links created before a store failure stay created; the error is
/// returned and nothing is rolled back.
pub async fn ingest<S: LinkStore>(
  store: &S,
  actor: Uuid,
  raw_text: &str,
  tag_names: &[String],
) -> Result<IngestionResult, S::Error> {
  let plan = match IngestPlan::from_text(raw_text) {
    Ok(plan) => plan,
    Err(e) => {
      warn!(%actor, error = %e, "rejecting paste");
      return Ok(IngestionResult::rejected(&e));
    }
  };

  let mut existing = if plan.unique.is_empty() {
    HashSet::new()
  } else {
    store.find_existing_urls(plan.unique.clone()).await?
  };

  let tags = tag::resolve(store, tag_names).await?;
  let resolved_names: Vec<String> = tags.iter().map(|t| t.name.clone()).collect();

  let to_create: Vec<String> = plan
    .unique
    .iter()
    .filter(|u| !existing.contains(*u))
    .cloned()
    .collect();

  let mut created = Vec::with_capacity(to_create.len());
  for url in to_create {
    let input = NewJobLink {
      url:        url.clone(),
      created_by: Some(actor),
      tags:       tags.clone(),
    };
    match store.create_link_with_tags(input).await {
      Ok(Some(link)) => created.push(CreatedLink {
        id:   link.job_link_id,
        url:  link.url,
        tags: resolved_names.clone(),
      }),
      Ok(None) => {
        debug!(%url, "url stored concurrently, counting as existing");
        existing.insert(url);
      }
      Err(e) => {
        warn!(%actor, created = created.len(), error = %e, "ingestion aborted");
        return Err(e);
      }
    }
  }

  let duplicates_existing: Vec<String> = plan
    .unique
    .iter()
    .filter(|u| existing.contains(*u))
    .cloned()
    .collect();

  info!(
    %actor,
    created = created.len(),
    duplicates_in_paste = plan.duplicates_in_paste.len(),
    duplicates_existing = duplicates_existing.len(),
    blank = plan.blank_lines,
    "ingested paste"
  );

  Ok(IngestionResult {
    created,
    duplicates_in_paste: plan.duplicates_in_paste,
    duplicates_existing,
    invalid_or_empty: vec![String::new(); plan.blank_lines],
  })
}
