//! Tags and the tag resolver.
//!
//! A tag moves from absent to present on first use and never changes after
//! that: no rename, no delete. Names are matched exactly after trimming, so
//! `Remote` and `remote` are different tags.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::LinkStore;

/// A named label attachable to many job links.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
  #[serde(rename = "id")]
  pub tag_id: Uuid,
  pub name:   String,
}

/// Trim each name, drop blanks, and collapse repeats while keeping the first
/// occurrence's position.
pub fn normalize_names(names: &[String]) -> Vec<String> {
  let mut seen = HashSet::new();
  names
    .iter()
    .map(|n| n.trim())
    .filter(|n| !n.is_empty())
    .filter(|n| seen.insert(*n))
    .map(str::to_owned)
    .collect()
}

/// Map tag names to stored tags, creating the missing ones.
///
/// The output follows the order of [`normalize_names`]. Concurrent callers
/// converge on one tag per name because the store's upsert returns the
/// existing row on conflict.
pub async fn resolve<S: LinkStore>(
  store: &S,
  names: &[String],
) -> Result<Vec<Tag>, S::Error> {
  let names = normalize_names(names);
  let mut tags = Vec::with_capacity(names.len());
  for name in names {
    tags.push(store.upsert_tag(name).await?);
  }
  Ok(tags)
}
