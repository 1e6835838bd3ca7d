//! Open tracking: an append-only log of which user opened which link, and
//! the per-link "last opened" projection derived from it.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{browse::BrowsePage, store::LinkStore};

/// Outcome of [`record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedOpens {
  pub inserted: u64,
}

/// The most recent time a user opened a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastOpened {
  pub job_link_id:    Uuid,
  pub last_opened_at: DateTime<Utc>,
}

/// Append one open event per id. Repeated ids produce repeated events; ids
/// are not checked against stored links.
pub async fn record<S: LinkStore>(
  store: &S,
  user_id: Uuid,
  job_link_ids: &[Uuid],
) -> Result<RecordedOpens, S::Error> {
  if job_link_ids.is_empty() {
    return Ok(RecordedOpens { inserted: 0 });
  }
  let inserted = store.record_opens(user_id, job_link_ids.to_vec()).await?;
  debug!(%user_id, inserted, "recorded opens");
  Ok(RecordedOpens { inserted })
}

/// Latest open time per link for `user_id`.
///
/// Links the user never opened are left out rather than reported as null;
/// callers must read absence as "never opened".
pub async fn last_opened<S: LinkStore>(
  store: &S,
  user_id: Uuid,
  job_link_ids: &[Uuid],
) -> Result<Vec<LastOpened>, S::Error> {
  let mut seen = HashSet::new();
  let ids: Vec<Uuid> =
    job_link_ids.iter().copied().filter(|id| seen.insert(*id)).collect();
  if ids.is_empty() {
    return Ok(Vec::new());
  }
  store.last_opened(user_id, ids).await
}

/// Fill `last_opened_at` on every item of `page` for `viewer`.
pub async fn annotate<S: LinkStore>(
  store: &S,
  viewer: Uuid,
  page: &mut BrowsePage,
) -> Result<(), S::Error> {
  let ids: Vec<Uuid> = page.items.iter().map(|i| i.id).collect();
  let latest: HashMap<Uuid, DateTime<Utc>> = last_opened(store, viewer, &ids)
    .await?
    .into_iter()
    .map(|l| (l.job_link_id, l.last_opened_at))
    .collect();

  for item in &mut page.items {
    item.last_opened_at = latest.get(&item.id).copied();
  }
  Ok(())
}
