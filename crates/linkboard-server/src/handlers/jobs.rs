//! Handlers for `/jobs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/jobs/bulk` | Auth required. Body: [`BulkBody`]; returns an [`IngestionResult`] |
//! | `GET`  | `/jobs` | `?tag=a&tag=b&page=N&pageSize=M`; auth optional |
//!
//! When a valid token accompanies `GET /jobs`, each item's `lastOpenedAt` is
//! filled in for that viewer.

use axum::{
  Json,
  extract::{Query, State},
};
use linkboard_core::{
  browse::{self, BrowsePage, BrowseQuery},
  ingest::{self, IngestionResult},
  open,
  store::LinkStore,
};
use serde::Deserialize;

use crate::{AppState, auth::Actor, error::Error, handlers::JsonBody};

// ─── Bulk ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkBody {
  /// Newline-separated URLs, as pasted.
  #[serde(default)]
  pub urls_text: String,
  #[serde(default)]
  pub tags:      Vec<String>,
}

/// `POST /jobs/bulk`
pub async fn bulk<S>(
  State(state): State<AppState<S>>,
  actor: Actor,
  JsonBody(body): JsonBody<BulkBody>,
) -> Result<Json<IngestionResult>, Error>
where
  S: LinkStore + Clone + Send + Sync + 'static,
{
  let result = ingest::ingest(&*state.store, actor.user_id, &body.urls_text, &body.tags)
    .await
    .map_err(Error::store)?;
  Ok(Json(result))
}

// ─── Browse ───────────────────────────────────────────────────────────────────

/// Build a [`BrowseQuery`] from raw query pairs.
///
/// `tag` may repeat; `tags` takes a comma-separated list. Paging values that
/// don't parse as integers are treated as absent.
pub fn browse_query(pairs: Vec<(String, String)>) -> BrowseQuery {
  let mut query = BrowseQuery::default();
  for (key, value) in pairs {
    match key.as_str() {
      "tag" => query.tag_names.push(value),
      "tags" => query.tag_names.extend(value.split(',').map(str::to_owned)),
      "page" => query.page = value.trim().parse().ok(),
      "pageSize" => query.page_size = value.trim().parse().ok(),
      _ => {}
    }
  }
  query
}

/// `GET /jobs`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  viewer: Option<Actor>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<BrowsePage>, Error>
where
  S: LinkStore + Clone + Send + Sync + 'static,
{
  let mut page = browse::browse(&*state.store, browse_query(pairs))
    .await
    .map_err(Error::store)?;

  if let Some(viewer) = viewer {
    open::annotate(&*state.store, viewer.user_id, &mut page)
      .await
      .map_err(Error::store)?;
  }

  Ok(Json(page))
}
