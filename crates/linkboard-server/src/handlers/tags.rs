//! Handler for `GET /tags` — every known tag, sorted by name.

use axum::{Json, extract::State};
use linkboard_core::{store::LinkStore, tag::Tag};

use crate::{AppState, error::Error};

/// `GET /tags`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<Tag>>, Error>
where
  S: LinkStore + Clone + Send + Sync + 'static,
{
  let tags = state.store.list_tags().await.map_err(Error::store)?;
  Ok(Json(tags))
}
