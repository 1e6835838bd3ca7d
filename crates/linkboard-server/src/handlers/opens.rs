//! Handlers for `/opens` endpoints. Both require authentication and act on
//! the caller's own open history.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/opens` | Body: [`OpensBody`]; returns `{"inserted": n}` |
//! | `POST` | `/opens/last` | Body: [`OpensBody`]; returns `[{"jobLinkId", "lastOpenedAt"}]` for opened links only |

use axum::{Json, extract::State};
use linkboard_core::{
  open::{self, LastOpened, RecordedOpens},
  store::LinkStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Actor, error::Error, handlers::JsonBody};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpensBody {
  #[serde(default)]
  pub job_link_ids: Vec<Uuid>,
}

/// `POST /opens`
pub async fn record<S>(
  State(state): State<AppState<S>>,
  actor: Actor,
  JsonBody(body): JsonBody<OpensBody>,
) -> Result<Json<RecordedOpens>, Error>
where
  S: LinkStore + Clone + Send + Sync + 'static,
{
  let recorded = open::record(&*state.store, actor.user_id, &body.job_link_ids)
    .await
    .map_err(Error::store)?;
  Ok(Json(recorded))
}

/// `POST /opens/last`
pub async fn last<S>(
  State(state): State<AppState<S>>,
  actor: Actor,
  JsonBody(body): JsonBody<OpensBody>,
) -> Result<Json<Vec<LastOpened>>, Error>
where
  S: LinkStore + Clone + Send + Sync + 'static,
{
  let latest = open::last_opened(&*state.store, actor.user_id, &body.job_link_ids)
    .await
    .map_err(Error::store)?;
  Ok(Json(latest))
}
