//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/signup` | Body: [`Credentials`]; 201 + token, 409 if the email is taken |
//! | `POST` | `/auth/signin` | Body: [`Credentials`]; 401 on unknown email or wrong password |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use linkboard_core::store::LinkStore;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  AppState,
  auth::{hash_password, verify_password},
  error::Error,
  handlers::JsonBody,
};

#[derive(Debug, Deserialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
  pub token: String,
}

/// `POST /auth/signup`
pub async fn signup<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<Credentials>,
) -> Result<impl IntoResponse, Error>
where
  S: LinkStore + Clone + Send + Sync + 'static,
{
  let email = body.email.trim().to_owned();
  if email.is_empty() || body.password.is_empty() {
    return Err(Error::BadRequest("email and password are required".into()));
  }

  let hash = hash_password(&body.password)?;
  let user = state
    .store
    .create_user(email, hash)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::Conflict("email already in use".into()))?;

  info!(user_id = %user.user_id, "user signed up");
  let token = state.tokens.issue(user.user_id, &user.email)?;
  Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// `POST /auth/signin`
pub async fn signin<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<Credentials>,
) -> Result<Json<TokenResponse>, Error>
where
  S: LinkStore + Clone + Send + Sync + 'static,
{
  let found = state
    .store
    .find_user_by_email(body.email.trim().to_owned())
    .await
    .map_err(Error::store)?
    .ok_or(Error::Unauthorized)?;

  if !verify_password(&body.password, &found.password_hash) {
    return Err(Error::Unauthorized);
  }

  let token = state.tokens.issue(found.user.user_id, &found.user.email)?;
  Ok(Json(TokenResponse { token }))
}
