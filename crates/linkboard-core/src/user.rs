//! Users — the identities that create links and record opens.
//!
//! Credential handling lives at the HTTP boundary; the core only ever sees a
//! verified user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user. Identity is immutable after signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub email:      String,
  pub created_at: DateTime<Utc>,
}

/// A user together with the stored password hash, returned only by the
/// credential lookup used at sign-in.
#[derive(Debug, Clone)]
pub struct UserCredentials {
  pub user:          User,
  /// PHC string produced by the password hasher.
  pub password_hash: String,
}
