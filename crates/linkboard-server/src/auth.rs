//! Password hashing, bearer tokens, and the extractors that turn a request's
//! `Authorization` header into a verified [`Actor`].
//!
//! A token is `base64url(claims) "." hex(hmac_sha256(secret, base64url(claims)))`.
//! Handlers never see tokens, only the [`Actor`] they vouch for.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::{FromRequestParts, OptionalFromRequestParts},
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use linkboard_core::store::LinkStore;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::{AppState, error::Error};

type HmacSha256 = Hmac<Sha256>;

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Internal(format!("argon2 error: {e}")))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
  PasswordHash::new(password_hash)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// The verified identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
  pub user_id: Uuid,
  pub email:   String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  sub:   Uuid,
  email: String,
  /// Expiry, seconds since the Unix epoch.
  exp:   i64,
}

/// Issues and verifies HMAC-signed bearer tokens.
pub struct TokenSigner {
  secret: Vec<u8>,
  ttl:    Duration,
}

impl TokenSigner {
  pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
    Self { secret: secret.into(), ttl }
  }

  fn mac(&self) -> Result<HmacSha256, Error> {
    HmacSha256::new_from_slice(&self.secret)
      .map_err(|e| Error::Internal(format!("token key: {e}")))
  }

  pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, Error> {
    self.issue_at(user_id, email, Utc::now())
  }

  fn issue_at(&self, user_id: Uuid, email: &str, now: DateTime<Utc>) -> Result<String, Error> {
    let claims = Claims {
      sub:   user_id,
      email: email.to_owned(),
      exp:   (now + self.ttl).timestamp(),
    };
    let json = serde_json::to_vec(&claims)
      .map_err(|e| Error::Internal(format!("token claims: {e}")))?;
    let payload = B64.encode(json);

    let mut mac = self.mac()?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(format!("{payload}.{signature}"))
  }

  pub fn verify(&self, token: &str) -> Result<Actor, Error> {
    self.verify_at(token, Utc::now())
  }

  fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Actor, Error> {
    let (payload, signature) = token.split_once('.').ok_or(Error::Unauthorized)?;
    let signature = hex::decode(signature).map_err(|_| Error::Unauthorized)?;

    let mut mac = self.mac()?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature).map_err(|_| Error::Unauthorized)?;

    let json = B64.decode(payload).map_err(|_| Error::Unauthorized)?;
    let claims: Claims = serde_json::from_slice(&json).map_err(|_| Error::Unauthorized)?;

    if claims.exp <= now.timestamp() {
      return Err(Error::Unauthorized);
    }
    Ok(Actor { user_id: claims.sub, email: claims.email })
  }
}

/// The token from an `Authorization: Bearer <token>` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// Required authentication: rejects with 401 when the token is missing or
/// invalid.
impl<S> FromRequestParts<AppState<S>> for Actor
where
  S: LinkStore + Clone + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(Error::Unauthorized)?;
    state.tokens.verify(token)
  }
}

/// Optional authentication: a missing or invalid token means an anonymous
/// request, never a rejection.
impl<S> OptionalFromRequestParts<AppState<S>> for Actor
where
  S: LinkStore + Clone + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Option<Self>, Self::Rejection> {
    let Some(token) = bearer_token(&parts.headers) else {
      return Ok(None);
    };
    match state.tokens.verify(token) {
      Ok(actor) => Ok(Some(actor)),
      Err(_) => {
        tracing::warn!("ignoring invalid bearer token on optional-auth route");
        Ok(None)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  fn signer() -> TokenSigner { TokenSigner::new("test-secret", Duration::hours(1)) }

  #[test]
  fn password_roundtrip() {
    let hash = hash_password("hunter2").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("hunter2", &hash));
    assert!(!verify_password("hunter3", &hash));
  }

  #[test]
  fn malformed_hash_never_verifies() {
    assert!(!verify_password("hunter2", "not-a-phc-string"));
  }

  #[test]
  fn token_roundtrip() {
    let id = Uuid::new_v4();
    let token = signer().issue(id, "ada@example.com").unwrap();
    let actor = signer().verify(&token).unwrap();
    assert_eq!(actor, Actor { user_id: id, email: "ada@example.com".into() });
  }

  #[test]
  fn tampered_payload_is_rejected() {
    let s = signer();
    let token = s.issue(Uuid::new_v4(), "ada@example.com").unwrap();
    let (_, signature) = token.split_once('.').unwrap();

    let forged_claims = Claims {
      sub:   Uuid::new_v4(),
      email: "mallory@example.com".into(),
      exp:   i64::MAX,
    };
    let forged_payload = B64.encode(serde_json::to_vec(&forged_claims).unwrap());
    let forged = format!("{forged_payload}.{signature}");
    assert!(matches!(s.verify(&forged), Err(Error::Unauthorized)));
  }

  #[test]
  fn other_secret_is_rejected() {
    let token = signer().issue(Uuid::new_v4(), "ada@example.com").unwrap();
    let other = TokenSigner::new("another-secret", Duration::hours(1));
    assert!(matches!(other.verify(&token), Err(Error::Unauthorized)));
  }

  #[test]
  fn expired_token_is_rejected() {
    let s = signer();
    let issued = Utc::now() - Duration::hours(2);
    let token = s.issue_at(Uuid::new_v4(), "ada@example.com", issued).unwrap();
    assert!(matches!(s.verify(&token), Err(Error::Unauthorized)));
    assert!(s.verify_at(&token, issued).is_ok());
  }

  #[test]
  fn malformed_tokens_are_rejected() {
    let s = signer();
    for token in ["", "no-dot", "abc.zz", ".", "abc.00"] {
      assert!(matches!(s.verify(token), Err(Error::Unauthorized)), "{token:?}");
    }
  }

  #[test]
  fn bearer_header_parsing() {
    let mut headers = HeaderMap::new();
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
    assert_eq!(bearer_token(&headers), Some("abc.def"));
  }
}
