//! Password hashing, JWT issuance, and bearer-token extractors.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use trellis_core::{store::GraphStore, user::User};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// Signing material and token lifetime, derived from the configured secret.
pub struct AuthKeys {
  encoding:  EncodingKey,
  decoding:  DecodingKey,
  token_ttl: Duration,
}

impl AuthKeys {
  pub fn new(secret: &str, ttl_minutes: i64) -> Self {
    Self {
      encoding:  EncodingKey::from_secret(secret.as_bytes()),
      decoding:  DecodingKey::from_secret(secret.as_bytes()),
      token_ttl: Duration::minutes(ttl_minutes),
    }
  }
}

/// Claims carried in every access token. `sub` is the username.
#[derive(Serialize, Deserialize)]
pub struct Claims {
  pub sub:     String,
  pub user_id: Uuid,
  pub exp:     i64,
}

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash a password into an argon2 PHC string, e.g. `$argon2id$v=19$…`.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

pub fn verify_password(password: &str, phc: &str) -> Result<(), ApiError> {
  let parsed = PasswordHash::new(phc).map_err(|_| ApiError::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| ApiError::Unauthorized)
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

pub fn issue_token(keys: &AuthKeys, user: &User) -> Result<String, ApiError> {
  let claims = Claims {
    sub:     user.username.clone(),
    user_id: user.user_id,
    exp:     (Utc::now() + keys.token_ttl).timestamp(),
  };
  jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claims, &keys.encoding)
    .map_err(|e| ApiError::Internal(format!("cannot sign token: {e}")))
}

/// Decode and validate a token. Expiry is checked by `Validation::default()`.
pub fn decode_token(keys: &AuthKeys, token: &str) -> Result<Claims, ApiError> {
  jsonwebtoken::decode::<Claims>(token, &keys.decoding, &Validation::default())
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized)
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// The authenticated caller. Rejects with 401 when the bearer token is
/// missing, invalid, expired, or names a user that no longer exists.
pub struct CurrentUser(pub User);

/// Optional authentication for public endpoints that personalise their
/// response when a valid token is present. Anything short of a valid
/// token degrades to [`MaybeUser::Anonymous`] rather than rejecting.
pub enum MaybeUser {
  Authenticated(User),
  Anonymous,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
}

async fn resolve_user<S>(
  headers: &HeaderMap,
  state:   &AppState<S>,
) -> Result<User, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let token  = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
  let claims = decode_token(&state.auth, token)?;
  state
    .store
    .user_by_username(&claims.sub)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    resolve_user(&parts.headers, state).await.map(CurrentUser)
  }
}

impl<S> FromRequestParts<AppState<S>> for MaybeUser
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = std::convert::Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    Ok(match resolve_user(&parts.headers, state).await {
      Ok(user) => MaybeUser::Authenticated(user),
      Err(_)   => MaybeUser::Anonymous,
    })
  }
}
