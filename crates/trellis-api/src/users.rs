//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users/register` | Body: `{"username":…,"password":…}` |
//! | `POST` | `/users/login/token` | Form-encoded `username` + `password` |
//! | `GET`  | `/users/me/profile` | Requires a bearer token |

use axum::{
  Form, Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use trellis_core::{
  store::GraphStore,
  user::{NewUser, UserRef},
  view::UserProfile,
};

use crate::{
  AppState,
  auth::{self, CurrentUser},
  error::ApiError,
};

/// Username length bounds, applied at registration.
const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=50;
const PASSWORD_MIN_LEN: usize = 6;

// ─── Register ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username: String,
  pub password: String,
}

/// `POST /users/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if !USERNAME_LEN.contains(&body.username.chars().count()) {
    return Err(ApiError::BadRequest(
      "username must be between 3 and 50 characters".to_string(),
    ));
  }
  if body.password.chars().count() < PASSWORD_MIN_LEN {
    return Err(ApiError::BadRequest(
      "password must be at least 6 characters".to_string(),
    ));
  }

  let existing = state
    .store
    .user_by_username(&body.username)
    .await
    .map_err(ApiError::store)?;
  if existing.is_some() {
    return Err(ApiError::BadRequest("username already registered".to_string()));
  }

  let user = state
    .store
    .add_user(NewUser {
      username:      body.username,
      password_hash: auth::hash_password(&body.password)?,
    })
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(user.as_ref_view())))
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginForm {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
  pub access_token: String,
  pub token_type:   &'static str,
}

/// `POST /users/login/token` — OAuth2-style password grant over a form body.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = state
    .store
    .user_by_username(&form.username)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  auth::verify_password(&form.password, &user.password_hash)?;

  let access_token = auth::issue_token(&state.auth, &user)?;
  Ok(Json(TokenResponse { access_token, token_type: "bearer" }))
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// `GET /users/me/profile`
pub async fn profile<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<UserProfile>, ApiError>
where
  S: GraphStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let owned = state
    .store
    .owned_graphs(user.user_id)
    .await
    .map_err(ApiError::store)?;
  let learning = state
    .store
    .learning_graphs(user.user_id)
    .await
    .map_err(ApiError::store)?;
  let received = state
    .store
    .received_ratings(user.user_id)
    .await
    .map_err(ApiError::store)?;

  let UserRef { id, username } = user.as_ref_view();
  Ok(Json(UserProfile {
    id,
    username,
    total_likes:     received.likes,
    total_dislikes:  received.dislikes,
    owned_graphs:    owned,
    learning_graphs: learning,
  }))
}
