use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use solfa_core::domain::ids::{AdminId, UserId};
use solfa_core::domain::user::{Role, User};

use crate::auth::{AdminPrincipal, AuthPrincipal};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
  pub email: String,
  pub password: String,
  /// Only used by registration; when absent a username is generated.
  #[serde(default)]
  pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserUpdateBody {
  pub email: String,
  pub username: Option<String>,
  pub password: Option<String>,
}

pub async fn register(
  State(state): State<AppState>,
  Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<User>), ApiError> {
  let user =
    state.accounts.register_user(&body.email, &body.password, body.username.as_deref())?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// Session check: returns the role carried by the presented token.
pub async fn auth_check(principal: AuthPrincipal) -> Json<Value> {
  Json(json!({ "role": principal.role }))
}

pub async fn login(
  State(state): State<AppState>,
  Json(body): Json<Credentials>,
) -> Result<Json<Value>, ApiError> {
  let user = state.accounts.login_user(&body.email, &body.password)?;
  let token = state.tokens.issue(user.id.as_uuid(), Role::User)?;
  Ok(Json(json!({ "token": token, "user": user })))
}

/// Tokens are stateless; the endpoint exists for API compatibility.
pub async fn logout() -> Json<Value> {
  Json(json!({ "message": "logged out" }))
}

pub async fn profile(
  principal: AuthPrincipal,
  State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
  match principal.role {
    Role::User => {
      let user = state.accounts.get_user(UserId::from_uuid(principal.subject))?;
      Ok(Json(json!({ "role": "user", "user": user })))
    }
    Role::Admin => {
      let admin = state.accounts.get_admin(AdminId::from_uuid(principal.subject))?;
      Ok(Json(json!({ "role": "admin", "admin": admin })))
    }
  }
}

/// A principal can update their own account; admins manage other accounts
/// through the dedicated CRUD routes.
pub async fn update_profile(
  principal: AuthPrincipal,
  State(state): State<AppState>,
  Json(body): Json<UserUpdateBody>,
) -> Result<Json<Value>, ApiError> {
  match principal.role {
    Role::User => {
      let user = state.accounts.update_user(
        UserId::from_uuid(principal.subject),
        &body.email,
        body.username.as_deref(),
        body.password.as_deref(),
      )?;
      Ok(Json(json!({ "user": user })))
    }
    Role::Admin => {
      let admin = state.accounts.update_admin(
        AdminId::from_uuid(principal.subject),
        &body.email,
        body.password.as_deref(),
      )?;
      Ok(Json(json!({ "admin": admin })))
    }
  }
}

pub async fn list(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
  Ok(Json(state.accounts.list_users()?))
}

pub async fn show(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
  Ok(Json(state.accounts.get_user(UserId::from_uuid(id))?))
}

pub async fn update(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  Path(id): Path<Uuid>,
  Json(body): Json<UserUpdateBody>,
) -> Result<Json<User>, ApiError> {
  let user = state.accounts.update_user(
    UserId::from_uuid(id),
    &body.email,
    body.username.as_deref(),
    body.password.as_deref(),
  )?;
  Ok(Json(user))
}

pub async fn remove(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.accounts.delete_user(UserId::from_uuid(id))?;
  Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn auth_check_reports_the_token_role() {
    let principal = AuthPrincipal { subject: Uuid::new_v4(), role: Role::Admin };
    let Json(body) = auth_check(principal).await;
    assert_eq!(body, json!({ "role": "admin" }));
  }

  #[test]
  fn register_body_accepts_an_optional_username() {
    let with: Credentials =
      serde_json::from_str(r#"{"email":"a@x.com","password":"p","username":"alice"}"#).unwrap();
    assert_eq!(with.username.as_deref(), Some("alice"));

    let without: Credentials =
      serde_json::from_str(r#"{"email":"a@x.com","password":"p"}"#).unwrap();
    assert_eq!(without.username, None);
  }
}
