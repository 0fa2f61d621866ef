use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use solfa_core::domain::ids::AdminId;
use solfa_core::domain::user::{Admin, Role};

use crate::auth::AdminPrincipal;
use crate::error::ApiError;
use crate::handlers::users::Credentials;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminUpdateBody {
  pub email: String,
  pub password: Option<String>,
}

pub async fn login(
  State(state): State<AppState>,
  Json(body): Json<Credentials>,
) -> Result<Json<Value>, ApiError> {
  let admin = state.accounts.login_admin(&body.email, &body.password)?;
  let token = state.tokens.issue(admin.id.as_uuid(), Role::Admin)?;
  Ok(Json(json!({ "token": token, "admin": admin })))
}

pub async fn logout() -> Json<Value> {
  Json(json!({ "message": "logged out" }))
}

pub async fn list(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
) -> Result<Json<Vec<Admin>>, ApiError> {
  Ok(Json(state.accounts.list_admins()?))
}

pub async fn create(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<Admin>), ApiError> {
  let admin = state.accounts.create_admin(&body.email, &body.password)?;
  Ok((StatusCode::CREATED, Json(admin)))
}

pub async fn show(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  Path(id): Path<Uuid>,
) -> Result<Json<Admin>, ApiError> {
  Ok(Json(state.accounts.get_admin(AdminId::from_uuid(id))?))
}

pub async fn update(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  Path(id): Path<Uuid>,
  Json(body): Json<AdminUpdateBody>,
) -> Result<Json<Admin>, ApiError> {
  let admin =
    state.accounts.update_admin(AdminId::from_uuid(id), &body.email, body.password.as_deref())?;
  Ok(Json(admin))
}

pub async fn remove(
  admin: AdminPrincipal,
  State(state): State<AppState>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.accounts.delete_admin(AdminId::from_uuid(id), admin.id)?;
  Ok(StatusCode::NO_CONTENT)
}
