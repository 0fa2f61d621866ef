use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use solfa_core::domain::genre::Genre;
use solfa_core::domain::ids::GenreId;

use crate::auth::AdminPrincipal;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenreBody {
  pub name: String,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Genre>>, ApiError> {
  Ok(Json(state.media.list_genres()?))
}

pub async fn create(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  Json(body): Json<GenreBody>,
) -> Result<(StatusCode, Json<Genre>), ApiError> {
  let genre = state.media.create_genre(&body.name)?;
  Ok((StatusCode::CREATED, Json(genre)))
}

pub async fn update(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  Path(id): Path<Uuid>,
  Json(body): Json<GenreBody>,
) -> Result<Json<Genre>, ApiError> {
  Ok(Json(state.media.update_genre(GenreId::from_uuid(id), &body.name)?))
}

pub async fn remove(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.media.delete_genre(GenreId::from_uuid(id))?;
  Ok(StatusCode::NO_CONTENT)
}
