use axum::Json;
use axum::extract::multipart::Field as MultipartField;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use solfa_core::domain::Field;
use solfa_core::domain::ids::{GenreId, SongId};
use solfa_core::domain::song::{NewSong, Song, SongPatch};
use solfa_core::ports::blob::FileUpload;

use crate::auth::AdminPrincipal;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Song>>, ApiError> {
  Ok(Json(state.media.list_songs()?))
}

pub async fn show(
  State(state): State<AppState>,
  Path(id): Path<Uuid>,
) -> Result<Json<Song>, ApiError> {
  Ok(Json(state.media.get_song(SongId::from_uuid(id))?))
}

/// JSON creation: metadata only. Blob references can only be written through
/// the multipart flow, never as free-form strings.
pub async fn create_json(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  Json(input): Json<NewSong>,
) -> Result<(StatusCode, Json<Song>), ApiError> {
  let song = state.media.create_song(input)?;
  Ok((StatusCode::CREATED, Json(song)))
}

pub async fn create_multipart(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  multipart: Multipart,
) -> Result<(StatusCode, Json<Song>), ApiError> {
  let form = collect_form(multipart).await?;
  let input = NewSong {
    title: form.title.unwrap_or_default(),
    artist: form.artist.unwrap_or_default(),
    genre_id: form.genre_id.resolve(None),
    release_year: form.release_year.resolve(None),
  };
  let song = state.media.create_song_with_files(input, form.audio, form.image).await?;
  Ok((StatusCode::CREATED, Json(song)))
}

pub async fn update_json(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  Path(id): Path<Uuid>,
  Json(patch): Json<SongPatch>,
) -> Result<Json<Song>, ApiError> {
  Ok(Json(state.media.update_song(SongId::from_uuid(id), patch)?))
}

pub async fn update_multipart(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  Path(id): Path<Uuid>,
  multipart: Multipart,
) -> Result<Json<Song>, ApiError> {
  let form = collect_form(multipart).await?;
  let patch = SongPatch {
    title: form.title,
    artist: form.artist,
    genre_id: form.genre_id,
    release_year: form.release_year,
  };
  let song =
    state.media.update_song_with_files(SongId::from_uuid(id), patch, form.audio, form.image).await?;
  Ok(Json(song))
}

pub async fn remove(
  _admin: AdminPrincipal,
  State(state): State<AppState>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.media.delete_song(SongId::from_uuid(id)).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Default)]
struct SongForm {
  title: Option<String>,
  artist: Option<String>,
  genre_id: Field<GenreId>,
  release_year: Field<i32>,
  audio: Option<FileUpload>,
  image: Option<FileUpload>,
}

async fn collect_form(mut multipart: Multipart) -> Result<SongForm, ApiError> {
  let mut form = SongForm::default();

  while let Some(field) = multipart.next_field().await? {
    let Some(name) = field.name().map(str::to_string) else { continue };
    match name.as_str() {
      "audio_file" => form.audio = file_from_field(field).await?,
      "image_file" => form.image = file_from_field(field).await?,
      // Blank text fields mean "leave as is", like the original HTML form.
      "title" => form.title = non_blank(field.text().await?),
      "artist" => form.artist = non_blank(field.text().await?),
      "genre_id" => form.genre_id = parse_genre_field(&field.text().await?)?,
      "release_year" => form.release_year = parse_year_field(&field.text().await?)?,
      _ => {}
    }
  }

  Ok(form)
}

async fn file_from_field(field: MultipartField<'_>) -> Result<Option<FileUpload>, ApiError> {
  let original_name = field.file_name().unwrap_or_default().to_string();
  let content_type = field.content_type().map(str::to_string);
  let bytes = field.bytes().await?;

  // Browsers submit an empty nameless part when no file was chosen.
  if bytes.is_empty() && original_name.is_empty() {
    return Ok(None);
  }
  Ok(Some(FileUpload { bytes: bytes.to_vec(), original_name, content_type }))
}

fn non_blank(value: String) -> Option<String> {
  if value.trim().is_empty() { None } else { Some(value) }
}

fn parse_genre_field(raw: &str) -> Result<Field<GenreId>, ApiError> {
  let raw = raw.trim();
  if raw.is_empty() {
    return Ok(Field::Absent);
  }
  let id = Uuid::parse_str(raw)
    .map_err(|_| ApiError::Malformed(format!("invalid genre_id: {raw}")))?;
  Ok(Field::Value(GenreId::from_uuid(id)))
}

fn parse_year_field(raw: &str) -> Result<Field<i32>, ApiError> {
  let raw = raw.trim();
  if raw.is_empty() {
    return Ok(Field::Absent);
  }
  let year = raw
    .parse::<i32>()
    .map_err(|_| ApiError::Malformed(format!("invalid release_year: {raw}")))?;
  Ok(Field::Value(year))
}
