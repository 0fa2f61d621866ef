use serde::{Deserialize, Serialize};

use crate::domain::ids::{GenreId, SongId};
use crate::domain::patch::Field;

/// Una canción del catálogo, tal como la devuelve el Catalog Store.
///
/// Los campos `audio_file_path` e `image_path` son referencias opacas a blobs
/// en el almacenamiento remoto. Solo los flujos de subida del coordinador
/// pueden escribirlos; nunca se aceptan como texto libre del cliente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
  pub id: SongId,
  pub title: String,
  pub artist: String,
  pub genre_id: Option<GenreId>,
  /// Nombre del género resuelto por el store (LEFT JOIN). Solo lectura.
  pub genre_name: Option<String>,
  pub release_year: Option<i32>,
  pub audio_file_path: Option<String>,
  pub image_path: Option<String>,
}

/// Conjunto completo de campos persistibles de una canción.
///
/// Es lo que el coordinador entrega al store tanto en un insert como en un
/// update: para un update, los campos ya vienen resueltos contra la fila
/// actual, de modo que la escritura es una sola operación atómica de fila.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongFields {
  pub title: String,
  pub artist: String,
  pub genre_id: Option<GenreId>,
  pub release_year: Option<i32>,
  pub audio_file_path: Option<String>,
  pub image_path: Option<String>,
}

/// Datos de entrada para crear una canción.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSong {
  pub title: String,
  pub artist: String,
  #[serde(default)]
  pub genre_id: Option<GenreId>,
  #[serde(default)]
  pub release_year: Option<i32>,
}

/// Parche parcial de una canción.
///
/// `title` y `artist` son obligatorios en la fila, así que un parche solo
/// puede reemplazarlos u omitirlos (`Option`). Los campos anulables usan
/// [`Field`] para distinguir "no vino" de "vino null".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongPatch {
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub artist: Option<String>,
  #[serde(default)]
  pub genre_id: Field<GenreId>,
  #[serde(default)]
  pub release_year: Field<i32>,
}

impl SongPatch {
  /// Resuelve el parche contra la fila actual, conservando las referencias a
  /// blobs: esas solo cambian a través de los flujos de subida.
  pub fn resolve(&self, current: &Song) -> SongFields {
    SongFields {
      title: self.title.clone().unwrap_or_else(|| current.title.clone()),
      artist: self.artist.clone().unwrap_or_else(|| current.artist.clone()),
      genre_id: self.genre_id.clone().resolve(current.genre_id),
      release_year: self.release_year.clone().resolve(current.release_year),
      audio_file_path: current.audio_file_path.clone(),
      image_path: current.image_path.clone(),
    }
  }
}
