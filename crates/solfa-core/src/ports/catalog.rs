use crate::domain::genre::Genre;
use crate::domain::ids::{GenreId, SongId};
use crate::domain::song::{Song, SongFields};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
  #[error("record not found")]
  NotFound,

  /// Violación de unicidad u otra restricción declarada.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("storage error: {0}")]
  Storage(String),
}

/// Port de persistencia del catálogo (canciones y géneros).
///
/// Las operaciones de escritura devuelven la fila tal como quedó almacenada,
/// para que el llamador vea los valores calculados por el store (id,
/// timestamps, nombre de género resuelto). Los deletes devuelven cuántas
/// filas se vieron afectadas; cero significa que otro borrado ganó la carrera.
pub trait CatalogStore: Send + Sync {
  fn list_songs(&self) -> Result<Vec<Song>, CatalogError>;
  fn find_song(&self, id: SongId) -> Result<Option<Song>, CatalogError>;
  fn insert_song(&self, fields: &SongFields) -> Result<Song, CatalogError>;
  fn update_song(&self, id: SongId, fields: &SongFields) -> Result<Song, CatalogError>;
  fn delete_song(&self, id: SongId) -> Result<usize, CatalogError>;

  fn list_genres(&self) -> Result<Vec<Genre>, CatalogError>;
  fn find_genre(&self, id: GenreId) -> Result<Option<Genre>, CatalogError>;
  fn exists_genre(&self, id: GenreId) -> Result<bool, CatalogError>;
  fn insert_genre(&self, name: &str) -> Result<Genre, CatalogError>;
  fn update_genre(&self, id: GenreId, name: &str) -> Result<Genre, CatalogError>;
  fn delete_genre(&self, id: GenreId) -> Result<usize, CatalogError>;
  fn count_songs_by_genre(&self, id: GenreId) -> Result<i64, CatalogError>;
}
