use tracing::{debug, warn};

use crate::domain::genre::Genre;
use crate::domain::ids::{GenreId, SongId};
use crate::domain::song::{NewSong, Song, SongFields, SongPatch};
use crate::errors::CoreError;
use crate::ports::blob::{BlobError, BlobStore, FileUpload, MediaFolder};
use crate::ports::catalog::CatalogStore;

/// Coordinador de medios: mantiene consistentes las filas del catálogo y los
/// blobs del almacenamiento remoto.
///
/// Invariante: una fila viva nunca referencia un blob cuya subida falló, y un
/// blob que deja de estar referenciado se intenta borrar. Las acciones
/// compensatorias son best-effort: sus fallos se registran y no se propagan
/// nunca por encima del error original.
///
/// La única ventana aceptada es un crash entre una subida exitosa y la
/// escritura de la fila: el blob queda huérfano (fuga acotada), pero ninguna
/// fila apunta a él.
pub struct MediaService<C, B>
where
  C: CatalogStore,
  B: BlobStore,
{
  catalog: C,
  blobs: B,
}

impl<C, B> MediaService<C, B>
where
  C: CatalogStore,
  B: BlobStore,
{
  pub fn new(catalog: C, blobs: B) -> Self {
    Self { catalog, blobs }
  }

  // -------- Canciones: lectura --------

  pub fn list_songs(&self) -> Result<Vec<Song>, CoreError> {
    Ok(self.catalog.list_songs()?)
  }

  pub fn get_song(&self, id: SongId) -> Result<Song, CoreError> {
    self.catalog.find_song(id)?.ok_or(CoreError::NotFound)
  }

  // -------- Canciones: escritura --------

  /// Crea una canción sin archivos adjuntos.
  pub fn create_song(&self, input: NewSong) -> Result<Song, CoreError> {
    let fields = self.validated_new_fields(&input)?;
    Ok(self.catalog.insert_song(&fields)?)
  }

  /// Crea una canción subiendo primero los archivos adjuntos.
  ///
  /// Orden: audio, imagen, fila. Si un paso falla, los blobs ya subidos en
  /// esta misma operación se borran (best-effort) antes de devolver el error;
  /// nada queda persistido.
  pub async fn create_song_with_files(
    &self,
    input: NewSong,
    audio: Option<FileUpload>,
    image: Option<FileUpload>,
  ) -> Result<Song, CoreError> {
    let mut fields = self.validated_new_fields(&input)?;

    if let Some(file) = &audio {
      let reference =
        self.blobs.upload(file, MediaFolder::Audio).await.map_err(CoreError::Upload)?;
      fields.audio_file_path = Some(reference);
    }

    if let Some(file) = &image {
      match self.blobs.upload(file, MediaFolder::Image).await {
        Ok(reference) => fields.image_path = Some(reference),
        Err(err) => {
          // El audio ya subido quedaría huérfano: acción compensatoria.
          if let Some(reference) = &fields.audio_file_path {
            self.discard_blob(reference, "audio").await;
          }
          return Err(CoreError::Upload(err));
        }
      }
    }

    match self.catalog.insert_song(&fields) {
      Ok(song) => Ok(song),
      Err(err) => {
        if let Some(reference) = &fields.audio_file_path {
          self.discard_blob(reference, "audio").await;
        }
        if let Some(reference) = &fields.image_path {
          self.discard_blob(reference, "image").await;
        }
        Err(err.into())
      }
    }
  }

  /// Actualización parcial sin archivos. Las referencias a blobs de la fila
  /// se conservan tal cual.
  pub fn update_song(&self, id: SongId, patch: SongPatch) -> Result<Song, CoreError> {
    let current = self.catalog.find_song(id)?.ok_or(CoreError::NotFound)?;
    let fields = self.resolved_fields(&patch, &current)?;
    Ok(self.catalog.update_song(id, &fields)?)
  }

  /// Actualización parcial con posible reemplazo de archivos.
  ///
  /// Los blobs nuevos se suben primero; los antiguos se conservan hasta que
  /// la fila queda escrita sin referenciarlos, y solo entonces se borran
  /// (best-effort). Así nunca existe una fila apuntando a un blob ya borrado.
  pub async fn update_song_with_files(
    &self,
    id: SongId,
    patch: SongPatch,
    audio: Option<FileUpload>,
    image: Option<FileUpload>,
  ) -> Result<Song, CoreError> {
    let current = self.catalog.find_song(id)?.ok_or(CoreError::NotFound)?;
    let mut fields = self.resolved_fields(&patch, &current)?;

    let mut new_audio: Option<String> = None;
    let mut new_image: Option<String> = None;

    if let Some(file) = &audio {
      // Si esta subida falla no hay nada que limpiar: la fila y su blob
      // antiguo siguen intactos.
      let reference =
        self.blobs.upload(file, MediaFolder::Audio).await.map_err(CoreError::Upload)?;
      fields.audio_file_path = Some(reference.clone());
      new_audio = Some(reference);
    }

    if let Some(file) = &image {
      match self.blobs.upload(file, MediaFolder::Image).await {
        Ok(reference) => {
          fields.image_path = Some(reference.clone());
          new_image = Some(reference);
        }
        Err(err) => {
          if let Some(reference) = &new_audio {
            self.discard_blob(reference, "audio").await;
          }
          return Err(CoreError::Upload(err));
        }
      }
    }

    let updated = match self.catalog.update_song(id, &fields) {
      Ok(song) => song,
      Err(err) => {
        // La fila sigue referenciando los blobs antiguos; solo los nuevos
        // han quedado huérfanos.
        if let Some(reference) = &new_audio {
          self.discard_blob(reference, "audio").await;
        }
        if let Some(reference) = &new_image {
          self.discard_blob(reference, "image").await;
        }
        return Err(err.into());
      }
    };

    // Solo tras el commit dejan de estar referenciados los blobs antiguos.
    if new_audio.is_some() {
      if let Some(reference) = &current.audio_file_path {
        self.discard_blob(reference, "audio").await;
      }
    }
    if new_image.is_some() {
      if let Some(reference) = &current.image_path {
        self.discard_blob(reference, "image").await;
      }
    }

    Ok(updated)
  }

  /// Borra la canción y después sus blobs (best-effort).
  pub async fn delete_song(&self, id: SongId) -> Result<(), CoreError> {
    // Las referencias se leen antes de borrar la fila; después ya no existen.
    let current = self.catalog.find_song(id)?.ok_or(CoreError::NotFound)?;

    let affected = self.catalog.delete_song(id)?;
    if affected == 0 {
      // Carrera con otro borrado concurrente.
      return Err(CoreError::NotFound);
    }

    if let Some(reference) = &current.audio_file_path {
      self.discard_blob(reference, "audio").await;
    }
    if let Some(reference) = &current.image_path {
      self.discard_blob(reference, "image").await;
    }

    Ok(())
  }

  // -------- Géneros --------

  pub fn list_genres(&self) -> Result<Vec<Genre>, CoreError> {
    Ok(self.catalog.list_genres()?)
  }

  pub fn create_genre(&self, name: &str) -> Result<Genre, CoreError> {
    let name = name.trim();
    if name.is_empty() {
      return Err(CoreError::Validation("genre name must not be empty".into()));
    }
    Ok(self.catalog.insert_genre(name)?)
  }

  pub fn update_genre(&self, id: GenreId, name: &str) -> Result<Genre, CoreError> {
    let name = name.trim();
    if name.is_empty() {
      return Err(CoreError::Validation("genre name must not be empty".into()));
    }
    if self.catalog.find_genre(id)?.is_none() {
      return Err(CoreError::NotFound);
    }
    Ok(self.catalog.update_genre(id, name)?)
  }

  /// Borra un género, salvo que alguna canción lo referencie.
  pub fn delete_genre(&self, id: GenreId) -> Result<(), CoreError> {
    if self.catalog.find_genre(id)?.is_none() {
      return Err(CoreError::NotFound);
    }
    let in_use = self.catalog.count_songs_by_genre(id)?;
    if in_use > 0 {
      return Err(CoreError::Conflict(format!("genre is referenced by {in_use} song(s)")));
    }
    if self.catalog.delete_genre(id)? == 0 {
      return Err(CoreError::NotFound);
    }
    Ok(())
  }

  // -------- Internos --------

  fn validated_new_fields(&self, input: &NewSong) -> Result<SongFields, CoreError> {
    let title = input.title.trim();
    let artist = input.artist.trim();
    if title.is_empty() {
      return Err(CoreError::Validation("title must not be empty".into()));
    }
    if artist.is_empty() {
      return Err(CoreError::Validation("artist must not be empty".into()));
    }
    if let Some(genre_id) = input.genre_id {
      self.ensure_genre_exists(genre_id)?;
    }
    Ok(SongFields {
      title: title.to_string(),
      artist: artist.to_string(),
      genre_id: input.genre_id,
      release_year: input.release_year,
      audio_file_path: None,
      image_path: None,
    })
  }

  fn resolved_fields(&self, patch: &SongPatch, current: &Song) -> Result<SongFields, CoreError> {
    if let Some(title) = &patch.title {
      if title.trim().is_empty() {
        return Err(CoreError::Validation("title must not be empty".into()));
      }
    }
    if let Some(artist) = &patch.artist {
      if artist.trim().is_empty() {
        return Err(CoreError::Validation("artist must not be empty".into()));
      }
    }
    if let crate::domain::Field::Value(genre_id) = &patch.genre_id {
      self.ensure_genre_exists(*genre_id)?;
    }
    let mut fields = patch.resolve(current);
    fields.title = fields.title.trim().to_string();
    fields.artist = fields.artist.trim().to_string();
    Ok(fields)
  }

  fn ensure_genre_exists(&self, id: GenreId) -> Result<(), CoreError> {
    if self.catalog.exists_genre(id)? {
      Ok(())
    } else {
      Err(CoreError::Conflict("genre does not exist".into()))
    }
  }

  /// Borrado best-effort de un blob en rutas de limpieza.
  ///
  /// `NotFound` es éxito (el objeto ya no está); cualquier otro fallo se
  /// registra y se traga: el error original de la operación, si lo hay, es lo
  /// que ve el llamador.
  async fn discard_blob(&self, reference: &str, kind: &str) {
    match self.blobs.delete(reference).await {
      Ok(()) => debug!(kind, reference, "deleted blob"),
      Err(BlobError::NotFound) => debug!(kind, reference, "blob already gone"),
      Err(err) => warn!(kind, reference, error = %err, "failed to delete blob"),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;
  use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
  use std::sync::{Arc, Mutex};

  use async_trait::async_trait;

  use super::*;
  use crate::domain::Field;
  use crate::ports::catalog::CatalogError;

  /// Registro compartido de efectos, para poder afirmar el orden relativo
  /// entre escrituras de fila y borrados de blobs.
  type Journal = Arc<Mutex<Vec<String>>>;

  #[derive(Clone, Default)]
  struct FakeCatalog {
    songs: Arc<Mutex<HashMap<SongId, Song>>>,
    genres: Arc<Mutex<HashMap<GenreId, Genre>>>,
    fail_insert: Arc<AtomicBool>,
    fail_update: Arc<AtomicBool>,
    journal: Journal,
  }

  impl FakeCatalog {
    fn with_journal(journal: Journal) -> Self {
      FakeCatalog { journal, ..Default::default() }
    }

    fn seed_song(&self, song: Song) {
      self.songs.lock().unwrap().insert(song.id, song);
    }

    fn seed_genre(&self, genre: Genre) {
      self.genres.lock().unwrap().insert(genre.id, genre);
    }

    fn song(&self, id: SongId) -> Option<Song> {
      self.songs.lock().unwrap().get(&id).cloned()
    }

    fn song_count(&self) -> usize {
      self.songs.lock().unwrap().len()
    }

    fn make_song(&self, fields: &SongFields, id: SongId) -> Song {
      let genre_name = fields
        .genre_id
        .and_then(|gid| self.genres.lock().unwrap().get(&gid).map(|g| g.name.clone()));
      Song {
        id,
        title: fields.title.clone(),
        artist: fields.artist.clone(),
        genre_id: fields.genre_id,
        genre_name,
        release_year: fields.release_year,
        audio_file_path: fields.audio_file_path.clone(),
        image_path: fields.image_path.clone(),
      }
    }
  }

  impl CatalogStore for FakeCatalog {
    fn list_songs(&self) -> Result<Vec<Song>, CatalogError> {
      Ok(self.songs.lock().unwrap().values().cloned().collect())
    }

    fn find_song(&self, id: SongId) -> Result<Option<Song>, CatalogError> {
      Ok(self.song(id))
    }

    fn insert_song(&self, fields: &SongFields) -> Result<Song, CatalogError> {
      if self.fail_insert.load(Ordering::SeqCst) {
        return Err(CatalogError::Storage("insert failed".into()));
      }
      let song = self.make_song(fields, SongId::new());
      self.songs.lock().unwrap().insert(song.id, song.clone());
      self.journal.lock().unwrap().push("insert_row".into());
      Ok(song)
    }

    fn update_song(&self, id: SongId, fields: &SongFields) -> Result<Song, CatalogError> {
      if self.fail_update.load(Ordering::SeqCst) {
        return Err(CatalogError::Storage("update failed".into()));
      }
      let mut songs = self.songs.lock().unwrap();
      if !songs.contains_key(&id) {
        return Err(CatalogError::NotFound);
      }
      let song = self.make_song(fields, id);
      songs.insert(id, song.clone());
      self.journal.lock().unwrap().push("update_row".into());
      Ok(song)
    }

    fn delete_song(&self, id: SongId) -> Result<usize, CatalogError> {
      let removed = self.songs.lock().unwrap().remove(&id).is_some();
      if removed {
        self.journal.lock().unwrap().push("delete_row".into());
      }
      Ok(usize::from(removed))
    }

    fn list_genres(&self) -> Result<Vec<Genre>, CatalogError> {
      Ok(self.genres.lock().unwrap().values().cloned().collect())
    }

    fn find_genre(&self, id: GenreId) -> Result<Option<Genre>, CatalogError> {
      Ok(self.genres.lock().unwrap().get(&id).cloned())
    }

    fn exists_genre(&self, id: GenreId) -> Result<bool, CatalogError> {
      Ok(self.genres.lock().unwrap().contains_key(&id))
    }

    fn insert_genre(&self, name: &str) -> Result<Genre, CatalogError> {
      let mut genres = self.genres.lock().unwrap();
      if genres.values().any(|g| g.name == name) {
        return Err(CatalogError::Conflict("genre name already exists".into()));
      }
      let genre = Genre { id: GenreId::new(), name: name.to_string() };
      genres.insert(genre.id, genre.clone());
      Ok(genre)
    }

    fn update_genre(&self, id: GenreId, name: &str) -> Result<Genre, CatalogError> {
      let mut genres = self.genres.lock().unwrap();
      let genre = genres.get_mut(&id).ok_or(CatalogError::NotFound)?;
      genre.name = name.to_string();
      Ok(genre.clone())
    }

    fn delete_genre(&self, id: GenreId) -> Result<usize, CatalogError> {
      Ok(usize::from(self.genres.lock().unwrap().remove(&id).is_some()))
    }

    fn count_songs_by_genre(&self, id: GenreId) -> Result<i64, CatalogError> {
      Ok(self.songs.lock().unwrap().values().filter(|s| s.genre_id == Some(id)).count() as i64)
    }
  }

  #[derive(Clone, Default)]
  struct FakeBlobs {
    uploads: Arc<Mutex<Vec<String>>>,
    deletes: Arc<Mutex<Vec<String>>>,
    fail_audio_upload: Arc<AtomicBool>,
    fail_image_upload: Arc<AtomicBool>,
    fail_delete: Arc<AtomicBool>,
    missing_on_delete: Arc<AtomicBool>,
    counter: Arc<AtomicU32>,
    journal: Journal,
  }

  impl FakeBlobs {
    fn with_journal(journal: Journal) -> Self {
      FakeBlobs { journal, ..Default::default() }
    }

    fn uploaded(&self) -> Vec<String> {
      self.uploads.lock().unwrap().clone()
    }

    fn deleted(&self) -> Vec<String> {
      self.deletes.lock().unwrap().clone()
    }
  }

  #[async_trait]
  impl BlobStore for FakeBlobs {
    async fn upload(&self, _file: &FileUpload, folder: MediaFolder) -> Result<String, BlobError> {
      let failing = match folder {
        MediaFolder::Audio => &self.fail_audio_upload,
        MediaFolder::Image => &self.fail_image_upload,
      };
      if failing.load(Ordering::SeqCst) {
        return Err(BlobError::Remote { status: 500, detail: "boom".into() });
      }
      let n = self.counter.fetch_add(1, Ordering::SeqCst);
      let reference = format!("https://blobs.test/public/media/{}/{n}", folder.as_str());
      self.uploads.lock().unwrap().push(reference.clone());
      Ok(reference)
    }

    async fn delete(&self, reference: &str) -> Result<(), BlobError> {
      self.deletes.lock().unwrap().push(reference.to_string());
      self.journal.lock().unwrap().push(format!("delete_blob:{reference}"));
      if self.missing_on_delete.load(Ordering::SeqCst) {
        return Err(BlobError::NotFound);
      }
      if self.fail_delete.load(Ordering::SeqCst) {
        return Err(BlobError::Remote { status: 503, detail: "unavailable".into() });
      }
      Ok(())
    }
  }

  fn service() -> (MediaService<FakeCatalog, FakeBlobs>, FakeCatalog, FakeBlobs) {
    let journal: Journal = Arc::default();
    let catalog = FakeCatalog::with_journal(journal.clone());
    let blobs = FakeBlobs::with_journal(journal);
    let svc = MediaService::new(catalog.clone(), blobs.clone());
    (svc, catalog, blobs)
  }

  fn upload(name: &str) -> FileUpload {
    FileUpload {
      bytes: vec![1, 2, 3],
      original_name: name.to_string(),
      content_type: Some("application/octet-stream".to_string()),
    }
  }

  fn draft(title: &str, artist: &str) -> NewSong {
    NewSong { title: title.into(), artist: artist.into(), genre_id: None, release_year: None }
  }

  // -------- Creación --------

  #[tokio::test]
  async fn create_with_files_persists_both_references() {
    let (svc, catalog, blobs) = service();

    let song = svc
      .create_song_with_files(draft("A", "B"), Some(upload("a.mp3")), Some(upload("c.png")))
      .await
      .unwrap();

    let uploaded = blobs.uploaded();
    assert_eq!(uploaded.len(), 2);
    assert_eq!(song.audio_file_path.as_deref(), Some(uploaded[0].as_str()));
    assert_eq!(song.image_path.as_deref(), Some(uploaded[1].as_str()));
    assert!(blobs.deleted().is_empty());
    assert_eq!(catalog.song(song.id).unwrap(), song);
  }

  #[tokio::test]
  async fn image_upload_failure_discards_audio_and_inserts_nothing() {
    let (svc, catalog, blobs) = service();
    blobs.fail_image_upload.store(true, Ordering::SeqCst);

    let err = svc
      .create_song_with_files(draft("A", "B"), Some(upload("a.mp3")), Some(upload("c.png")))
      .await
      .unwrap_err();

    assert!(matches!(err, CoreError::Upload(_)));
    let uploaded = blobs.uploaded();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(blobs.deleted(), uploaded);
    assert_eq!(catalog.song_count(), 0);
  }

  #[tokio::test]
  async fn insert_failure_discards_every_uploaded_blob() {
    let (svc, catalog, blobs) = service();
    catalog.fail_insert.store(true, Ordering::SeqCst);

    let err = svc
      .create_song_with_files(draft("A", "B"), Some(upload("a.mp3")), Some(upload("c.png")))
      .await
      .unwrap_err();

    assert!(matches!(err, CoreError::Persist(_)));
    assert_eq!(blobs.deleted(), blobs.uploaded());
    assert_eq!(catalog.song_count(), 0);
  }

  #[tokio::test]
  async fn audio_upload_failure_aborts_before_any_side_effect() {
    let (svc, catalog, blobs) = service();
    blobs.fail_audio_upload.store(true, Ordering::SeqCst);

    let err =
      svc.create_song_with_files(draft("A", "B"), Some(upload("a.mp3")), None).await.unwrap_err();

    assert!(matches!(err, CoreError::Upload(_)));
    assert!(blobs.uploaded().is_empty());
    assert!(blobs.deleted().is_empty());
    assert_eq!(catalog.song_count(), 0);
  }

  #[test]
  fn create_rejects_blank_title() {
    let (svc, _, _) = service();
    let err = svc.create_song(draft("   ", "B")).unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
  }

  #[test]
  fn create_rejects_unknown_genre() {
    let (svc, _, _) = service();
    let mut input = draft("A", "B");
    input.genre_id = Some(GenreId::new());
    let err = svc.create_song(input).unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
  }

  // -------- Actualización --------

  fn seeded_song(catalog: &FakeCatalog, audio: Option<&str>, image: Option<&str>) -> Song {
    let song = Song {
      id: SongId::new(),
      title: "Old title".into(),
      artist: "Old artist".into(),
      genre_id: None,
      genre_name: None,
      release_year: Some(1999),
      audio_file_path: audio.map(String::from),
      image_path: image.map(String::from),
    };
    catalog.seed_song(song.clone());
    song
  }

  #[tokio::test]
  async fn replacing_audio_deletes_old_blob_after_commit() {
    let (svc, catalog, blobs) = service();
    let song = seeded_song(&catalog, Some("r_old"), None);

    let updated = svc
      .update_song_with_files(song.id, SongPatch::default(), Some(upload("a.mp3")), None)
      .await
      .unwrap();

    let new_ref = blobs.uploaded()[0].clone();
    assert_eq!(updated.audio_file_path.as_deref(), Some(new_ref.as_str()));
    assert_eq!(blobs.deleted(), vec!["r_old".to_string()]);

    // El blob antiguo se borra después del commit de la fila, nunca antes.
    let journal = catalog.journal.lock().unwrap().clone();
    let commit = journal.iter().position(|e| e == "update_row").unwrap();
    let discard = journal.iter().position(|e| e == "delete_blob:r_old").unwrap();
    assert!(commit < discard);
  }

  #[tokio::test]
  async fn old_blob_delete_failure_does_not_roll_back_the_row() {
    let (svc, catalog, blobs) = service();
    let song = seeded_song(&catalog, Some("r_old"), None);
    blobs.fail_delete.store(true, Ordering::SeqCst);

    let updated = svc
      .update_song_with_files(song.id, SongPatch::default(), Some(upload("a.mp3")), None)
      .await
      .unwrap();

    // El borrado del blob antiguo falló, pero la fila ya apunta al nuevo.
    assert_eq!(blobs.deleted(), vec!["r_old".to_string()]);
    assert_eq!(catalog.song(song.id).unwrap().audio_file_path, updated.audio_file_path);
    assert_ne!(updated.audio_file_path.as_deref(), Some("r_old"));
  }

  #[tokio::test]
  async fn update_persist_failure_discards_new_blobs_and_keeps_old() {
    let (svc, catalog, blobs) = service();
    let song = seeded_song(&catalog, Some("r_old"), Some("i_old"));
    catalog.fail_update.store(true, Ordering::SeqCst);

    let err = svc
      .update_song_with_files(
        song.id,
        SongPatch::default(),
        Some(upload("a.mp3")),
        Some(upload("c.png")),
      )
      .await
      .unwrap_err();

    assert!(matches!(err, CoreError::Persist(_)));
    // Solo los blobs recién subidos se limpian; los antiguos siguen
    // referenciados por la fila intacta.
    assert_eq!(blobs.deleted(), blobs.uploaded());
    let stored = catalog.song(song.id).unwrap();
    assert_eq!(stored.audio_file_path.as_deref(), Some("r_old"));
    assert_eq!(stored.image_path.as_deref(), Some("i_old"));
  }

  #[tokio::test]
  async fn update_image_failure_discards_fresh_audio_only() {
    let (svc, catalog, blobs) = service();
    let song = seeded_song(&catalog, Some("r_old"), Some("i_old"));
    blobs.fail_image_upload.store(true, Ordering::SeqCst);

    let err = svc
      .update_song_with_files(
        song.id,
        SongPatch::default(),
        Some(upload("a.mp3")),
        Some(upload("c.png")),
      )
      .await
      .unwrap_err();

    assert!(matches!(err, CoreError::Upload(_)));
    assert_eq!(blobs.deleted(), blobs.uploaded());
    let stored = catalog.song(song.id).unwrap();
    assert_eq!(stored.audio_file_path.as_deref(), Some("r_old"));
    assert_eq!(stored.image_path.as_deref(), Some("i_old"));
  }

  #[tokio::test]
  async fn update_without_files_keeps_blob_references() {
    let (svc, catalog, blobs) = service();
    let song = seeded_song(&catalog, Some("r_old"), Some("i_old"));

    let patch = SongPatch { title: Some("New title".into()), ..Default::default() };
    let updated = svc.update_song_with_files(song.id, patch, None, None).await.unwrap();

    assert_eq!(updated.title, "New title");
    assert_eq!(updated.audio_file_path.as_deref(), Some("r_old"));
    assert_eq!(updated.image_path.as_deref(), Some("i_old"));
    assert!(blobs.deleted().is_empty());
  }

  #[test]
  fn patch_distinguishes_null_from_absent() {
    let (svc, catalog, _) = service();
    let genre = Genre { id: GenreId::new(), name: "Jazz".into() };
    catalog.seed_genre(genre.clone());

    let mut song = seeded_song(&catalog, None, None);
    song.genre_id = Some(genre.id);
    catalog.seed_song(song.clone());

    // Absent: conserva el género actual.
    let kept = svc.update_song(song.id, SongPatch::default()).unwrap();
    assert_eq!(kept.genre_id, Some(genre.id));

    // Null explícito: lo borra.
    let patch = SongPatch { genre_id: Field::Null, ..Default::default() };
    let cleared = svc.update_song(song.id, patch).unwrap();
    assert_eq!(cleared.genre_id, None);
  }

  #[test]
  fn update_missing_song_is_not_found() {
    let (svc, _, _) = service();
    let err = svc.update_song(SongId::new(), SongPatch::default()).unwrap_err();
    assert!(matches!(err, CoreError::NotFound));
  }

  // -------- Borrado --------

  #[tokio::test]
  async fn delete_song_removes_row_then_blobs() {
    let (svc, catalog, blobs) = service();
    let song = seeded_song(&catalog, Some("r_a"), Some("r_i"));

    svc.delete_song(song.id).await.unwrap();

    assert_eq!(catalog.song_count(), 0);
    assert_eq!(blobs.deleted(), vec!["r_a".to_string(), "r_i".to_string()]);
  }

  #[tokio::test]
  async fn delete_song_succeeds_even_if_blob_delete_fails() {
    let (svc, catalog, blobs) = service();
    let song = seeded_song(&catalog, Some("r_a"), None);
    blobs.fail_delete.store(true, Ordering::SeqCst);

    svc.delete_song(song.id).await.unwrap();
    assert_eq!(catalog.song_count(), 0);
  }

  #[tokio::test]
  async fn delete_song_treats_missing_blob_as_success() {
    let (svc, catalog, blobs) = service();
    let song = seeded_song(&catalog, Some("r_a"), None);
    blobs.missing_on_delete.store(true, Ordering::SeqCst);

    svc.delete_song(song.id).await.unwrap();
    assert_eq!(catalog.song_count(), 0);
  }

  #[tokio::test]
  async fn delete_missing_song_is_not_found() {
    let (svc, _, _) = service();
    let err = svc.delete_song(SongId::new()).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound));
  }

  // -------- Géneros --------

  #[test]
  fn delete_genre_in_use_is_a_conflict() {
    let (svc, catalog, _) = service();
    let genre = svc.create_genre("Rock").unwrap();
    let mut song = seeded_song(&catalog, None, None);
    song.genre_id = Some(genre.id);
    catalog.seed_song(song);

    let err = svc.delete_genre(genre.id).unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
    assert!(catalog.find_genre(genre.id).unwrap().is_some());
  }

  #[test]
  fn delete_unused_genre_succeeds() {
    let (svc, catalog, _) = service();
    let genre = svc.create_genre("Rock").unwrap();

    svc.delete_genre(genre.id).unwrap();
    assert!(catalog.find_genre(genre.id).unwrap().is_none());
  }

  #[test]
  fn duplicate_genre_name_is_a_conflict() {
    let (svc, _, _) = service();
    svc.create_genre("Rock").unwrap();
    let err = svc.create_genre("Rock").unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
  }
}
