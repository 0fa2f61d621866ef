use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use tracing::debug;
use uuid::Uuid;

use solfa_core::ports::blob::{BlobError, BlobStore, FileUpload, MediaFolder};

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);
const DELETE_TIMEOUT: Duration = Duration::from_secs(10);

/// Conexión a un bucket de un servicio de almacenamiento de objetos con API
/// compatible con Supabase Storage.
#[derive(Debug, Clone)]
pub struct BucketConfig {
  /// URL base del servicio, sin barra final.
  pub base_url: String,
  pub bucket: String,
  /// Clave de servicio; va como Bearer en cada petición.
  pub service_key: String,
}

/// Adapter HTTP del almacenamiento de objetos.
pub struct BucketClient {
  http: reqwest::Client,
  config: BucketConfig,
}

impl BucketClient {
  pub fn new(config: BucketConfig) -> Self {
    Self { http: reqwest::Client::new(), config }
  }

  fn object_url(&self, key: &str) -> String {
    format!("{}/storage/v1/object/{}/{key}", self.config.base_url, self.config.bucket)
  }

  fn public_reference(&self, key: &str) -> String {
    format!("{}/storage/v1/object/public/{}/{key}", self.config.base_url, self.config.bucket)
  }
}

/// Clave única para un archivo: carpeta lógica + UUID v4 + extensión original.
/// El nombre original nunca se reutiliza, así dos subidas no chocan jamás.
fn object_key(folder: MediaFolder, original_name: &str) -> String {
  format!("{}/{}{}", folder.as_str(), Uuid::new_v4(), extension_of(original_name))
}

/// Extensión del nombre original, punto incluido; vacía si no hay.
fn extension_of(name: &str) -> &str {
  match name.rfind('.') {
    Some(idx) if idx > 0 => &name[idx..],
    _ => "",
  }
}

/// Recupera la clave del objeto desde una referencia pública
/// (`…/object/public/{bucket}/{clave…}`).
fn key_from_reference(reference: &str) -> Result<String, BlobError> {
  let parts: Vec<&str> = reference.split('/').collect();
  let public = parts
    .iter()
    .position(|p| *p == "public")
    .ok_or_else(|| BlobError::InvalidReference(reference.to_string()))?;
  // Tras "public" viene el bucket y después la clave, que no puede ser vacía.
  if public + 2 >= parts.len() || parts[public + 2..].iter().any(|p| p.is_empty()) {
    return Err(BlobError::InvalidReference(reference.to_string()));
  }
  Ok(parts[public + 2..].join("/"))
}

fn transport(err: reqwest::Error) -> BlobError {
  BlobError::Transport(err.to_string())
}

#[async_trait]
impl BlobStore for BucketClient {
  async fn upload(&self, file: &FileUpload, folder: MediaFolder) -> Result<String, BlobError> {
    let key = object_key(folder, &file.original_name);
    let content_type =
      file.content_type.as_deref().unwrap_or("application/octet-stream").to_string();

    let response = self
      .http
      .post(self.object_url(&key))
      .timeout(UPLOAD_TIMEOUT)
      .header(AUTHORIZATION, format!("Bearer {}", self.config.service_key))
      .header(CONTENT_TYPE, content_type)
      .header(CACHE_CONTROL, "3600")
      .body(file.bytes.clone())
      .send()
      .await
      .map_err(transport)?;

    let status = response.status();
    if status == StatusCode::OK || status == StatusCode::CREATED {
      debug!(key, size = file.bytes.len(), "uploaded object");
      Ok(self.public_reference(&key))
    } else {
      let detail = response.text().await.unwrap_or_default();
      Err(BlobError::Remote { status: status.as_u16(), detail })
    }
  }

  async fn delete(&self, reference: &str) -> Result<(), BlobError> {
    let key = key_from_reference(reference)?;

    let response = self
      .http
      .delete(self.object_url(&key))
      .timeout(DELETE_TIMEOUT)
      .header(AUTHORIZATION, format!("Bearer {}", self.config.service_key))
      .send()
      .await
      .map_err(transport)?;

    let status = response.status();
    if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
      debug!(key, "deleted object");
      Ok(())
    } else if status == StatusCode::NOT_FOUND {
      Err(BlobError::NotFound)
    } else {
      let detail = response.text().await.unwrap_or_default();
      Err(BlobError::Remote { status: status.as_u16(), detail })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn object_key_keeps_folder_and_extension() {
    let key = object_key(MediaFolder::Audio, "My Song.mp3");
    assert!(key.starts_with("song_audio/"));
    assert!(key.ends_with(".mp3"));
    // Nada del nombre original sobrevive, solo la extensión.
    assert!(!key.contains("My Song"));
  }

  #[test]
  fn object_keys_never_repeat() {
    let a = object_key(MediaFolder::Image, "cover.png");
    let b = object_key(MediaFolder::Image, "cover.png");
    assert_ne!(a, b);
  }

  #[test]
  fn extension_handles_odd_names() {
    assert_eq!(extension_of("song.mp3"), ".mp3");
    assert_eq!(extension_of("archive.tar.gz"), ".gz");
    assert_eq!(extension_of("noextension"), "");
    assert_eq!(extension_of(".hidden"), "");
  }

  #[test]
  fn key_recovers_from_public_reference() {
    let reference = "https://x.test/storage/v1/object/public/media/song_audio/abc.mp3";
    assert_eq!(key_from_reference(reference).unwrap(), "song_audio/abc.mp3");
  }

  #[test]
  fn nested_keys_survive_recovery() {
    let reference = "https://x.test/storage/v1/object/public/media/a/b/c.png";
    assert_eq!(key_from_reference(reference).unwrap(), "a/b/c.png");
  }

  #[test]
  fn malformed_references_are_rejected() {
    for bad in ["", "https://x.test/no-public-segment", "https://x.test/public/media",
      "https://x.test/public/media/"]
    {
      assert!(matches!(key_from_reference(bad), Err(BlobError::InvalidReference(_))), "{bad}");
    }
  }

  #[test]
  fn client_builds_urls_from_config() {
    let client = BucketClient::new(BucketConfig {
      base_url: "https://x.test".into(),
      bucket: "media".into(),
      service_key: "key".into(),
    });

    assert_eq!(client.object_url("a/b.mp3"), "https://x.test/storage/v1/object/media/a/b.mp3");
    assert_eq!(
      client.public_reference("a/b.mp3"),
      "https://x.test/storage/v1/object/public/media/a/b.mp3"
    );
  }
}
