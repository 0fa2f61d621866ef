use async_trait::async_trait;

/// Fallo de una operación contra el almacenamiento de objetos.
///
/// La clasificación se decide en el adapter, donde llega el error crudo del
/// transporte; aguas abajo nadie vuelve a inspeccionar textos de error.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
  /// El objeto ya no existe. En rutas de limpieza se trata como éxito.
  #[error("object not found")]
  NotFound,

  /// La referencia no tiene la forma esperada y no se puede recuperar la
  /// clave del objeto.
  #[error("invalid blob reference: {0}")]
  InvalidReference(String),

  /// El servicio remoto respondió con un estado de error.
  #[error("remote storage error (status {status}): {detail}")]
  Remote { status: u16, detail: String },

  /// Fallo de red o timeout antes de obtener respuesta.
  #[error("transport error: {0}")]
  Transport(String),
}

/// Carpeta lógica dentro del bucket, según el tipo de medio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFolder {
  Audio,
  Image,
}

impl MediaFolder {
  pub fn as_str(&self) -> &'static str {
    match self {
      MediaFolder::Audio => "song_audio",
      MediaFolder::Image => "song_images",
    }
  }
}

/// Archivo recibido del cliente, listo para subir.
#[derive(Debug, Clone)]
pub struct FileUpload {
  pub bytes: Vec<u8>,
  pub original_name: String,
  pub content_type: Option<String>,
}

/// Port del almacenamiento de objetos.
#[async_trait]
pub trait BlobStore: Send + Sync {
  /// Sube `file` a `folder` bajo un nombre único generado y devuelve la
  /// referencia pública con la que se puede acceder (y luego borrar) el
  /// objeto. Nunca reutiliza nombres.
  async fn upload(&self, file: &FileUpload, folder: MediaFolder) -> Result<String, BlobError>;

  /// Borra el objeto al que apunta `reference`.
  async fn delete(&self, reference: &str) -> Result<(), BlobError>;
}
