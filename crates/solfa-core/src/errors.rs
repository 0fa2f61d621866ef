use thiserror::Error;

use crate::ports::blob::BlobError;
use crate::ports::catalog::CatalogError;

/// Error de cara al llamador para todas las operaciones del núcleo.
///
/// Las capas superiores (HTTP, CLI, etc.) deberían mapear cada variante a un
/// código de estado o mensaje de usuario, sin volver a inspeccionar el texto.
#[derive(Debug, Error)]
pub enum CoreError {
  /// Entrada inválida o incompleta. No se produjo ningún efecto.
  #[error("validation error: {0}")]
  Validation(String),

  /// El registro pedido no existe.
  #[error("not found")]
  NotFound,

  /// La operación violaría una invariante referencial o de unicidad.
  #[error("conflict: {0}")]
  Conflict(String),

  /// Credenciales inválidas.
  #[error("invalid credentials")]
  Unauthorized,

  /// Falló una subida al almacenamiento de objetos.
  #[error("upload failed: {0}")]
  Upload(#[source] BlobError),

  /// Falló una escritura en el catálogo.
  #[error("persist failed: {0}")]
  Persist(String),
}

impl From<CatalogError> for CoreError {
  fn from(err: CatalogError) -> Self {
    match err {
      CatalogError::NotFound => CoreError::NotFound,
      CatalogError::Conflict(msg) => CoreError::Conflict(msg),
      CatalogError::Storage(msg) => CoreError::Persist(msg),
    }
  }
}
