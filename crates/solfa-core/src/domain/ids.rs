use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identificador único de una canción dentro del catálogo.
///
/// Se genera con UUID v4 al insertar la fila; el llamador nunca lo elige.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongId(Uuid);

impl SongId {
  /// Genera un nuevo identificador único.
  pub fn new() -> Self {
    SongId(Uuid::new_v4())
  }

  /// Construye un `SongId` a partir de un `Uuid` existente.
  pub fn from_uuid(u: Uuid) -> Self {
    SongId(u)
  }

  /// Devuelve el `Uuid` interno.
  pub fn as_uuid(&self) -> Uuid {
    self.0
  }
}

impl Default for SongId {
  fn default() -> Self {
    SongId::new()
  }
}

impl From<Uuid> for SongId {
  fn from(u: Uuid) -> Self {
    SongId(u)
  }
}

impl From<SongId> for Uuid {
  fn from(id: SongId) -> Self {
    id.0
  }
}

impl fmt::Display for SongId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// Identificador único de un género musical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenreId(Uuid);

impl GenreId {
  pub fn new() -> Self {
    GenreId(Uuid::new_v4())
  }

  pub fn from_uuid(u: Uuid) -> Self {
    GenreId(u)
  }

  pub fn as_uuid(&self) -> Uuid {
    self.0
  }
}

impl Default for GenreId {
  fn default() -> Self {
    GenreId::new()
  }
}

impl From<Uuid> for GenreId {
  fn from(u: Uuid) -> Self {
    GenreId(u)
  }
}

impl From<GenreId> for Uuid {
  fn from(id: GenreId) -> Self {
    id.0
  }
}

impl fmt::Display for GenreId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// Identificador único de un usuario regular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
  pub fn new() -> Self {
    UserId(Uuid::new_v4())
  }

  pub fn from_uuid(u: Uuid) -> Self {
    UserId(u)
  }

  pub fn as_uuid(&self) -> Uuid {
    self.0
  }
}

impl Default for UserId {
  fn default() -> Self {
    UserId::new()
  }
}

impl From<Uuid> for UserId {
  fn from(u: Uuid) -> Self {
    UserId(u)
  }
}

impl From<UserId> for Uuid {
  fn from(id: UserId) -> Self {
    id.0
  }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// Identificador único de un administrador.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdminId(Uuid);

impl AdminId {
  pub fn new() -> Self {
    AdminId(Uuid::new_v4())
  }

  pub fn from_uuid(u: Uuid) -> Self {
    AdminId(u)
  }

  pub fn as_uuid(&self) -> Uuid {
    self.0
  }
}

impl Default for AdminId {
  fn default() -> Self {
    AdminId::new()
  }
}

impl From<Uuid> for AdminId {
  fn from(u: Uuid) -> Self {
    AdminId(u)
  }
}

impl From<AdminId> for Uuid {
  fn from(id: AdminId) -> Self {
    id.0
  }
}

impl fmt::Display for AdminId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}
