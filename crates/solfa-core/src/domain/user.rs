use serde::{Deserialize, Serialize};

use crate::domain::ids::{AdminId, UserId};

/// Rol de un principal autenticado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Admin,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::User => "user",
      Role::Admin => "admin",
    }
  }
}

/// Un usuario regular, tal como se expone a los clientes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: UserId,
  pub email: String,
  pub username: String,
}

/// Fila completa de usuario, incluido el hash de contraseña.
///
/// Nunca sale del núcleo: las capas superiores solo ven [`User`].
#[derive(Debug, Clone)]
pub struct UserRecord {
  pub id: UserId,
  pub email: String,
  pub username: String,
  pub password_hash: String,
}

impl From<UserRecord> for User {
  fn from(record: UserRecord) -> Self {
    User { id: record.id, email: record.email, username: record.username }
  }
}

/// Un administrador, tal como se expone a los clientes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
  pub id: AdminId,
  pub email: String,
}

/// Fila completa de administrador, incluido el hash de contraseña.
#[derive(Debug, Clone)]
pub struct AdminRecord {
  pub id: AdminId,
  pub email: String,
  pub password_hash: String,
}

impl From<AdminRecord> for Admin {
  fn from(record: AdminRecord) -> Self {
    Admin { id: record.id, email: record.email }
  }
}
