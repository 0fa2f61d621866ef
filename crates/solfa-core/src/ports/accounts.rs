use crate::domain::ids::{AdminId, UserId};
use crate::domain::user::{AdminRecord, UserRecord};
use crate::ports::catalog::CatalogError;

/// Port de persistencia de cuentas (usuarios y administradores).
///
/// Comparte el tipo de error con [`CatalogStore`](crate::ports::CatalogStore):
/// en la práctica ambos ports los implementa el mismo store relacional.
pub trait AccountStore: Send + Sync {
  fn list_users(&self) -> Result<Vec<UserRecord>, CatalogError>;
  fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, CatalogError>;
  fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, CatalogError>;
  fn insert_user(
    &self,
    email: &str,
    username: &str,
    password_hash: &str,
  ) -> Result<UserRecord, CatalogError>;
  /// Actualiza email y, si vienen, username y/o hash. Devuelve filas afectadas.
  fn update_user(
    &self,
    id: UserId,
    email: &str,
    username: Option<&str>,
    password_hash: Option<&str>,
  ) -> Result<usize, CatalogError>;
  fn delete_user(&self, id: UserId) -> Result<usize, CatalogError>;
  /// ¿Existe otro usuario (distinto de `exclude`) con este email?
  fn user_email_taken(&self, email: &str, exclude: Option<UserId>) -> Result<bool, CatalogError>;
  fn username_taken(&self, username: &str, exclude: Option<UserId>) -> Result<bool, CatalogError>;

  fn list_admins(&self) -> Result<Vec<AdminRecord>, CatalogError>;
  fn find_admin(&self, id: AdminId) -> Result<Option<AdminRecord>, CatalogError>;
  fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminRecord>, CatalogError>;
  fn insert_admin(&self, email: &str, password_hash: &str) -> Result<AdminRecord, CatalogError>;
  fn update_admin(
    &self,
    id: AdminId,
    email: &str,
    password_hash: Option<&str>,
  ) -> Result<usize, CatalogError>;
  fn delete_admin(&self, id: AdminId) -> Result<usize, CatalogError>;
  fn admin_email_taken(&self, email: &str, exclude: Option<AdminId>) -> Result<bool, CatalogError>;
}

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(pub String);

/// Port de hashing de contraseñas. Mantiene el algoritmo concreto (bcrypt en
/// el backend) fuera del núcleo.
pub trait PasswordHasher: Send + Sync {
  fn hash(&self, password: &str) -> Result<String, PasswordError>;
  fn verify(&self, password: &str, hash: &str) -> bool;
}
