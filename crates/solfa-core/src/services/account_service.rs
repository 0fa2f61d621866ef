use rand::RngExt;
use tracing::debug;

use crate::domain::ids::{AdminId, UserId};
use crate::domain::user::{Admin, User};
use crate::errors::CoreError;
use crate::ports::accounts::{AccountStore, PasswordError, PasswordHasher};

/// Longitud mínima de contraseña aceptada en registro y cambios.
const MIN_PASSWORD_LEN: usize = 8;

/// Servicio de cuentas: usuarios regulares y administradores.
///
/// El hash de contraseñas queda detrás del port [`PasswordHasher`]; el núcleo
/// nunca ve el algoritmo concreto ni compara hashes a mano.
pub struct AccountService<A, H>
where
  A: AccountStore,
  H: PasswordHasher,
{
  accounts: A,
  hasher: H,
}

impl<A, H> AccountService<A, H>
where
  A: AccountStore,
  H: PasswordHasher,
{
  pub fn new(accounts: A, hasher: H) -> Self {
    Self { accounts, hasher }
  }

  // -------- Usuarios --------

  pub fn list_users(&self) -> Result<Vec<User>, CoreError> {
    Ok(self.accounts.list_users()?.into_iter().map(User::from).collect())
  }

  pub fn get_user(&self, id: UserId) -> Result<User, CoreError> {
    self.accounts.find_user(id)?.map(User::from).ok_or(CoreError::NotFound)
  }

  /// Registra un usuario. El username es opcional: si viene se valida y se
  /// reclama, y si no, se genera uno libre (`userNNNNNN`).
  pub fn register_user(
    &self,
    email: &str,
    password: &str,
    username: Option<&str>,
  ) -> Result<User, CoreError> {
    let email = normalized_email(email)?;
    validate_password(password)?;
    if self.accounts.user_email_taken(&email, None)? {
      return Err(CoreError::Conflict("email already registered".into()));
    }

    let username = match username {
      Some(name) => {
        let name = name.trim();
        if name.is_empty() {
          return Err(CoreError::Validation("username must not be empty".into()));
        }
        if self.accounts.username_taken(name, None)? {
          return Err(CoreError::Conflict("username already taken".into()));
        }
        name.to_string()
      }
      None => self.fresh_username()?,
    };
    let hash = self.hasher.hash(password).map_err(hash_failure)?;
    let record = self.accounts.insert_user(&email, &username, &hash)?;
    debug!(user = %record.id, "registered user");
    Ok(record.into())
  }

  /// Verifica credenciales y devuelve el usuario. Cualquier fallo (email
  /// desconocido o contraseña incorrecta) responde igual, sin distinguir.
  pub fn login_user(&self, email: &str, password: &str) -> Result<User, CoreError> {
    let email = normalized_email(email).map_err(|_| CoreError::Unauthorized)?;
    let record = self.accounts.find_user_by_email(&email)?.ok_or(CoreError::Unauthorized)?;
    if !self.hasher.verify(password, &record.password_hash) {
      return Err(CoreError::Unauthorized);
    }
    Ok(record.into())
  }

  pub fn update_user(
    &self,
    id: UserId,
    email: &str,
    username: Option<&str>,
    password: Option<&str>,
  ) -> Result<User, CoreError> {
    let email = normalized_email(email)?;
    if self.accounts.user_email_taken(&email, Some(id))? {
      return Err(CoreError::Conflict("email already registered".into()));
    }
    if let Some(username) = username {
      if username.trim().is_empty() {
        return Err(CoreError::Validation("username must not be empty".into()));
      }
      if self.accounts.username_taken(username, Some(id))? {
        return Err(CoreError::Conflict("username already taken".into()));
      }
    }
    let hash = match password {
      Some(password) => {
        validate_password(password)?;
        Some(self.hasher.hash(password).map_err(hash_failure)?)
      }
      None => None,
    };

    let affected = self.accounts.update_user(id, &email, username, hash.as_deref())?;
    if affected == 0 {
      return Err(CoreError::NotFound);
    }
    self.get_user(id)
  }

  pub fn delete_user(&self, id: UserId) -> Result<(), CoreError> {
    if self.accounts.delete_user(id)? == 0 {
      return Err(CoreError::NotFound);
    }
    Ok(())
  }

  // -------- Administradores --------

  pub fn list_admins(&self) -> Result<Vec<Admin>, CoreError> {
    Ok(self.accounts.list_admins()?.into_iter().map(Admin::from).collect())
  }

  pub fn get_admin(&self, id: AdminId) -> Result<Admin, CoreError> {
    self.accounts.find_admin(id)?.map(Admin::from).ok_or(CoreError::NotFound)
  }

  pub fn create_admin(&self, email: &str, password: &str) -> Result<Admin, CoreError> {
    let email = normalized_email(email)?;
    validate_password(password)?;
    if self.accounts.admin_email_taken(&email, None)? {
      return Err(CoreError::Conflict("email already registered".into()));
    }
    let hash = self.hasher.hash(password).map_err(hash_failure)?;
    let record = self.accounts.insert_admin(&email, &hash)?;
    debug!(admin = %record.id, "created admin");
    Ok(record.into())
  }

  pub fn login_admin(&self, email: &str, password: &str) -> Result<Admin, CoreError> {
    let email = normalized_email(email).map_err(|_| CoreError::Unauthorized)?;
    let record = self.accounts.find_admin_by_email(&email)?.ok_or(CoreError::Unauthorized)?;
    if !self.hasher.verify(password, &record.password_hash) {
      return Err(CoreError::Unauthorized);
    }
    Ok(record.into())
  }

  pub fn update_admin(
    &self,
    id: AdminId,
    email: &str,
    password: Option<&str>,
  ) -> Result<Admin, CoreError> {
    let email = normalized_email(email)?;
    if self.accounts.admin_email_taken(&email, Some(id))? {
      return Err(CoreError::Conflict("email already registered".into()));
    }
    let hash = match password {
      Some(password) => {
        validate_password(password)?;
        Some(self.hasher.hash(password).map_err(hash_failure)?)
      }
      None => None,
    };

    let affected = self.accounts.update_admin(id, &email, hash.as_deref())?;
    if affected == 0 {
      return Err(CoreError::NotFound);
    }
    self.get_admin(id)
  }

  /// Borra un administrador. Un administrador no puede borrarse a sí mismo:
  /// evita dejar la instancia sin nadie que pueda administrarla.
  pub fn delete_admin(&self, id: AdminId, acting: AdminId) -> Result<(), CoreError> {
    if id == acting {
      return Err(CoreError::Conflict("an admin cannot delete their own account".into()));
    }
    if self.accounts.delete_admin(id)? == 0 {
      return Err(CoreError::NotFound);
    }
    Ok(())
  }

  // -------- Internos --------

  /// Genera un username `userNNNNNN` que no esté en uso. Con seis dígitos las
  /// colisiones son raras; unos pocos reintentos bastan.
  fn fresh_username(&self) -> Result<String, CoreError> {
    for _ in 0..8 {
      let candidate = format!("user{}", rand::rng().random_range(100_000..1_000_000));
      if !self.accounts.username_taken(&candidate, None)? {
        return Ok(candidate);
      }
    }
    Err(CoreError::Persist("could not allocate a free username".into()))
  }
}

fn normalized_email(email: &str) -> Result<String, CoreError> {
  let email = email.trim().to_ascii_lowercase();
  if email.is_empty() || !email.contains('@') {
    return Err(CoreError::Validation("email is not valid".into()));
  }
  Ok(email)
}

fn validate_password(password: &str) -> Result<(), CoreError> {
  if password.len() < MIN_PASSWORD_LEN {
    return Err(CoreError::Validation(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  Ok(())
}

fn hash_failure(err: PasswordError) -> CoreError {
  CoreError::Persist(err.to_string())
}
