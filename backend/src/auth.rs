use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use solfa_core::CoreError;
use solfa_core::domain::ids::AdminId;
use solfa_core::domain::user::Role;
use solfa_core::ports::accounts::{PasswordError, PasswordHasher};

use crate::error::ApiError;
use crate::state::AppState;

/// Password hashing strategy used by the account service.
#[derive(Debug, Default, Clone)]
pub struct BcryptHasher;

impl PasswordHasher for BcryptHasher {
  fn hash(&self, password: &str) -> Result<String, PasswordError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| PasswordError(e.to_string()))
  }

  fn verify(&self, password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
  }
}

#[derive(Debug, thiserror::Error)]
#[error("token error: {0}")]
pub struct TokenError(String);

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  /// Subject: the principal's id as a UUID string.
  pub sub: String,
  pub role: Role,
  pub exp: u64,
}

/// Issues and verifies HS256 Bearer tokens.
pub struct TokenIssuer {
  encoding: EncodingKey,
  decoding: DecodingKey,
  validation: Validation,
  ttl_secs: u64,
}

impl TokenIssuer {
  pub fn new(secret: &str, ttl_secs: u64) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation: Validation::new(Algorithm::HS256),
      ttl_secs,
    }
  }

  pub fn issue(&self, subject: Uuid, role: Role) -> Result<String, TokenError> {
    let claims = Claims {
      sub: subject.to_string(),
      role,
      exp: jsonwebtoken::get_current_timestamp() + self.ttl_secs,
    };
    encode(&Header::default(), &claims, &self.encoding).map_err(|e| TokenError(e.to_string()))
  }

  pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
    decode::<Claims>(token, &self.decoding, &self.validation)
      .map(|data| data.claims)
      .map_err(|e| TokenError(e.to_string()))
  }
}

impl From<TokenError> for ApiError {
  fn from(err: TokenError) -> Self {
    ApiError::Internal(err.to_string())
  }
}

/// Any authenticated principal, user or admin.
#[derive(Debug, Clone, Copy)]
pub struct AuthPrincipal {
  pub subject: Uuid,
  pub role: Role,
}

impl FromRequestParts<AppState> for AuthPrincipal {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
    let unauthorized = || ApiError::Core(CoreError::Unauthorized);

    let header = parts
      .headers
      .get(AUTHORIZATION)
      .and_then(|value| value.to_str().ok())
      .ok_or_else(unauthorized)?;
    let token = header.strip_prefix("Bearer ").ok_or_else(unauthorized)?;

    let claims = state.tokens.verify(token).map_err(|_| unauthorized())?;
    let subject = Uuid::parse_str(&claims.sub).map_err(|_| unauthorized())?;
    Ok(AuthPrincipal { subject, role: claims.role })
  }
}

/// An authenticated admin. Rejects valid user tokens with 403.
#[derive(Debug, Clone, Copy)]
pub struct AdminPrincipal {
  pub id: AdminId,
}

impl FromRequestParts<AppState> for AdminPrincipal {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
    let principal = AuthPrincipal::from_request_parts(parts, state).await?;
    if principal.role != Role::Admin {
      return Err(ApiError::Forbidden);
    }
    Ok(AdminPrincipal { id: AdminId::from_uuid(principal.subject) })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn token_roundtrip_preserves_subject_and_role() {
    let issuer = TokenIssuer::new("secret", 3600);
    let subject = Uuid::new_v4();

    let token = issuer.issue(subject, Role::Admin).unwrap();
    let claims = issuer.verify(&token).unwrap();

    assert_eq!(claims.sub, subject.to_string());
    assert_eq!(claims.role, Role::Admin);
  }

  #[test]
  fn token_signed_with_another_secret_is_rejected() {
    let issuer = TokenIssuer::new("secret", 3600);
    let other = TokenIssuer::new("different", 3600);

    let token = other.issue(Uuid::new_v4(), Role::User).unwrap();
    assert!(issuer.verify(&token).is_err());
  }

  #[test]
  fn expired_token_is_rejected() {
    let issuer = TokenIssuer::new("secret", 3600);
    // Expired well past the default validation leeway.
    let claims = Claims {
      sub: Uuid::new_v4().to_string(),
      role: Role::User,
      exp: jsonwebtoken::get_current_timestamp() - 600,
    };
    let token =
      encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();

    assert!(issuer.verify(&token).is_err());
  }

  #[test]
  fn bcrypt_hash_verifies_only_the_original_password() {
    let hasher = BcryptHasher;
    let hash = hasher.hash("correct horse").unwrap();

    assert!(hasher.verify("correct horse", &hash));
    assert!(!hasher.verify("wrong battery", &hash));
    assert!(!hasher.verify("correct horse", "not-a-bcrypt-hash"));
  }
}
