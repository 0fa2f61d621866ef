use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use solfa_core::CoreError;

/// Error surfaced to HTTP clients. Every failure leaving a handler becomes
/// one of these; the body shape is always `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
  Core(CoreError),
  /// Valid token, wrong role.
  Forbidden,
  /// Malformed request body or multipart form.
  Malformed(String),
  /// Unexpected server-side failure. Details are logged, never returned.
  Internal(String),
}

impl From<CoreError> for ApiError {
  fn from(err: CoreError) -> Self {
    ApiError::Core(err)
  }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
  fn from(err: axum::extract::multipart::MultipartError) -> Self {
    ApiError::Malformed(err.to_string())
  }
}

impl ApiError {
  fn status_and_message(&self) -> (StatusCode, String) {
    match self {
      ApiError::Core(CoreError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
      ApiError::Core(CoreError::NotFound) => (StatusCode::NOT_FOUND, "not found".to_string()),
      ApiError::Core(CoreError::Conflict(msg)) => (StatusCode::CONFLICT, msg.clone()),
      ApiError::Core(CoreError::Unauthorized) => {
        (StatusCode::UNAUTHORIZED, "invalid credentials".to_string())
      }
      ApiError::Core(CoreError::Upload(_)) => {
        (StatusCode::BAD_GATEWAY, "file storage is unavailable".to_string())
      }
      ApiError::Core(CoreError::Persist(_)) => {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
      }
      ApiError::Forbidden => (StatusCode::FORBIDDEN, "admin access required".to_string()),
      ApiError::Malformed(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
      ApiError::Internal(_) => {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match &self {
      ApiError::Core(CoreError::Upload(err)) => error!(error = %err, "upload failed"),
      ApiError::Core(CoreError::Persist(msg)) => error!(detail = %msg, "persist failed"),
      ApiError::Internal(msg) => error!(detail = %msg, "internal error"),
      _ => {}
    }

    let (status, message) = self.status_and_message();
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use solfa_core::ports::blob::BlobError;

  fn status_of(err: ApiError) -> StatusCode {
    err.status_and_message().0
  }

  #[test]
  fn core_errors_map_to_expected_statuses() {
    assert_eq!(status_of(CoreError::Validation("x".into()).into()), StatusCode::BAD_REQUEST);
    assert_eq!(status_of(CoreError::NotFound.into()), StatusCode::NOT_FOUND);
    assert_eq!(status_of(CoreError::Conflict("x".into()).into()), StatusCode::CONFLICT);
    assert_eq!(status_of(CoreError::Unauthorized.into()), StatusCode::UNAUTHORIZED);
    assert_eq!(
      status_of(CoreError::Upload(BlobError::Transport("t".into())).into()),
      StatusCode::BAD_GATEWAY
    );
    assert_eq!(status_of(CoreError::Persist("x".into()).into()), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn internal_details_never_reach_the_client() {
    let (_, message) = ApiError::Internal("secret detail".into()).status_and_message();
    assert_eq!(message, "internal error");

    let (_, message) =
      ApiError::Core(CoreError::Persist("sql syntax near".into())).status_and_message();
    assert_eq!(message, "internal error");
  }

  #[test]
  fn forbidden_is_distinct_from_unauthorized() {
    assert_eq!(status_of(ApiError::Forbidden), StatusCode::FORBIDDEN);
  }
}
