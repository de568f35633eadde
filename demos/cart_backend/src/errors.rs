// cart_backend/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use storefront_cart::model::ApiEnvelope;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Internal Server Error: {0}")]
  Internal(String), // For miscellaneous errors
}

impl AppError {
  /// The text placed in the envelope's `error` field.
  fn client_message(&self) -> String {
    match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) => m.clone(),
      AppError::Config(_) => "Configuration issue".to_string(),
      AppError::Internal(_) => "An internal error occurred".to_string(),
    }
  }
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience in handlers
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    AppError::Internal(err.to_string())
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    HttpResponse::build(self.status_code()).json(ApiEnvelope::<()>::failure(self.client_message()))
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
