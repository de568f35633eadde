// storefront_cart/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Message shown when the transport fails or the server gives no usable reason.
pub const GENERIC_NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";

#[derive(Debug, Error)]
pub enum CartError {
  /// The request never produced an HTTP response (DNS, connect, timeout, reset).
  #[error("Network failure: {0}")]
  Network(String),

  /// The server answered with a non-2xx status or a `success: false` envelope.
  #[error("Cart API error (status {status}): {message}")]
  Api { status: u16, message: String },

  #[error("Failed to decode cart payload: {0}")]
  Decode(String),

  #[error("Local storage error for key '{key}': {message}")]
  Storage { key: String, message: String },

  #[error("Validation error: {0}")]
  Validation(String),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Internal cart error: {source}")]
  Internal {
    #[source]
    source: AnyhowError,
  },
}

impl CartError {
  /// Human-readable text recorded on the shared cart state for display.
  pub fn user_message(&self) -> String {
    match self {
      CartError::Network(_) => GENERIC_NETWORK_MESSAGE.to_string(),
      CartError::Api { message, .. } => message.clone(),
      CartError::Decode(_) => "The server sent an unexpected cart response.".to_string(),
      CartError::Storage { .. } => "Your cart could not be saved on this device.".to_string(),
      CartError::Validation(m) => m.clone(),
      CartError::Config(m) => format!("Cart is misconfigured: {}", m),
      CartError::Internal { .. } => "Something went wrong with your cart.".to_string(),
    }
  }

  pub fn storage(key: &str, message: impl std::fmt::Display) -> Self {
    CartError::Storage {
      key: key.to_string(),
      message: message.to_string(),
    }
  }
}

impl From<AnyhowError> for CartError {
  fn from(err: AnyhowError) -> Self {
    // Host-provided seams may hand back a CartError wrapped in anyhow.
    match err.downcast::<CartError>() {
      Ok(cart_err) => cart_err,
      Err(err) => CartError::Internal { source: err },
    }
  }
}

impl From<serde_json::Error> for CartError {
  fn from(err: serde_json::Error) -> Self {
    CartError::Decode(err.to_string())
  }
}

pub type CartResult<T, E = CartError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn api_error_surfaces_server_message() {
    let err = CartError::Api {
      status: 409,
      message: "Only 3 left in stock".to_string(),
    };
    assert_eq!(err.user_message(), "Only 3 left in stock");
    assert!(err.to_string().contains("409"));
  }

  #[test]
  fn network_error_uses_generic_message() {
    let err = CartError::Network("connection refused".to_string());
    assert_eq!(err.user_message(), GENERIC_NETWORK_MESSAGE);
  }

  #[test]
  fn anyhow_wrapped_cart_error_keeps_its_variant() {
    let wrapped = AnyhowError::new(CartError::Validation("Pick a size first.".to_string()));
    let err = CartError::from(wrapped);
    assert!(matches!(err, CartError::Validation(_)));
    assert_eq!(err.user_message(), "Pick a size first.");

    let other = CartError::from(anyhow::anyhow!("host store exploded"));
    assert!(matches!(other, CartError::Internal { .. }));
  }
}
