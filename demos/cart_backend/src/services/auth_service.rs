// cart_backend/src/services/auth_service.rs

//! Mock session issuing: sign-in by email returns an opaque bearer token.
//! Tokens live only in process memory.

use crate::errors::AppError;
use crate::models::User;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct SessionRegistry {
  users_by_email: RwLock<HashMap<String, User>>,
  tokens: RwLock<HashMap<String, Uuid>>,
}

impl SessionRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Finds or creates the user for `email` and issues a fresh token.
  #[instrument(name = "auth_service::sign_in", skip(self), err(Display))]
  pub fn sign_in(&self, email: &str) -> Result<(User, String), AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
      return Err(AppError::Validation("A valid email address is required.".to_string()));
    }
    let user = self
      .users_by_email
      .write()
      .entry(email.clone())
      .or_insert_with(|| User {
        id: Uuid::new_v4(),
        email,
        created_at: Utc::now(),
      })
      .clone();
    let token = format!("mock_token_{}", Uuid::new_v4().simple());
    self.tokens.write().insert(token.clone(), user.id);
    debug!(user_id = %user.id, "Issued session token.");
    Ok((user, token))
  }

  pub fn sign_out(&self, token: &str) -> bool {
    self.tokens.write().remove(token).is_some()
  }

  #[instrument(name = "auth_service::resolve_token", skip(self, token), err(Display))]
  pub fn resolve(&self, token: &str) -> Result<Uuid, AppError> {
    self
      .tokens
      .read()
      .get(token)
      .copied()
      .ok_or_else(|| AppError::Auth("Invalid or expired session token.".to_string()))
  }
}
