// cart_backend/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use storefront_cart::model::ApiEnvelope;
use tracing::{info, instrument};

use super::cart_handlers::AuthenticatedUser;
use crate::errors::AppError;
use crate::models::User;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct SigninRequest {
  pub email: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
  pub token: String,
  pub user: User,
}

#[instrument(name = "handler::signin", skip(app_state, payload))]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<SigninRequest>,
) -> Result<HttpResponse, AppError> {
  let (user, token) = app_state.sessions.sign_in(&payload.email)?;
  info!(user_id = %user.id, "User signed in.");
  Ok(HttpResponse::Ok().json(ApiEnvelope::ok(SigninResponse { token, user })))
}

#[instrument(name = "handler::signout", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn signout_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  app_state.sessions.sign_out(&auth_user.token);
  Ok(HttpResponse::Ok().json(ApiEnvelope::ok(serde_json::json!({ "signedOut": true }))))
}
