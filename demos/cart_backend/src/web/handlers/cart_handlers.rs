// cart_backend/src/web/handlers/cart_handlers.rs

use actix_web::{http::header, web, FromRequest, HttpRequest, HttpResponse};
use serde::Deserialize;
use storefront_cart::model::{AddCartItemRequest, ApiEnvelope, MergeCartRequest, UpdateCartItemRequest};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// The user behind the request's `Authorization: Bearer <token>` header.
#[derive(Debug)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
  pub token: String,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    futures_util::future::ready(authenticate(req))
  }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let token = req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|token| !token.is_empty())
    .ok_or_else(|| {
      warn!("AuthenticatedUser extractor: missing bearer token.");
      AppError::Auth("Authentication required".to_string())
    })?;
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;
  let user_id = state.sessions.resolve(token)?;
  Ok(AuthenticatedUser {
    user_id,
    token: token.to_string(),
  })
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VariantQuery {
  pub variant_id: Option<String>,
}

#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(ApiEnvelope::ok(app_state.carts.get(auth_user.user_id))))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, payload, auth_user),
  fields(user_id = %auth_user.user_id, product_id = %payload.product_id, quantity = payload.quantity)
)]
pub async fn add_item_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<AddCartItemRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let cart = app_state.carts.add_item(
    auth_user.user_id,
    &payload.product_id,
    payload.quantity,
    payload.variant_id.as_deref(),
  )?;
  info!(item_count = cart.item_count, "Item added to cart.");
  Ok(HttpResponse::Ok().json(ApiEnvelope::ok(cart)))
}

#[instrument(
  name = "handler::update_cart_item",
  skip(app_state, path, payload, auth_user),
  fields(user_id = %auth_user.user_id, product_id = %path.as_ref())
)]
pub async fn update_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<UpdateCartItemRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let cart = app_state.carts.update_item(
    auth_user.user_id,
    &product_id,
    payload.quantity,
    payload.variant_id.as_deref(),
  )?;
  Ok(HttpResponse::Ok().json(ApiEnvelope::ok(cart)))
}

#[instrument(
  name = "handler::remove_cart_item",
  skip(app_state, path, query, auth_user),
  fields(user_id = %auth_user.user_id, product_id = %path.as_ref())
)]
pub async fn remove_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  query: web::Query<VariantQuery>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let cart = app_state
    .carts
    .remove_item(auth_user.user_id, &product_id, query.variant_id.as_deref())?;
  Ok(HttpResponse::Ok().json(ApiEnvelope::ok(cart)))
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(ApiEnvelope::ok(app_state.carts.clear(auth_user.user_id))))
}

#[instrument(
  name = "handler::merge_cart",
  skip(app_state, payload, auth_user),
  fields(user_id = %auth_user.user_id, lines = payload.items.len())
)]
pub async fn merge_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<MergeCartRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let cart = app_state.carts.merge(auth_user.user_id, &payload.items)?;
  info!(item_count = cart.item_count, "Guest cart merged.");
  Ok(HttpResponse::Ok().json(ApiEnvelope::ok(cart)))
}
