// cart_backend/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use storefront_cart::model::ApiEnvelope;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state.catalog.list();
  info!("Listing {} products.", products.len());
  Ok(HttpResponse::Ok().json(ApiEnvelope::ok(products)))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let product = app_state
    .catalog
    .get(&product_id)
    .cloned()
    .ok_or_else(|| AppError::NotFound(format!("Product '{}' not found.", product_id)))?;
  Ok(HttpResponse::Ok().json(ApiEnvelope::ok(product)))
}
