// cart_backend/src/web/routes.rs

use crate::web::handlers::{auth_handlers, cart_handlers, product_handlers};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/auth")
          .route("/signin", web::post().to(auth_handlers::signin_handler))
          .route("/signout", web::post().to(auth_handlers::signout_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("", web::delete().to(cart_handlers::clear_cart_handler))
          .route("/items", web::post().to(cart_handlers::add_item_handler))
          .route("/items/{product_id}", web::put().to(cart_handlers::update_item_handler))
          .route("/items/{product_id}", web::delete().to(cart_handlers::remove_item_handler))
          .route("/merge", web::post().to(cart_handlers::merge_cart_handler)),
      ),
  );
}
