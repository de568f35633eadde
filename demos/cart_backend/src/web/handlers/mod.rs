// cart_backend/src/web/handlers/mod.rs
pub mod auth_handlers;
pub mod cart_handlers;
pub mod product_handlers;
