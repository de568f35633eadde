// cart_backend/src/models/mod.rs

//! Catalog and account records held by the in-memory backend.

pub mod product;
pub mod user;

pub use product::{Product, ProductVariant};
pub use user::User;
