// cart_backend/src/lib.rs

//! In-memory storefront backend serving the cart REST API consumed by
//! `storefront_cart::HttpCartClient`.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod web;
