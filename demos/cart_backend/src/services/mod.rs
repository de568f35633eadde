// cart_backend/src/services/mod.rs

pub mod auth_service;
pub mod cart_store;
pub mod catalog;
