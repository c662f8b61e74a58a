//! REST API server module.
//!
//! Provides HTTP endpoints for registering users and managing affiliate
//! platforms, links and their performance metrics.

pub mod auth_service;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod resource_service;
pub mod routes;
pub mod server;
pub mod validation;

pub use server::{ApiServer, ApiServerConfig, AppState};
