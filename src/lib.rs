//! Drinks menu service library.
//!
//! A small CRUD backend for a coffee-shop drinks menu:
//!
//! - Public summary listing of the menu
//! - Permission-gated detail reads and create/update/delete
//! - Access tokens validated against the identity provider's JWKS (RS256)
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> middleware/auth.rs -> handlers/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `auth` - JWKS client, JWT validation, claims and permission checks
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Bearer token authentication middleware
//! - `models` - Data models and request/response types
//! - `repositories` - Database access
//! - `routes` - Axum router setup

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
