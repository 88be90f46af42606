//! Auth Service Library
//!
//! Account signup, credential-based signin, JWT issuance and bearer-token
//! identity resolution.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Password hashing and JWT signing/verification
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Bearer-token authentication
//! - `models` - Data models
//! - `repositories` - User store
//! - `routes` - HTTP router
//! - `services` - Business logic layer

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
