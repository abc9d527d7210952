//! # Actix Middleware Library
//!
//! Middleware shared by the discussion services
//!
//! ## Modules
//! - `identity`: resolves the forwarded, already-authenticated caller
//! - `logging`: request/response logging

pub mod identity;
pub mod logging;

pub use identity::{Identity, IdentityMiddleware, IdentityPolicy};
pub use logging::Logging;
