//! Authentication infrastructure module
//!
//! This module provides session token validation for account-scoped routes.

mod jwt;

pub use jwt::{JwtConfig, JwtService, SessionClaims};
