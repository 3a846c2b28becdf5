//! `silversport-auth`: bearer token issuing and verification.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod jwt;

pub use claims::{JwtClaims, TOKEN_TTL_SECS, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtIssuer, Hs256JwtValidator, JwtIssuer, JwtValidator, TokenError};
