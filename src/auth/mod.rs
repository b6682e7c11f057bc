//! Credentials and bearer tokens.
//!
//! [`token::TokenService`] signs and checks access tokens; [`password`] wraps
//! the slow salted hash used for stored credentials.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{TokenError, TokenService};
