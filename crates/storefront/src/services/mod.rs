//! Business logic services for storefront.
//!
//! - [`auth`] - Login, registration and password changes (argon2 hashes)

pub mod auth;
