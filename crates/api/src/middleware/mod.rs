//! Authentication middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated principal (with its
//!   permission snapshot) from a JWT Bearer token.

pub mod auth;
