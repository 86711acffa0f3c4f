//! Request extractors for the caller's identity.
//!
//! - [`auth::AuthUser`] -- requires a valid bearer token.
//! - [`auth::MaybeAuthUser`] -- reads the token when one is usable.

pub mod auth;
