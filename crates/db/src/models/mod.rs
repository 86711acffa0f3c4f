//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - An insert DTO and a full-replace field set for updates
//! - A `Serialize` view type used in API responses, with internal
//!   reference fields either hydrated or stripped

pub mod character;
pub mod quote;
pub mod source;
pub mod user;
