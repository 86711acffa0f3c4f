//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod character_repo;
pub mod quote_repo;
pub mod source_repo;
pub mod user_repo;

pub use character_repo::CharacterRepo;
pub use quote_repo::QuoteRepo;
pub use source_repo::SourceRepo;
pub use user_repo::UserRepo;
