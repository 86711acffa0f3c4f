//! Domain types and pure helpers shared by the store, search, and HTTP layers.
//!
//! Nothing in this crate performs I/O.

pub mod catalog;
pub mod error;
pub mod flags;
pub mod likes;
pub mod ordering;
pub mod pagination;
pub mod types;
