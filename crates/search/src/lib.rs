//! Secondary keyword index over characters, quotes and sources.
//!
//! The index is never the system of record: reads return ranked id lists
//! that the caller re-fetches from Postgres, and writes are best-effort
//! upserts of a slim document per entity.

pub mod client;
pub mod documents;
pub mod error;
pub mod query;

pub use client::{SearchClient, SearchConfig, SearchHits};
pub use error::SearchError;
