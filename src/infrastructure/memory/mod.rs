//! In-memory index/store implementation
//!
//! Linear-scan stand-in for the Valkey backend: one struct serves both
//! the similarity index and record store seams so the two halves of a
//! pair stay together. Suitable for local development and tests, not
//! for production volumes.

mod store;

pub use store::InMemoryCache;
