//! Valkey/Redis implementations of the index and store seams

mod admin;
mod client;
mod index;
mod store;

pub use admin::{CacheAdmin, HealthReport};
pub use client::{connect, ValkeyConfig};
pub use index::ValkeySimilarityIndex;
pub use store::ValkeyRecordStore;
