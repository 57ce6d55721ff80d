//! Semantic cache domain: records, codec, configuration and the
//! index/store seams.

pub mod codec;
mod config;
mod record;
mod store;

pub use config::SemanticCacheConfig;
pub use record::{ResponseRecord, SimilarityMatch, VectorRecord};
pub use store::{RecordStore, SimilarityIndex};
