//! Embedding provider implementations

mod titan;

pub use titan::TitanEmbeddingProvider;
