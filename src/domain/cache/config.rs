//! Semantic cache configuration

use serde::{Deserialize, Serialize};

/// Configuration for the similarity-gated cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// Minimum similarity for a nearest neighbor to count as a hit,
    /// compared with `>=` semantics (a match exactly at the cutoff hits)
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Embedding dimension; every vector crossing the cache boundary
    /// must have exactly this length
    #[serde(default = "default_vector_dim")]
    pub vector_dim: usize,

    /// Name of the server-side vector index
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Key prefix for vector records (the index is built over this prefix)
    #[serde(default = "default_vector_key_prefix")]
    pub vector_key_prefix: String,

    /// Key prefix for response records
    #[serde(default = "default_response_key_prefix")]
    pub response_key_prefix: String,

    /// HNSW graph connectivity (index creation only)
    #[serde(default = "default_hnsw_m")]
    pub hnsw_m: u32,

    /// HNSW build-time search depth (index creation only)
    #[serde(default = "default_hnsw_ef_construction")]
    pub hnsw_ef_construction: u32,
}

fn default_similarity_threshold() -> f32 {
    0.85
}

fn default_vector_dim() -> usize {
    1024
}

fn default_index_name() -> String {
    "idx:requests".to_string()
}

fn default_vector_key_prefix() -> String {
    "request:vector:".to_string()
}

fn default_response_key_prefix() -> String {
    "rr:".to_string()
}

fn default_hnsw_m() -> u32 {
    16
}

fn default_hnsw_ef_construction() -> u32 {
    200
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            vector_dim: default_vector_dim(),
            index_name: default_index_name(),
            vector_key_prefix: default_vector_key_prefix(),
            response_key_prefix: default_response_key_prefix(),
            hnsw_m: default_hnsw_m(),
            hnsw_ef_construction: default_hnsw_ef_construction(),
        }
    }
}

impl SemanticCacheConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the similarity threshold
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the embedding dimension
    pub fn with_vector_dim(mut self, dim: usize) -> Self {
        self.vector_dim = dim;
        self
    }

    /// Set the index name
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    /// Full key for a vector record
    pub fn vector_key(&self, id: &str) -> String {
        format!("{}{}", self.vector_key_prefix, id)
    }

    /// Full key for a response record
    pub fn response_key(&self, id: &str) -> String {
        format!("{}{}", self.response_key_prefix, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SemanticCacheConfig::default();

        assert!((config.similarity_threshold - 0.85).abs() < 1e-6);
        assert_eq!(config.vector_dim, 1024);
        assert_eq!(config.index_name, "idx:requests");
        assert_eq!(config.vector_key_prefix, "request:vector:");
        assert_eq!(config.response_key_prefix, "rr:");
        assert_eq!(config.hnsw_m, 16);
        assert_eq!(config.hnsw_ef_construction, 200);
    }

    #[test]
    fn test_key_construction() {
        let config = SemanticCacheConfig::default();

        assert_eq!(config.vector_key("abc"), "request:vector:abc");
        assert_eq!(config.response_key("abc"), "rr:abc");
    }

    #[test]
    fn test_similarity_threshold_clamped() {
        let config = SemanticCacheConfig::new().with_similarity_threshold(1.5);
        assert!((config.similarity_threshold - 1.0).abs() < 1e-6);

        let config = SemanticCacheConfig::new().with_similarity_threshold(-0.5);
        assert!(config.similarity_threshold.abs() < 1e-6);
    }
}
