//! Embedding provider trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Trait for embedding providers (Bedrock Titan, etc.)
///
/// A failure here is fatal for the request that triggered it; the cache
/// has no fallback path without an embedding.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed `text` into a vector of exactly `dimensions` floats
    async fn embed(&self, text: &str, dimensions: usize) -> Result<Vec<f32>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

/// Cosine similarity between two vectors, in `[-1, 1]`.
///
/// Mismatched lengths or zero-magnitude inputs yield 0.0 rather than an
/// error; callers treat that as "no match".
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += *x as f64 * *y as f64;
        norm_a += *x as f64 * *x as f64;
        norm_b += *y as f64 * *y as f64;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Deterministic embedding provider for tests: same text, same
    /// vector, normalized to unit length so cosine scores behave.
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        error: Option<String>,
    }

    impl MockEmbeddingProvider {
        pub fn new() -> Self {
            Self { error: None }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }
    }

    impl Default for MockEmbeddingProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, text: &str, dimensions: usize) -> Result<Vec<f32>, DomainError> {
            if let Some(ref error) = self.error {
                return Err(DomainError::upstream(self.provider_name(), error));
            }

            let hash = text.bytes().fold(0u64, |acc, b| {
                acc.wrapping_mul(31).wrapping_add(b as u64)
            });

            let mut vector: Vec<f32> = (0..dimensions)
                .map(|i| ((hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0) - 0.5)
                .collect();

            let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
            if norm > 0.0 {
                for v in &mut vector {
                    *v /= norm;
                }
            }

            Ok(vector)
        }

        fn provider_name(&self) -> &'static str {
            "mock-embedding"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockEmbeddingProvider;
    use super::*;

    #[test]
    fn test_cosine_identical_vectors() {
        let v = vec![0.5, -0.2, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[tokio::test]
    async fn test_mock_is_deterministic() {
        let provider = MockEmbeddingProvider::new();

        let a = provider.embed("hello", 64).await.unwrap();
        let b = provider.embed("hello", 64).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_mock_is_normalized() {
        let provider = MockEmbeddingProvider::new();

        let v = provider.embed("normalize me", 128).await.unwrap();
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();

        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_mock_error() {
        let provider = MockEmbeddingProvider::new().with_error("throttled");

        let result = provider.embed("hello", 64).await;

        assert!(matches!(result, Err(DomainError::Upstream { .. })));
    }
}
