//! In-memory similarity index and record store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::cache::{
    RecordStore, ResponseRecord, SimilarityIndex, SimilarityMatch, VectorRecord,
};
use crate::domain::embedding::cosine_similarity;
use crate::domain::DomainError;

/// Brute-force in-process cache backend
#[derive(Debug, Default)]
pub struct InMemoryCache {
    vectors: RwLock<HashMap<String, VectorRecord>>,
    responses: RwLock<HashMap<String, ResponseRecord>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored pairs (vector records)
    pub fn len(&self) -> usize {
        self.vectors.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything, both halves
    pub fn clear(&self) {
        self.vectors
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.responses
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[async_trait]
impl SimilarityIndex for InMemoryCache {
    async fn search(
        &self,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<SimilarityMatch>, DomainError> {
        if k == 0 {
            return Err(DomainError::validation("k must be at least 1"));
        }

        let vectors = self
            .vectors
            .read()
            .map_err(|e| DomainError::internal(format!("vector lock poisoned: {}", e)))?;

        let mut matches: Vec<SimilarityMatch> = vectors
            .values()
            .map(|record| {
                SimilarityMatch::new(
                    record.id.clone(),
                    cosine_similarity(vector, &record.embedding),
                )
            })
            .collect();

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(k);

        Ok(matches)
    }
}

#[async_trait]
impl RecordStore for InMemoryCache {
    async fn put_vector(&self, record: &VectorRecord) -> Result<(), DomainError> {
        self.vectors
            .write()
            .map_err(|e| DomainError::internal(format!("vector lock poisoned: {}", e)))?
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn put_response(&self, record: &ResponseRecord) -> Result<(), DomainError> {
        self.responses
            .write()
            .map_err(|e| DomainError::internal(format!("response lock poisoned: {}", e)))?
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_response(&self, id: &str) -> Result<Option<ResponseRecord>, DomainError> {
        let responses = self
            .responses
            .read()
            .map_err(|e| DomainError::internal(format!("response lock poisoned: {}", e)))?;

        Ok(responses.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(x: f32, y: f32) -> Vec<f32> {
        let norm = (x * x + y * y).sqrt();
        vec![x / norm, y / norm]
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let cache = InMemoryCache::new();

        cache
            .put_vector(&VectorRecord::new("close", unit(1.0, 0.1), 1))
            .await
            .unwrap();
        cache
            .put_vector(&VectorRecord::new("far", unit(0.0, 1.0), 2))
            .await
            .unwrap();

        let matches = cache.search(&unit(1.0, 0.0), 2).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "close");
        assert!(matches[0].similarity > matches[1].similarity);
    }

    #[tokio::test]
    async fn test_search_truncates_to_k() {
        let cache = InMemoryCache::new();
        for i in 0..5 {
            cache
                .put_vector(&VectorRecord::new(format!("v{}", i), unit(1.0, i as f32), i))
                .await
                .unwrap();
        }

        let matches = cache.search(&unit(1.0, 0.0), 1).await.unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn test_search_empty_store_returns_empty() {
        let cache = InMemoryCache::new();
        let matches = cache.search(&unit(1.0, 0.0), 1).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_zero_k() {
        let cache = InMemoryCache::new();
        let result = cache.search(&unit(1.0, 0.0), 0).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_get_response_round_trip() {
        let cache = InMemoryCache::new();
        let record = ResponseRecord::new("abc", "q", "a", 10, 20, 0.0003, 1);

        cache.put_response(&record).await.unwrap();

        assert_eq!(cache.get_response("abc").await.unwrap(), Some(record));
        assert_eq!(cache.get_response("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_vector_without_response_reads_absent() {
        let cache = InMemoryCache::new();
        cache
            .put_vector(&VectorRecord::new("orphan", unit(1.0, 0.0), 1))
            .await
            .unwrap();

        // The partial-write state: indexed but unreadable
        assert!(cache.get_response("orphan").await.unwrap().is_none());
        assert_eq!(cache.len(), 1);
    }
}
