//! Similarity index and record store traits
//!
//! Both facets are typically served by one Valkey/Redis deployment, but
//! the decision engine only ever sees these seams.

use std::fmt::Debug;

use async_trait::async_trait;

use super::{ResponseRecord, SimilarityMatch, VectorRecord};
use crate::domain::DomainError;

/// Nearest-neighbor search over previously cached request embeddings
#[async_trait]
pub trait SimilarityIndex: Send + Sync + Debug {
    /// Find up to `k` nearest neighbors of `vector`, ordered by
    /// descending similarity.
    ///
    /// An empty result means "no match" and is not an error; a transport
    /// or index failure surfaces as [`DomainError::IndexUnavailable`] so
    /// callers can tell an outage from a cold cache.
    async fn search(&self, vector: &[f32], k: usize)
        -> Result<Vec<SimilarityMatch>, DomainError>;
}

/// Persistence for the vector/response record pair
#[async_trait]
pub trait RecordStore: Send + Sync + Debug {
    /// Write the embedding half of a pair
    async fn put_vector(&self, record: &VectorRecord) -> Result<(), DomainError>;

    /// Write the response half of a pair
    async fn put_response(&self, record: &ResponseRecord) -> Result<(), DomainError>;

    /// Write both halves of a pair.
    ///
    /// Implementations should make this atomic where the backend allows
    /// it; either way, [`RecordStore::get_response`] must treat a
    /// vector-only partial state as absent.
    async fn put_pair(
        &self,
        vector: &VectorRecord,
        response: &ResponseRecord,
    ) -> Result<(), DomainError> {
        self.put_vector(vector).await?;
        self.put_response(response).await
    }

    /// Fetch a response record by identifier.
    ///
    /// Returns `Ok(None)` for an unknown identifier or an incomplete
    /// record, never an error for plain absence.
    async fn get_response(&self, id: &str) -> Result<Option<ResponseRecord>, DomainError>;
}
