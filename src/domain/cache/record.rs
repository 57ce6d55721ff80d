//! Persisted cache record types
//!
//! A cached answer is stored as two hash records sharing one generated
//! identifier: the vector record (indexed for similarity search) and the
//! response record (the answer plus its cost metadata). Both are written
//! once at cache-miss time and never mutated.

use serde::{Deserialize, Serialize};

/// The embedding half of a cached pair, written under the vector key
/// prefix so the similarity index picks it up.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    /// Identifier shared with the paired [`ResponseRecord`]
    pub id: String,
    /// Fixed-dimension embedding of the original request text
    pub embedding: Vec<f32>,
    /// Unix timestamp (seconds) of creation
    pub timestamp: u64,
}

impl VectorRecord {
    pub fn new(id: impl Into<String>, embedding: Vec<f32>, timestamp: u64) -> Self {
        Self {
            id: id.into(),
            embedding,
            timestamp,
        }
    }
}

/// The answer half of a cached pair: original request, stored response
/// and the token/cost accounting captured when the responder ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Identifier shared with the paired [`VectorRecord`]
    pub id: String,
    /// The request text that produced this response
    pub request_text: String,
    /// The responder's answer, served verbatim on a cache hit
    pub response_text: String,
    /// Real input token count reported by the responder
    pub input_tokens: u32,
    /// Real output token count reported by the responder
    pub output_tokens: u32,
    /// Monetary cost of the original responder invocation, in dollars
    pub cost: f64,
    /// Unix timestamp (seconds) of creation
    pub timestamp: u64,
}

impl ResponseRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        request_text: impl Into<String>,
        response_text: impl Into<String>,
        input_tokens: u32,
        output_tokens: u32,
        cost: f64,
        timestamp: u64,
    ) -> Self {
        Self {
            id: id.into(),
            request_text: request_text.into(),
            response_text: response_text.into(),
            input_tokens,
            output_tokens,
            cost,
            timestamp,
        }
    }
}

/// A single nearest-neighbor candidate returned by the similarity index.
///
/// Transient: valid only for the decision cycle that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    /// Identifier of the candidate pair
    pub id: String,
    /// Similarity in `[0, 1]`, derived as `1 - distance` from the
    /// index's cosine distance over normalized embeddings
    pub similarity: f32,
}

impl SimilarityMatch {
    pub fn new(id: impl Into<String>, similarity: f32) -> Self {
        Self {
            id: id.into(),
            similarity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_shares_identifier() {
        let vector = VectorRecord::new("abc-123", vec![0.1, 0.2], 1_700_000_000);
        let response =
            ResponseRecord::new("abc-123", "where is my order?", "it shipped", 40, 25, 0.0005, 1_700_000_000);

        assert_eq!(vector.id, response.id);
    }

    #[test]
    fn test_response_record_serde_round_trip() {
        let record = ResponseRecord::new("id-1", "q", "a", 10, 20, 0.00033, 1_700_000_000);

        let json = serde_json::to_string(&record).unwrap();
        let restored: ResponseRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, restored);
    }
}
