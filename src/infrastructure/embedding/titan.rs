//! Bedrock Titan embedding provider

use std::fmt;

use async_trait::async_trait;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::Deserialize;
use serde_json::json;

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

const DEFAULT_MODEL_ID: &str = "amazon.titan-embed-text-v2:0";

/// Embedding provider backed by `InvokeModel` against Titan Text
/// Embeddings V2.
///
/// Requests normalized vectors so that the index's cosine distance
/// stays in `[0, 2]` and `1 - distance` is a meaningful similarity.
#[derive(Clone)]
pub struct TitanEmbeddingProvider {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl fmt::Debug for TitanEmbeddingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TitanEmbeddingProvider")
            .field("model_id", &self.model_id)
            .field("client", &"<Client>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TitanEmbeddingResponse {
    embedding: Vec<f32>,
}

impl TitanEmbeddingProvider {
    pub fn new(client: aws_sdk_bedrockruntime::Client) -> Self {
        Self {
            client,
            model_id: DEFAULT_MODEL_ID.to_string(),
        }
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }
}

#[async_trait]
impl EmbeddingProvider for TitanEmbeddingProvider {
    async fn embed(&self, text: &str, dimensions: usize) -> Result<Vec<f32>, DomainError> {
        let body = json!({
            "inputText": text,
            "dimensions": dimensions,
            "normalize": true,
        });

        let payload = serde_json::to_vec(&body)
            .map_err(|e| DomainError::internal(format!("Failed to encode Titan request: {}", e)))?;

        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|e| DomainError::upstream(self.provider_name(), e.to_string()))?;

        let parsed: TitanEmbeddingResponse = serde_json::from_slice(output.body().as_ref())
            .map_err(|e| {
                DomainError::upstream(
                    self.provider_name(),
                    format!("unexpected response body: {}", e),
                )
            })?;

        if parsed.embedding.len() != dimensions {
            return Err(DomainError::upstream(
                self.provider_name(),
                format!(
                    "model returned {} dimensions, requested {}",
                    parsed.embedding.len(),
                    dimensions
                ),
            ));
        }

        Ok(parsed.embedding)
    }

    fn provider_name(&self) -> &'static str {
        "titan-embed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_body_parsing() {
        let body = r#"{"embedding": [0.1, -0.2, 0.3], "inputTextTokenCount": 5}"#;
        let parsed: TitanEmbeddingResponse = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.embedding, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_request_body_shape() {
        let body = json!({
            "inputText": "where is my order?",
            "dimensions": 1024,
            "normalize": true,
        });

        assert_eq!(body["inputText"], "where is my order?");
        assert_eq!(body["dimensions"], 1024);
        assert_eq!(body["normalize"], true);
    }
}
