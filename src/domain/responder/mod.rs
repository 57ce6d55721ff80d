//! Downstream responder trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// What the responder produced for one request: the answer plus the
/// real token usage the invocation consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub response_text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl AgentReply {
    pub fn new(response_text: impl Into<String>, input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            response_text: response_text.into(),
            input_tokens,
            output_tokens,
        }
    }
}

/// The costly downstream responder the cache exists to shield.
///
/// Invoked exactly once per cache miss and never on a hit.
#[async_trait]
pub trait AgentResponder: Send + Sync + Debug {
    /// Produce an answer for the raw request text
    async fn invoke(&self, request_text: &str) -> Result<AgentReply, DomainError>;

    /// Get the responder name
    fn responder_name(&self) -> &'static str;
}


#[cfg(test)]
mod tests {
    use super::mock::MockResponder;
    use super::*;

    #[tokio::test]
    async fn test_mock_counts_calls() {
        let responder = MockResponder::new(AgentReply::new("shipped", 40, 25));

        assert_eq!(responder.call_count(), 0);
        let reply = responder.invoke("where is my order?").await.unwrap();

        assert_eq!(reply.response_text, "shipped");
        assert_eq!(reply.input_tokens, 40);
        assert_eq!(reply.output_tokens, 25);
        assert_eq!(responder.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_error_is_upstream() {
        let responder =
            MockResponder::new(AgentReply::new("", 0, 0)).with_error("model unavailable");

        let result = responder.invoke("hi").await;

        assert!(matches!(result, Err(DomainError::Upstream { .. })));
        assert_eq!(responder.call_count(), 1);
    }
}
