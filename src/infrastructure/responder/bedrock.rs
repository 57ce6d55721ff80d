//! Bedrock Converse responder

use std::fmt;

use async_trait::async_trait;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, Message, SystemContentBlock,
};

use crate::domain::responder::{AgentReply, AgentResponder};
use crate::domain::DomainError;

const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-sonnet-4-20250514-v1:0";

const SYSTEM_PROMPT: &str = "\
You are a helpful customer support agent for a retail company.

Your role:
- Help customers with order status inquiries and shipping delays
- Provide clear, empathetic responses during high-volume periods
- Keep responses concise (2-3 sentences) since they may be cached for similar future queries

Typical timelines:
- Orders ship within 1-2 business days normally
- During peak events, expect 3-5 day delays
- Standard delivery: 3-7 business days after shipping

Tone: Professional, empathetic, solution-oriented.";

/// Support responder backed by a single-turn Converse call.
///
/// Returns the model's answer together with the real token usage the
/// call consumed, which is what the cache persists for cost accounting.
#[derive(Clone)]
pub struct BedrockConverseResponder {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl fmt::Debug for BedrockConverseResponder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BedrockConverseResponder")
            .field("model_id", &self.model_id)
            .field("client", &"<Client>")
            .finish()
    }
}

impl BedrockConverseResponder {
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
impl AgentResponder for BedrockConverseResponder {
    async fn invoke(&self, request_text: &str) -> Result<AgentReply, DomainError> {
        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(request_text.to_string()))
            .build()
            .map_err(|e| DomainError::internal(format!("Failed to build message: {}", e)))?;

        let output = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(SYSTEM_PROMPT.to_string()))
            .messages(message)
            .send()
            .await
            .map_err(|e| DomainError::upstream(self.responder_name(), e.to_string()))?;

        let response_text = output
            .output()
            .and_then(|out| out.as_message().ok())
            .map(|message| {
                message
                    .content()
                    .iter()
                    .filter_map(|block| block.as_text().ok().map(String::as_str))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .ok_or_else(|| {
                DomainError::upstream(self.responder_name(), "response carried no message")
            })?;

        let (input_tokens, output_tokens) = output
            .usage()
            .map(|usage| (usage.input_tokens().max(0) as u32, usage.output_tokens().max(0) as u32))
            .unwrap_or((0, 0));

        Ok(AgentReply::new(response_text, input_tokens, output_tokens))
    }

    fn responder_name(&self) -> &'static str {
        "bedrock-converse"
    }
}
