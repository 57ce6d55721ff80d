//! Downstream responder implementations

mod bedrock;
mod scripted;

pub use bedrock::BedrockConverseResponder;
pub use scripted::ScriptedResponder;
