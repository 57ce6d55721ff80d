//! Semantic Support Cache
//!
//! A similarity-gated response cache in front of a costly LLM support
//! agent:
//! - Requests are embedded and matched against previously answered
//!   requests via vector search
//! - Close-enough matches are served from the cache without invoking
//!   the agent
//! - Misses invoke the agent once and persist the new request/response
//!   pair for future reuse
//! - Hit/miss, latency, similarity and cost metrics are batched to
//!   CloudWatch off the request path

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
