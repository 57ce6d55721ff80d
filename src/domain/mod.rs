//! Domain types and traits: no I/O, no SDKs, just the seams the
//! infrastructure implementations plug into.

pub mod cache;
pub mod embedding;
mod error;
pub mod metrics;
pub mod pricing;
pub mod responder;

pub use error::DomainError;
