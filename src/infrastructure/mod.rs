//! Infrastructure layer: backend clients, providers and services

pub mod embedding;
pub mod logging;
pub mod memory;
pub mod metrics;
pub mod responder;
pub mod services;
pub mod valkey;
