//! Valkey connection handling
//!
//! One `ConnectionManager` is created at startup and cloned into every
//! component that talks to the cluster (index, store, admin). The
//! manager reconnects on its own, so a briefly unreachable cluster does
//! not fail startup permanently.

use redis::aio::ConnectionManager;
use redis::Client;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Configuration for the Valkey/Redis connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValkeyConfig {
    /// Connection URL (e.g., "redis://127.0.0.1:6379")
    #[serde(default = "default_url")]
    pub url: String,
}

fn default_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

impl Default for ValkeyConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

impl ValkeyConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Open a managed connection to the cluster
pub async fn connect(config: &ValkeyConfig) -> Result<ConnectionManager, DomainError> {
    let client = Client::open(config.url.as_str())
        .map_err(|e| DomainError::storage(format!("Failed to create Valkey client: {}", e)))?;

    ConnectionManager::new(client)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to Valkey: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url() {
        let config = ValkeyConfig::default();
        assert_eq!(config.url, "redis://127.0.0.1:6379");
    }

    #[test]
    fn test_invalid_url_is_storage_error() {
        let result = Client::open("not-a-url");
        assert!(result.is_err());
    }
}
