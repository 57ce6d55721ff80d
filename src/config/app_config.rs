use serde::{Deserialize, Serialize};

use crate::domain::cache::SemanticCacheConfig;
use crate::domain::pricing::TokenPricing;
use crate::infrastructure::metrics::MetricsPublisherConfig;
use crate::infrastructure::valkey::ValkeyConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub valkey: ValkeyConfig,
    #[serde(default)]
    pub cache: SemanticCacheConfig,
    #[serde(default)]
    pub pricing: TokenPricing,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// CloudWatch namespace the sink publishes under
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub publisher: MetricsPublisherConfig,
}

fn default_namespace() -> String {
    "SemanticSupportDesk".to_string()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            publisher: MetricsPublisherConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_section() {
        let config = AppConfig::default();

        assert_eq!(config.valkey.url, "redis://127.0.0.1:6379");
        assert!((config.cache.similarity_threshold - 0.85).abs() < 1e-6);
        assert_eq!(config.cache.vector_dim, 1024);
        assert_eq!(config.metrics.namespace, "SemanticSupportDesk");
        assert_eq!(config.metrics.publisher.batch_size, 20);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_sections_deserialize_from_partial_input() {
        let json = r#"{
            "cache": { "similarity_threshold": 0.9 },
            "metrics": { "namespace": "Staging" }
        }"#;

        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert!((config.cache.similarity_threshold - 0.9).abs() < 1e-6);
        // Unset fields in a present section still fall back
        assert_eq!(config.cache.index_name, "idx:requests");
        assert_eq!(config.metrics.namespace, "Staging");
        assert_eq!(config.metrics.publisher.capacity, 100);
    }
}
