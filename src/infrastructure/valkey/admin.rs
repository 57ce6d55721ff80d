//! Administrative operations: index lifecycle, cache reset, health probe
//!
//! These never run on the request path; they back the CLI commands used
//! for provisioning and demos.

use std::fmt;

use redis::aio::ConnectionManager;
use redis::Value;
use tracing::info;

use crate::domain::cache::SemanticCacheConfig;
use crate::domain::DomainError;

/// Health probe result
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub db_size: u64,
    pub indexes: Vec<String>,
}

/// Administrative surface over the Valkey cluster
#[derive(Clone)]
pub struct CacheAdmin {
    connection: ConnectionManager,
    config: SemanticCacheConfig,
}

impl fmt::Debug for CacheAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheAdmin")
            .field("index_name", &self.config.index_name)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl CacheAdmin {
    pub fn new(connection: ConnectionManager, config: SemanticCacheConfig) -> Self {
        Self { connection, config }
    }

    /// Create the HNSW vector index over the vector key prefix.
    ///
    /// Idempotent: returns `Ok(false)` if the index already exists.
    pub async fn create_index(&self) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        let result = create_index_cmd(&self.config)
            .query_async::<()>(&mut conn)
            .await;

        match result {
            Ok(()) => {
                info!(index = %self.config.index_name, dim = self.config.vector_dim, "created vector index");
                Ok(true)
            }
            Err(e) if e.to_string().to_lowercase().contains("already exists") => Ok(false),
            Err(e) => Err(DomainError::index_unavailable(format!(
                "Failed to create index '{}': {}",
                self.config.index_name, e
            ))),
        }
    }

    /// Drop the vector index; `delete_docs` also removes the indexed
    /// hashes (FT.DROPINDEX DD). Returns `Ok(false)` if it didn't exist.
    pub async fn drop_index(&self, delete_docs: bool) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        let mut cmd = redis::cmd("FT.DROPINDEX");
        cmd.arg(&self.config.index_name);
        if delete_docs {
            cmd.arg("DD");
        }

        match cmd.query_async::<()>(&mut conn).await {
            Ok(()) => {
                info!(index = %self.config.index_name, "dropped vector index");
                Ok(true)
            }
            Err(e) if e.to_string().to_lowercase().contains("unknown index") => Ok(false),
            Err(e) => Err(DomainError::index_unavailable(format!(
                "Failed to drop index '{}': {}",
                self.config.index_name, e
            ))),
        }
    }

    /// Delete every cached record under both key prefixes.
    ///
    /// Returns the number of keys deleted.
    pub async fn reset_cache(&self) -> Result<usize, DomainError> {
        let mut deleted = 0usize;

        for prefix in [
            &self.config.vector_key_prefix,
            &self.config.response_key_prefix,
        ] {
            deleted += self.delete_by_pattern(&format!("{}*", prefix)).await?;
        }

        info!(deleted, "cache reset complete");
        Ok(deleted)
    }

    async fn delete_by_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let mut conn = self.connection.clone();
        let mut cursor = 0u64;
        let mut total = 0usize;

        loop {
            let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    DomainError::storage(format!(
                        "Failed to scan keys with pattern '{}': {}",
                        pattern, e
                    ))
                })?;

            if !keys.is_empty() {
                let removed: i64 = redis::cmd("DEL")
                    .arg(&keys)
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| DomainError::storage(format!("Failed to delete keys: {}", e)))?;
                total += removed as usize;
            }

            cursor = new_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(total)
    }

    /// Ping the cluster and report record count plus known indexes
    pub async fn health(&self) -> Result<HealthReport, DomainError> {
        let mut conn = self.connection.clone();

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| DomainError::storage(format!("Ping failed: {}", e)))?;

        let db_size: u64 = redis::cmd("DBSIZE")
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::storage(format!("DBSIZE failed: {}", e)))?;

        let list: Value = redis::cmd("FT._LIST")
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::storage(format!("FT._LIST failed: {}", e)))?;

        Ok(HealthReport {
            db_size,
            indexes: index_names(&list),
        })
    }
}

/// Full `FT.CREATE` schema: `request_id` tag, HNSW vector over the
/// embedding blob, and the write timestamp as a numeric field so the
/// index supports time-ordered queries over cached records.
fn create_index_cmd(config: &SemanticCacheConfig) -> redis::Cmd {
    let mut cmd = redis::cmd("FT.CREATE");
    cmd.arg(&config.index_name)
        .arg("ON")
        .arg("HASH")
        .arg("PREFIX")
        .arg(1)
        .arg(&config.vector_key_prefix)
        .arg("SCHEMA")
        .arg("request_id")
        .arg("TAG")
        .arg("embedding")
        .arg("VECTOR")
        .arg("HNSW")
        .arg(10)
        .arg("TYPE")
        .arg("FLOAT32")
        .arg("DIM")
        .arg(config.vector_dim)
        .arg("DISTANCE_METRIC")
        .arg("COSINE")
        .arg("M")
        .arg(config.hnsw_m)
        .arg("EF_CONSTRUCTION")
        .arg(config.hnsw_ef_construction)
        .arg("timestamp")
        .arg("NUMERIC");
    cmd
}

fn index_names(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::BulkString(bytes) => String::from_utf8(bytes.clone()).ok(),
                Value::SimpleString(s) => Some(s.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::valkey::{connect, ValkeyConfig};

    #[test]
    fn test_create_index_schema_covers_every_written_field() {
        let cmd = create_index_cmd(&SemanticCacheConfig::default());
        let packed = String::from_utf8_lossy(&cmd.get_packed_command()).into_owned();

        // Vector clause with HNSW parameters
        let vector_pos = packed.find("embedding").unwrap();
        assert!(packed[vector_pos..].contains("HNSW"));
        assert!(packed[vector_pos..].contains("FLOAT32"));
        assert!(packed[vector_pos..].contains("COSINE"));
        assert!(packed[vector_pos..].contains("EF_CONSTRUCTION"));

        // The timestamp hash field is indexed as numeric, after the
        // vector clause's argument block
        let timestamp_pos = packed.find("timestamp").unwrap();
        assert!(timestamp_pos > vector_pos);
        assert!(packed[timestamp_pos..].contains("NUMERIC"));
    }

    #[test]
    fn test_index_names_from_array() {
        let value = Value::Array(vec![
            Value::BulkString(b"idx:requests".to_vec()),
            Value::SimpleString("idx:other".to_string()),
        ]);

        assert_eq!(index_names(&value), vec!["idx:requests", "idx:other"]);
    }

    #[test]
    fn test_index_names_from_non_array() {
        assert!(index_names(&Value::Nil).is_empty());
    }

    #[tokio::test]
    #[ignore = "Requires running Valkey instance with search module"]
    async fn test_create_index_is_idempotent() {
        let conn = connect(&ValkeyConfig::default()).await.unwrap();
        let admin = CacheAdmin::new(conn, SemanticCacheConfig::default());

        admin.create_index().await.unwrap();
        let created_again = admin.create_index().await.unwrap();

        assert!(!created_again);
    }

    #[tokio::test]
    #[ignore = "Requires running Valkey instance with search module"]
    async fn test_health_reports_index() {
        let conn = connect(&ValkeyConfig::default()).await.unwrap();
        let admin = CacheAdmin::new(conn, SemanticCacheConfig::default());

        admin.create_index().await.unwrap();
        let report = admin.health().await.unwrap();

        assert!(report.indexes.contains(&"idx:requests".to_string()));
    }
}
