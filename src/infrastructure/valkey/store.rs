//! Valkey-backed record store
//!
//! Persists the vector/response pair as two hashes sharing one
//! identifier. The pair write goes through a MULTI/EXEC pipeline so the
//! index never sees a vector whose response half is missing; reads fail
//! closed if a partial record surfaces anyway.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::warn;

use crate::domain::cache::{
    codec, RecordStore, ResponseRecord, SemanticCacheConfig, VectorRecord,
};
use crate::domain::DomainError;

/// Record store over Valkey hashes
#[derive(Clone)]
pub struct ValkeyRecordStore {
    connection: ConnectionManager,
    config: SemanticCacheConfig,
}

impl fmt::Debug for ValkeyRecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValkeyRecordStore")
            .field("vector_key_prefix", &self.config.vector_key_prefix)
            .field("response_key_prefix", &self.config.response_key_prefix)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl ValkeyRecordStore {
    pub fn new(connection: ConnectionManager, config: SemanticCacheConfig) -> Self {
        Self { connection, config }
    }

    fn vector_hset(record: &VectorRecord, key: &str) -> redis::Cmd {
        let mut cmd = redis::cmd("HSET");
        cmd.arg(key)
            .arg("request_id")
            .arg(&record.id)
            .arg("embedding")
            .arg(codec::encode(&record.embedding))
            .arg("timestamp")
            .arg(record.timestamp);
        cmd
    }

    fn response_hset(record: &ResponseRecord, key: &str) -> redis::Cmd {
        let mut cmd = redis::cmd("HSET");
        cmd.arg(key)
            .arg("request_text")
            .arg(&record.request_text)
            .arg("response_text")
            .arg(&record.response_text)
            .arg("input_tokens")
            .arg(record.input_tokens)
            .arg("output_tokens")
            .arg(record.output_tokens)
            .arg("cost")
            .arg(record.cost)
            .arg("timestamp")
            .arg(record.timestamp);
        cmd
    }
}

#[async_trait]
impl RecordStore for ValkeyRecordStore {
    async fn put_vector(&self, record: &VectorRecord) -> Result<(), DomainError> {
        let key = self.config.vector_key(&record.id);
        let mut conn = self.connection.clone();

        Self::vector_hset(record, &key)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to write '{}': {}", key, e)))
    }

    async fn put_response(&self, record: &ResponseRecord) -> Result<(), DomainError> {
        let key = self.config.response_key(&record.id);
        let mut conn = self.connection.clone();

        Self::response_hset(record, &key)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to write '{}': {}", key, e)))
    }

    async fn put_pair(
        &self,
        vector: &VectorRecord,
        response: &ResponseRecord,
    ) -> Result<(), DomainError> {
        let vector_key = self.config.vector_key(&vector.id);
        let response_key = self.config.response_key(&response.id);
        let mut conn = self.connection.clone();

        let mut pipe = redis::pipe();
        pipe.atomic()
            .add_command(Self::vector_hset(vector, &vector_key))
            .ignore()
            .add_command(Self::response_hset(response, &response_key))
            .ignore();

        pipe.query_async::<()>(&mut conn).await.map_err(|e| {
            DomainError::storage(format!(
                "Failed to write pair '{}'/'{}': {}",
                vector_key, response_key, e
            ))
        })
    }

    async fn get_response(&self, id: &str) -> Result<Option<ResponseRecord>, DomainError> {
        let key = self.config.response_key(id);
        let mut conn = self.connection.clone();

        let fields: HashMap<String, String> = conn
            .hgetall(&key)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read '{}': {}", key, e)))?;

        if fields.is_empty() {
            return Ok(None);
        }

        Ok(record_from_fields(id, &fields))
    }
}

/// Rebuild a [`ResponseRecord`] from raw hash fields, failing closed:
/// any missing or unparseable required field makes the record absent
/// rather than serving a half-written response.
fn record_from_fields(id: &str, fields: &HashMap<String, String>) -> Option<ResponseRecord> {
    let get = |name: &str| -> Option<&String> {
        let value = fields.get(name);
        if value.is_none() {
            warn!(id, field = name, "response record is missing a field, treating as absent");
        }
        value
    };

    let request_text = get("request_text")?.clone();
    let response_text = get("response_text")?.clone();
    let input_tokens = get("input_tokens")?.parse::<u32>().ok()?;
    let output_tokens = get("output_tokens")?.parse::<u32>().ok()?;
    let cost = get("cost")?.parse::<f64>().ok()?;
    let timestamp = get("timestamp")?.parse::<u64>().ok()?;

    Some(ResponseRecord::new(
        id,
        request_text,
        response_text,
        input_tokens,
        output_tokens,
        cost,
        timestamp,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::valkey::{connect, ValkeyConfig};

    fn full_fields() -> HashMap<String, String> {
        HashMap::from([
            ("request_text".to_string(), "where is order 42?".to_string()),
            ("response_text".to_string(), "it shipped".to_string()),
            ("input_tokens".to_string(), "40".to_string()),
            ("output_tokens".to_string(), "25".to_string()),
            ("cost".to_string(), "0.000495".to_string()),
            ("timestamp".to_string(), "1700000000".to_string()),
        ])
    }

    #[test]
    fn test_record_from_complete_fields() {
        let record = record_from_fields("abc", &full_fields()).unwrap();

        assert_eq!(record.id, "abc");
        assert_eq!(record.request_text, "where is order 42?");
        assert_eq!(record.response_text, "it shipped");
        assert_eq!(record.input_tokens, 40);
        assert_eq!(record.output_tokens, 25);
        assert!((record.cost - 0.000495).abs() < 1e-12);
        assert_eq!(record.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_record_fails_closed_on_missing_field() {
        let mut fields = full_fields();
        fields.remove("response_text");

        assert!(record_from_fields("abc", &fields).is_none());
    }

    #[test]
    fn test_record_fails_closed_on_garbage_numeric() {
        let mut fields = full_fields();
        fields.insert("input_tokens".to_string(), "not-a-number".to_string());

        assert!(record_from_fields("abc", &fields).is_none());
    }

    // Live tests require a Valkey instance with search enabled.

    #[tokio::test]
    #[ignore = "Requires running Valkey instance"]
    async fn test_pair_write_and_read_back() {
        let conn = connect(&ValkeyConfig::default()).await.unwrap();
        let store = ValkeyRecordStore::new(conn, SemanticCacheConfig::default());

        let vector = VectorRecord::new("it-pair", vec![0.0; 1024], 1_700_000_000);
        let response =
            ResponseRecord::new("it-pair", "q", "a", 10, 20, 0.00033, 1_700_000_000);

        store.put_pair(&vector, &response).await.unwrap();

        let fetched = store.get_response("it-pair").await.unwrap().unwrap();
        assert_eq!(fetched, response);
    }

    #[tokio::test]
    #[ignore = "Requires running Valkey instance"]
    async fn test_get_response_unknown_id_is_none() {
        let conn = connect(&ValkeyConfig::default()).await.unwrap();
        let store = ValkeyRecordStore::new(conn, SemanticCacheConfig::default());

        let fetched = store.get_response("no-such-id").await.unwrap();
        assert!(fetched.is_none());
    }
}
