//! Valkey vector search client
//!
//! Issues `FT.SEARCH` KNN queries against the HNSW index built over the
//! vector key prefix, translating raw search replies into
//! [`SimilarityMatch`] values.

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Value;

use crate::domain::cache::{codec, SemanticCacheConfig, SimilarityIndex, SimilarityMatch};
use crate::domain::DomainError;

/// Similarity index backed by Valkey `FT.SEARCH`
#[derive(Clone)]
pub struct ValkeySimilarityIndex {
    connection: ConnectionManager,
    config: SemanticCacheConfig,
}

impl fmt::Debug for ValkeySimilarityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValkeySimilarityIndex")
            .field("index_name", &self.config.index_name)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl ValkeySimilarityIndex {
    pub fn new(connection: ConnectionManager, config: SemanticCacheConfig) -> Self {
        Self { connection, config }
    }
}

#[async_trait]
impl SimilarityIndex for ValkeySimilarityIndex {
    async fn search(
        &self,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<SimilarityMatch>, DomainError> {
        if vector.len() != self.config.vector_dim {
            return Err(DomainError::validation(format!(
                "query vector has dimension {}, index expects {}",
                vector.len(),
                self.config.vector_dim
            )));
        }

        if k == 0 {
            return Err(DomainError::validation("k must be at least 1"));
        }

        let blob = codec::encode(vector);
        let mut conn = self.connection.clone();

        let reply: Value = knn_search_cmd(&self.config, &blob, k)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                DomainError::index_unavailable(format!(
                    "FT.SEARCH against '{}' failed: {}",
                    self.config.index_name, e
                ))
            })?;

        parse_search_reply(&reply)
    }
}

/// KNN query over the embedding field. The explicit `LIMIT 0 {k}`
/// matters: without it the server applies its default `LIMIT 0 10`,
/// which would silently cap results below the requested `k`.
fn knn_search_cmd(config: &SemanticCacheConfig, blob: &[u8], k: usize) -> redis::Cmd {
    let query = format!("*=>[KNN {} @embedding $vec AS score]", k);

    let mut cmd = redis::cmd("FT.SEARCH");
    cmd.arg(&config.index_name)
        .arg(query)
        .arg("PARAMS")
        .arg(2)
        .arg("vec")
        .arg(blob)
        .arg("SORTBY")
        .arg("score")
        .arg("ASC")
        .arg("RETURN")
        .arg(2)
        .arg("request_id")
        .arg("score")
        .arg("LIMIT")
        .arg(0)
        .arg(k)
        .arg("DIALECT")
        .arg(2);
    cmd
}

/// Decode an `FT.SEARCH` reply into matches ordered by descending
/// similarity.
///
/// RESP2 layout: `[total, key1, [field, value, ...], key2, ...]`. The
/// per-document field array carries `request_id` and the raw cosine
/// distance under `score`; similarity is `1 - distance`.
fn parse_search_reply(reply: &Value) -> Result<Vec<SimilarityMatch>, DomainError> {
    let items = match reply {
        Value::Array(items) => items,
        other => {
            return Err(DomainError::index_unavailable(format!(
                "unexpected FT.SEARCH reply shape: {:?}",
                other
            )))
        }
    };

    // [0] alone means zero matches
    let mut matches = Vec::new();

    for item in items.iter().skip(1) {
        let fields = match item {
            Value::Array(fields) => fields,
            // Document keys interleave with field arrays; skip the keys
            _ => continue,
        };

        let mut request_id: Option<String> = None;
        let mut distance: Option<f64> = None;

        for pair in fields.chunks_exact(2) {
            let Some(name) = value_as_string(&pair[0]) else {
                continue;
            };

            match name.as_str() {
                "request_id" => request_id = value_as_string(&pair[1]),
                "score" => {
                    distance = value_as_string(&pair[1]).and_then(|s| s.parse::<f64>().ok())
                }
                _ => {}
            }
        }

        match (request_id, distance) {
            (Some(id), Some(dist)) => {
                matches.push(SimilarityMatch::new(id, (1.0 - dist) as f32));
            }
            (id, dist) => {
                return Err(DomainError::index_unavailable(format!(
                    "FT.SEARCH document missing fields (request_id present: {}, score present: {})",
                    id.is_some(),
                    dist.is_some()
                )));
            }
        }
    }

    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(matches)
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::BulkString(bytes) => String::from_utf8(bytes.clone()).ok(),
        Value::SimpleString(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Double(d) => Some(d.to_string()),
        _ => None,
    }
}
