//! Semantic cache decision engine
//!
//! Runs the per-request state machine: embed the request, ask the
//! similarity index for the nearest previously answered request, serve
//! the stored answer when similarity clears the threshold, otherwise
//! invoke the downstream responder and persist the new pair. Metric
//! events are fired into the publisher off the critical path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::cache::{
    RecordStore, ResponseRecord, SemanticCacheConfig, SimilarityIndex, SimilarityMatch,
    VectorRecord,
};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::metrics::{MetricEvent, MetricUnit};
use crate::domain::pricing::{estimate_input_tokens, TokenPricing};
use crate::domain::responder::AgentResponder;
use crate::domain::DomainError;
use crate::infrastructure::metrics::MetricsPublisher;

const METRIC_LATENCY: &str = "Latency";
const METRIC_CACHE_HIT: &str = "CacheHit";
const METRIC_SIMILARITY: &str = "SimilarityScore";
const METRIC_COST_SAVINGS: &str = "CostSavings";
const METRIC_COST_PAID: &str = "CostPaid";
const DIMENSION_CACHE_STATUS: &str = "CacheStatus";

/// Which path served the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "Hit",
            CacheStatus::Miss => "Miss",
        }
    }
}

/// Outcome of one decision cycle
#[derive(Debug, Clone)]
pub struct CacheDecision {
    /// The answer served to the caller, cached or fresh
    pub response_text: String,
    pub status: CacheStatus,
    /// Best similarity found, if the index returned any candidate
    pub similarity: Option<f32>,
    pub latency: Duration,
    /// Dollars not spent because the responder was skipped (hit only)
    pub cost_avoided: f64,
    /// Dollars spent on the responder invocation (miss only)
    pub cost_paid: f64,
    /// Identifier of the served record (hit) or the newly persisted
    /// pair (miss); `None` when a miss-path persist failed
    pub record_id: Option<String>,
}

/// The decision engine
#[derive(Debug)]
pub struct SemanticCacheService {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn SimilarityIndex>,
    store: Arc<dyn RecordStore>,
    responder: Arc<dyn AgentResponder>,
    publisher: Arc<MetricsPublisher>,
    config: SemanticCacheConfig,
    pricing: TokenPricing,
}

impl SemanticCacheService {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn SimilarityIndex>,
        store: Arc<dyn RecordStore>,
        responder: Arc<dyn AgentResponder>,
        publisher: Arc<MetricsPublisher>,
        config: SemanticCacheConfig,
        pricing: TokenPricing,
    ) -> Self {
        Self {
            embedder,
            index,
            store,
            responder,
            publisher,
            config,
            pricing,
        }
    }

    pub fn config(&self) -> &SemanticCacheConfig {
        &self.config
    }

    pub fn publisher(&self) -> &Arc<MetricsPublisher> {
        &self.publisher
    }

    /// Run one request through the cache.
    ///
    /// Only two failures surface to the caller: an embedding/responder
    /// outage (`Upstream`) and a search transport failure
    /// (`IndexUnavailable`). Everything else degrades to a correct but
    /// uncached response.
    pub async fn handle(&self, request_text: &str) -> Result<CacheDecision, DomainError> {
        let started = Instant::now();

        let embedding = self
            .embedder
            .embed(request_text, self.config.vector_dim)
            .await?;

        let best = self
            .index
            .search(&embedding, 1)
            .await?
            .into_iter()
            .next();

        if let Some(candidate) = &best {
            if candidate.similarity >= self.config.similarity_threshold {
                match self.store.get_response(&candidate.id).await {
                    Ok(Some(record)) => {
                        return Ok(self.complete_hit(request_text, candidate, record, started));
                    }
                    Ok(None) => {
                        // Index knows the id but the pair is incomplete;
                        // recover by answering fresh instead of failing
                        warn!(
                            id = %candidate.id,
                            "matched record is missing its response half, downgrading to miss"
                        );
                    }
                    Err(e) => {
                        warn!(
                            id = %candidate.id,
                            "response fetch failed, downgrading to miss: {}", e
                        );
                    }
                }
            } else {
                debug!(
                    similarity = candidate.similarity,
                    threshold = self.config.similarity_threshold,
                    "best match below threshold"
                );
            }
        }

        self.complete_miss(request_text, embedding, best, started)
            .await
    }

    fn complete_hit(
        &self,
        request_text: &str,
        candidate: &SimilarityMatch,
        record: ResponseRecord,
        started: Instant,
    ) -> CacheDecision {
        let latency = started.elapsed();

        // Input tokens for the current request are never tokenized on a
        // hit, so the avoided cost uses the length heuristic for input
        // and the stored record's real output count
        let cost_avoided = self.pricing.cost(
            estimate_input_tokens(request_text),
            record.output_tokens,
        );

        info!(
            id = %record.id,
            similarity = candidate.similarity,
            latency_ms = latency.as_millis() as u64,
            "cache hit"
        );

        self.emit_request_metrics(
            CacheStatus::Hit,
            latency,
            Some(candidate.similarity),
            cost_avoided,
        );

        CacheDecision {
            response_text: record.response_text,
            status: CacheStatus::Hit,
            similarity: Some(candidate.similarity),
            latency,
            cost_avoided,
            cost_paid: 0.0,
            record_id: Some(record.id),
        }
    }

    async fn complete_miss(
        &self,
        request_text: &str,
        embedding: Vec<f32>,
        best: Option<SimilarityMatch>,
        started: Instant,
    ) -> Result<CacheDecision, DomainError> {
        let reply = self.responder.invoke(request_text).await?;
        let latency = started.elapsed();

        let cost_paid = self.pricing.cost(reply.input_tokens, reply.output_tokens);

        let id = Uuid::new_v4().to_string();
        let timestamp = Utc::now().timestamp().max(0) as u64;
        let vector = VectorRecord::new(id.clone(), embedding, timestamp);
        let response = ResponseRecord::new(
            id.clone(),
            request_text,
            reply.response_text.clone(),
            reply.input_tokens,
            reply.output_tokens,
            cost_paid,
            timestamp,
        );

        // Best-effort caching: the answer is already in hand, so a
        // failed write must not fail the user-visible request
        let record_id = match self.store.put_pair(&vector, &response).await {
            Ok(()) => Some(id),
            Err(e) => {
                warn!("failed to persist cache pair: {}", e);
                None
            }
        };

        let similarity = best.map(|m| m.similarity);

        info!(
            similarity = ?similarity,
            latency_ms = latency.as_millis() as u64,
            cached = record_id.is_some(),
            "cache miss"
        );

        self.emit_request_metrics(CacheStatus::Miss, latency, similarity, cost_paid);

        Ok(CacheDecision {
            response_text: reply.response_text,
            status: CacheStatus::Miss,
            similarity,
            latency,
            cost_avoided: 0.0,
            cost_paid,
            record_id,
        })
    }

    fn emit_request_metrics(
        &self,
        status: CacheStatus,
        latency: Duration,
        similarity: Option<f32>,
        cost: f64,
    ) {
        self.publisher.enqueue(
            MetricEvent::new(
                METRIC_LATENCY,
                latency.as_secs_f64() * 1000.0,
                MetricUnit::Milliseconds,
            )
            .with_dimension(DIMENSION_CACHE_STATUS, status.as_str()),
        );

        let hit_value = match status {
            CacheStatus::Hit => 1.0,
            CacheStatus::Miss => 0.0,
        };
        self.publisher
            .enqueue(MetricEvent::new(METRIC_CACHE_HIT, hit_value, MetricUnit::Count));

        // Emitted whenever a candidate existed, below threshold
        // included, so the score distribution stays visible
        if let Some(similarity) = similarity {
            self.publisher.enqueue(MetricEvent::new(
                METRIC_SIMILARITY,
                similarity as f64,
                MetricUnit::None,
            ));
        }

        if cost > 0.0 {
            let name = match status {
                CacheStatus::Hit => METRIC_COST_SAVINGS,
                CacheStatus::Miss => METRIC_COST_PAID,
            };
            self.publisher
                .enqueue(MetricEvent::new(name, cost, MetricUnit::None));
        }
    }
}
