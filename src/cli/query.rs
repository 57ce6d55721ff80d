//! One-shot query runner
//!
//! Wires the full pipeline (Titan embeddings, Valkey index/store,
//! Bedrock responder, CloudWatch metrics) and runs a single request
//! through it, then drains buffered metrics before exit.

use std::sync::Arc;

use clap::Args;

use crate::config::AppConfig;
use crate::domain::responder::AgentResponder;
use crate::infrastructure::embedding::TitanEmbeddingProvider;
use crate::infrastructure::metrics::{CloudWatchMetricsSink, MetricsPublisher};
use crate::infrastructure::responder::{BedrockConverseResponder, ScriptedResponder};
use crate::infrastructure::services::{CacheStatus, SemanticCacheService};
use crate::infrastructure::valkey::{connect, ValkeyRecordStore, ValkeySimilarityIndex};

#[derive(Args)]
pub struct QueryArgs {
    /// Request text to run through the cache
    pub text: String,

    /// Use the deterministic scripted responder instead of Bedrock
    #[arg(long)]
    pub scripted: bool,
}

pub async fn run(config: &AppConfig, args: QueryArgs) -> anyhow::Result<()> {
    let connection = connect(&config.valkey).await?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let bedrock = aws_sdk_bedrockruntime::Client::new(&aws_config);

    let responder: Arc<dyn AgentResponder> = if args.scripted {
        Arc::new(ScriptedResponder::new())
    } else {
        Arc::new(BedrockConverseResponder::new(bedrock.clone()))
    };

    let sink = Arc::new(CloudWatchMetricsSink::new(
        aws_sdk_cloudwatch::Client::new(&aws_config),
        config.metrics.namespace.clone(),
    ));
    let publisher = Arc::new(MetricsPublisher::new(
        sink,
        config.metrics.publisher.clone(),
    ));

    let service = SemanticCacheService::new(
        Arc::new(TitanEmbeddingProvider::new(bedrock)),
        Arc::new(ValkeySimilarityIndex::new(
            connection.clone(),
            config.cache.clone(),
        )),
        Arc::new(ValkeyRecordStore::new(connection, config.cache.clone())),
        responder,
        publisher.clone(),
        config.cache.clone(),
        config.pricing,
    );

    let decision = service.handle(&args.text).await?;

    match decision.status {
        CacheStatus::Hit => println!(
            "[hit, similarity {:.4}, {} ms, saved ${:.6}]",
            decision.similarity.unwrap_or_default(),
            decision.latency.as_millis(),
            decision.cost_avoided,
        ),
        CacheStatus::Miss => println!(
            "[miss, {} ms, paid ${:.6}]",
            decision.latency.as_millis(),
            decision.cost_paid,
        ),
    }
    println!("{}", decision.response_text);

    // Flush whatever the batching thresholds left behind
    publisher.drain().await;

    Ok(())
}
