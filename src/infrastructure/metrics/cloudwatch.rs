//! CloudWatch metrics sink

use std::fmt;

use async_trait::async_trait;
use aws_sdk_cloudwatch::types::{Dimension, MetricDatum, StandardUnit};
use aws_smithy_types::DateTime;

use crate::domain::metrics::{MetricEvent, MetricUnit, MetricsSink};
use crate::domain::DomainError;

/// Sink that publishes batches via `PutMetricData`
#[derive(Clone)]
pub struct CloudWatchMetricsSink {
    client: aws_sdk_cloudwatch::Client,
    namespace: String,
}

impl fmt::Debug for CloudWatchMetricsSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudWatchMetricsSink")
            .field("namespace", &self.namespace)
            .field("client", &"<Client>")
            .finish()
    }
}

impl CloudWatchMetricsSink {
    pub fn new(client: aws_sdk_cloudwatch::Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[async_trait]
impl MetricsSink for CloudWatchMetricsSink {
    async fn publish(&self, events: &[MetricEvent]) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let data: Vec<MetricDatum> = events.iter().map(to_datum).collect();

        self.client
            .put_metric_data()
            .namespace(&self.namespace)
            .set_metric_data(Some(data))
            .send()
            .await
            .map_err(|e| DomainError::metrics(format!("PutMetricData failed: {}", e)))?;

        Ok(())
    }
}

fn to_datum(event: &MetricEvent) -> MetricDatum {
    let dimensions: Vec<Dimension> = event
        .dimensions
        .iter()
        .map(|(name, value)| Dimension::builder().name(name).value(value).build())
        .collect();

    let mut builder = MetricDatum::builder()
        .metric_name(&event.name)
        .value(event.value)
        .unit(to_standard_unit(event.unit))
        .timestamp(DateTime::from_millis(event.timestamp.timestamp_millis()));

    if !dimensions.is_empty() {
        builder = builder.set_dimensions(Some(dimensions));
    }

    builder.build()
}

fn to_standard_unit(unit: MetricUnit) -> StandardUnit {
    match unit {
        MetricUnit::Count => StandardUnit::Count,
        MetricUnit::Milliseconds => StandardUnit::Milliseconds,
        MetricUnit::Seconds => StandardUnit::Seconds,
        MetricUnit::None => StandardUnit::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_datum_carries_dimensions_and_unit() {
        let event = MetricEvent::new("Latency", 12.5, MetricUnit::Milliseconds)
            .with_dimension("CacheStatus", "Hit");

        let datum = to_datum(&event);

        assert_eq!(datum.metric_name(), Some("Latency"));
        assert_eq!(datum.value(), Some(12.5));
        assert_eq!(datum.unit(), Some(&StandardUnit::Milliseconds));
        let dims = datum.dimensions();
        assert_eq!(dims.len(), 1);
        assert_eq!(dims[0].name(), Some("CacheStatus"));
        assert_eq!(dims[0].value(), Some("Hit"));
    }

    #[test]
    fn test_datum_omits_empty_dimensions() {
        let event = MetricEvent::new("CacheHit", 1.0, MetricUnit::Count);
        let datum = to_datum(&event);

        assert!(datum.dimensions().is_empty());
        assert_eq!(datum.unit(), Some(&StandardUnit::Count));
    }

    #[test]
    fn test_datum_timestamp_preserved() {
        let ts = chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let event = MetricEvent::new("CostPaid", 0.001, MetricUnit::None).with_timestamp(ts);

        let datum = to_datum(&event);

        assert_eq!(
            datum.timestamp(),
            Some(&DateTime::from_millis(1_700_000_000_000))
        );
    }
}
