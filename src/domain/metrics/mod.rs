//! Metric event types and the sink trait

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::DomainError;

/// Unit tag attached to a metric value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Count,
    Milliseconds,
    Seconds,
    None,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Count => "Count",
            MetricUnit::Milliseconds => "Milliseconds",
            MetricUnit::Seconds => "Seconds",
            MetricUnit::None => "None",
        }
    }
}

/// One instrumentation data point.
///
/// Created on the request path, buffered by the publisher, consumed and
/// discarded once a batch reaches the sink (or dropped under overflow).
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEvent {
    pub name: String,
    pub value: f64,
    pub unit: MetricUnit,
    /// Key/value pairs used for slicing, e.g. `CacheStatus=Hit`
    pub dimensions: Vec<(String, String)>,
    pub timestamp: DateTime<Utc>,
}

impl MetricEvent {
    /// Create an event timestamped now
    pub fn new(name: impl Into<String>, value: f64, unit: MetricUnit) -> Self {
        Self {
            name: name.into(),
            value,
            unit,
            dimensions: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attach a dimension
    pub fn with_dimension(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.push((name.into(), value.into()));
        self
    }

    /// Override the creation timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Destination for batched metric data points.
///
/// Best-effort by contract: a failed publish is logged by the caller
/// and the batch is discarded, never retried.
#[async_trait]
pub trait MetricsSink: Send + Sync + Debug {
    /// Publish one batch of events
    async fn publish(&self, events: &[MetricEvent]) -> Result<(), DomainError>;
}
