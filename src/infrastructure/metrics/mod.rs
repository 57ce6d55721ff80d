//! Metrics pipeline: bounded async publisher and the CloudWatch sink

mod cloudwatch;
mod publisher;

pub use cloudwatch::CloudWatchMetricsSink;
pub use publisher::{MetricsPublisher, MetricsPublisherConfig, TaskGuard, TaskRegistry};
