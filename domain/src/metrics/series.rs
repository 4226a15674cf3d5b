//! Metric time series
//!
//! The common shape every source-native response is normalized into, so
//! the aggregator never needs source-specific logic. Immutable after
//! construction.

use super::window::StatisticsWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit of a metric series after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    Percent,
    Milliseconds,
    Count,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Percent => "percent",
            MetricUnit::Milliseconds => "milliseconds",
            MetricUnit::Count => "count",
        }
    }
}

/// One timestamped observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub at: DateTime<Utc>,
    pub value: f64,
}

/// An ordered series of observations from one source for one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSeries {
    /// Which fetcher produced the series (e.g. `cloudwatch/ecs`)
    pub source: String,
    /// Metric name in the source's vocabulary (e.g. `CPUUtilization`)
    pub metric: String,
    pub unit: MetricUnit,
    /// Ascending by timestamp
    pub points: Vec<MetricPoint>,
    pub window: StatisticsWindow,
}

impl MetricSeries {
    pub fn new(
        source: impl Into<String>,
        metric: impl Into<String>,
        unit: MetricUnit,
        mut points: Vec<MetricPoint>,
        window: StatisticsWindow,
    ) -> Self {
        points.sort_by_key(|p| p.at);
        Self {
            source: source.into(),
            metric: metric.into(),
            unit,
            points,
            window,
        }
    }

    pub fn latest(&self) -> Option<&MetricPoint> {
        self.points.last()
    }

    pub fn max_point(&self) -> Option<&MetricPoint> {
        self.points
            .iter()
            .max_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn min_point(&self) -> Option<&MetricPoint> {
        self.points
            .iter()
            .min_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal))
    }
}
