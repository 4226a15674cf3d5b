//! Metric fetcher port
//!
//! One implementation per data source, each normalizing its source's
//! native response into a [`SectionPayload`]. The aggregator fans out
//! over these without knowing anything source-specific.

use async_trait::async_trait;
use ecscope_domain::{ResourceHandle, SectionName, SectionPayload, StatisticsWindow};
use thiserror::Error;

/// A metric source failed. Contained to its section; never propagated to
/// fail the whole report.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("{source_id}: upstream call failed: {cause}")]
    Upstream {
        source_id: &'static str,
        cause: String,
    },

    #[error("{source_id}: throttled by upstream after bounded retry")]
    Throttled { source_id: &'static str },

    #[error("service has no load balancer attached")]
    NoLoadBalancer,

    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

impl FetchError {
    pub fn upstream(source_id: &'static str, cause: impl Into<String>) -> Self {
        FetchError::Upstream {
            source_id,
            cause: cause.into(),
        }
    }
}

/// One independent metric source.
#[async_trait]
pub trait MetricFetcher: Send + Sync {
    /// The report section this fetcher fills.
    fn section(&self) -> SectionName;

    /// Fetch and normalize this source's data for one resolved target.
    async fn fetch(
        &self,
        target: &ResourceHandle,
        window: &StatisticsWindow,
    ) -> Result<SectionPayload, FetchError>;
}
