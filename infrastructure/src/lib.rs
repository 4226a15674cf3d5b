//! Infrastructure layer for ecscope
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the AWS inventory source and metric fetchers, the
//! optional LLM disambiguation advisor, and configuration file loading.

pub mod aws;
pub mod config;
pub mod fetchers;
pub mod llm;

// Re-export commonly used types
pub use aws::{
    clients::{AwsClients, AwsSettings},
    inventory::EcsInventorySource,
};
pub use config::{ConfigLoader, FileConfig};
pub use fetchers::{
    deployment::DeploymentFetcher, requests::RequestsFetcher,
    response_time::ResponseTimeFetcher, target_health::TargetHealthFetcher,
    utilization::UtilizationFetcher,
};
pub use llm::advisor::{HttpAdvisorConfig, HttpDisambiguationAdvisor};
