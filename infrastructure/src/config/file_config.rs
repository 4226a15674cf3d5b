//! Configuration file schema

use crate::aws::clients::AwsSettings;
use crate::llm::advisor::HttpAdvisorConfig;
use ecscope_application::aggregator::AggregatorConfig;
use ecscope_domain::ResolverThresholds;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub aws: AwsSection,
    pub cache: CacheSection,
    pub resolver: ResolverSection,
    pub metrics: MetricsSection,
    pub aggregate: AggregateSection,
    pub advisor: AdvisorSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSection {
    pub region: String,
    pub access_key: Option<String>,
    pub secret_access_key: Option<String>,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for AwsSection {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            access_key: None,
            secret_access_key: None,
            connect_timeout_secs: 10,
            read_timeout_secs: 30,
        }
    }
}

impl AwsSection {
    pub fn to_settings(&self) -> AwsSettings {
        AwsSettings {
            region: self.region.clone(),
            access_key: self.access_key.clone(),
            secret_access_key: self.secret_access_key.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self { ttl_secs: 45 }
    }
}

impl CacheSection {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSection {
    pub high_confidence: f64,
    pub ambiguity_margin: f64,
    pub floor: f64,
    pub max_candidates: usize,
}

impl Default for ResolverSection {
    fn default() -> Self {
        let t = ResolverThresholds::default();
        Self {
            high_confidence: t.high_confidence,
            ambiguity_margin: t.ambiguity_margin,
            floor: t.floor,
            max_candidates: t.max_candidates,
        }
    }
}

impl ResolverSection {
    pub fn thresholds(&self) -> ResolverThresholds {
        ResolverThresholds {
            high_confidence: self.high_confidence,
            ambiguity_margin: self.ambiguity_margin,
            floor: self.floor,
            max_candidates: self.max_candidates,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSection {
    pub default_window_minutes: i64,
    pub period_secs: u32,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            default_window_minutes: 15,
            period_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateSection {
    pub timeout_secs: u64,
    pub max_concurrent_fetches: usize,
}

impl Default for AggregateSection {
    fn default() -> Self {
        let c = AggregatorConfig::default();
        Self {
            timeout_secs: c.timeout.as_secs(),
            max_concurrent_fetches: c.max_concurrent_fetches,
        }
    }
}

impl AggregateSection {
    pub fn to_aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            max_concurrent_fetches: self.max_concurrent_fetches,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorSection {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for AdvisorSection {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 8,
        }
    }
}

impl AdvisorSection {
    pub fn to_advisor_config(&self, api_key: Option<String>) -> HttpAdvisorConfig {
        HttpAdvisorConfig {
            base_url: self.base_url.clone(),
            api_key,
            model: self.model.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
