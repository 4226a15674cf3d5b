//! AWS client construction
//!
//! Builds the ECS, CloudWatch, and ELBv2 clients from one shared config.
//! A static key pair takes precedence when supplied; otherwise the
//! ambient credential chain (environment, profile, instance role)
//! applies. SDK-internal retries are disabled — the engine runs its own
//! bounded throttle retry so upstream pressure stays predictable.

use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ecs::config::Credentials;
use std::time::Duration;
use tracing::info;

/// Connection settings consumed from configuration.
#[derive(Debug, Clone)]
pub struct AwsSettings {
    pub region: String,
    pub access_key: Option<String>,
    pub secret_access_key: Option<String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

/// The three service clients the engine reads from.
#[derive(Clone)]
pub struct AwsClients {
    pub ecs: aws_sdk_ecs::Client,
    pub cloudwatch: aws_sdk_cloudwatch::Client,
    pub elbv2: aws_sdk_elasticloadbalancingv2::Client,
}

impl AwsClients {
    /// Load shared AWS configuration and construct all service clients.
    pub async fn connect(settings: &AwsSettings) -> Self {
        let timeouts = TimeoutConfig::builder()
            .connect_timeout(settings.connect_timeout)
            .read_timeout(settings.read_timeout)
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .timeout_config(timeouts)
            .retry_config(RetryConfig::disabled());

        match (&settings.access_key, &settings.secret_access_key) {
            (Some(access_key), Some(secret)) => {
                info!(region = %settings.region, "using static AWS credentials");
                loader = loader.credentials_provider(Credentials::new(
                    access_key.clone(),
                    secret.clone(),
                    None,
                    None,
                    "ecscope-static",
                ));
            }
            _ => {
                info!(
                    region = %settings.region,
                    "no static credentials supplied; using ambient credential chain"
                );
            }
        }

        let shared = loader.load().await;
        Self {
            ecs: aws_sdk_ecs::Client::new(&shared),
            cloudwatch: aws_sdk_cloudwatch::Client::new(&shared),
            elbv2: aws_sdk_elasticloadbalancingv2::Client::new(&shared),
        }
    }
}
