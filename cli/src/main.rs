//! CLI entrypoint for ecscope
//!
//! This is the main binary that wires together all layers using
//! dependency injection, then serves tool calls over a line-delimited
//! JSON loop on stdin/stdout.

mod serve;

use anyhow::Result;
use clap::Parser;
use ecscope_application::{
    Aggregator, InventoryCache, NameResolver, ToolFacade, tool_definitions,
};
use ecscope_infrastructure::{
    AwsClients, ConfigLoader, DeploymentFetcher, EcsInventorySource, HttpDisambiguationAdvisor,
    RequestsFetcher, ResponseTimeFetcher, TargetHealthFetcher, UtilizationFetcher,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ecscope", about = "Diagnose ECS clusters from fuzzy resource names")]
struct Cli {
    /// Path to an explicit configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// AWS region (overrides configuration)
    #[arg(long)]
    region: Option<String>,

    /// Static AWS access key (defaults to the ambient credential chain)
    #[arg(long)]
    access_key: Option<String>,

    /// Static AWS secret access key
    #[arg(long)]
    secret_access_key: Option<String>,

    /// Print the tool definitions as JSON and exit
    #[arg(long)]
    list_tools: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level. Logs go to stderr so
    // stdout stays a clean reply channel.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.list_tools {
        println!("{}", serde_json::to_string_pretty(&tool_definitions())?);
        return Ok(());
    }

    let mut config = ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?;
    if let Some(region) = cli.region {
        config.aws.region = region;
    }
    if cli.access_key.is_some() {
        config.aws.access_key = cli.access_key;
        config.aws.secret_access_key = cli.secret_access_key;
    }

    info!(region = %config.aws.region, "starting ecscope");

    // === Dependency Injection ===
    let clients = AwsClients::connect(&config.aws.to_settings()).await;
    let inventory = Arc::new(InventoryCache::new(
        EcsInventorySource::new(clients.clone()),
        config.cache.ttl(),
    ));

    let mut resolver = NameResolver::new(Arc::clone(&inventory), config.resolver.thresholds());
    if config.advisor.enabled {
        let api_key = std::env::var(&config.advisor.api_key_env).ok();
        match HttpDisambiguationAdvisor::new(config.advisor.to_advisor_config(api_key)) {
            Ok(advisor) => {
                info!(model = %config.advisor.model, "semantic disambiguation enabled");
                resolver = resolver.with_advisor(Arc::new(advisor));
            }
            Err(e) => warn!(error = %e, "advisor unavailable; lexical resolution only"),
        }
    }

    let aggregator = Aggregator::new(config.aggregate.to_aggregator_config())
        .register(Arc::new(DeploymentFetcher::new(clients.clone())))
        .register(Arc::new(UtilizationFetcher::new(clients.clone())))
        .register(Arc::new(TargetHealthFetcher::new(clients.clone())))
        .register(Arc::new(ResponseTimeFetcher::new(clients.clone())))
        .register(Arc::new(RequestsFetcher::new(clients)));

    let facade = ToolFacade::new(
        resolver,
        inventory,
        aggregator,
        config.metrics.default_window_minutes,
        config.metrics.period_secs,
    );

    serve::run(facade).await
}
