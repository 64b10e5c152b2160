use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use surebot_pipeline::calculators::CalculatorRegistry;
use surebot_pipeline::config::Config;
use surebot_pipeline::dedup::{CachedDedupStore, DedupStore, RedisDedupStore};
use surebot_pipeline::dispatch::{HttpChatBotClient, PriorityDispatcher};
use surebot_pipeline::feed::{AdaptivePoller, FeedRequestConfig};
use surebot_pipeline::message::{LinkTable, MessageBuilder};
use surebot_pipeline::metrics;
use surebot_pipeline::orchestrator::PipelineOrchestrator;
use surebot_pipeline::validation::{ValidationBounds, ValidationChain};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Surebet ingest-to-delivery pipeline: polls the arbitrage feed, validates
/// and deduplicates candidates, and dispatches chat-ready alerts.
#[derive(Parser, Debug)]
#[command(name = "surebot", version, about)]
struct Cli {
    /// Path to a .env file to load before reading the environment.
    #[arg(long, env = "SUREBOT_ENV_FILE")]
    env_file: Option<String>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "surebot_pipeline=info,surebot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    if let Some(path) = &cli.env_file {
        dotenv::from_path(path).ok();
    }

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        sharp_bookmakers = ?config.sharp_bookmakers,
        target_bookies = ?config.target_bookies,
        "starting surebot pipeline"
    );

    metrics::install(config.metrics_port).context("failed to install metrics exporter")?;

    let http_client = Client::builder()
        .use_rustls_tls()
        .build()
        .context("failed to build HTTP client")?;

    let dedup_store: Arc<dyn DedupStore> = Arc::new(CachedDedupStore::new(
        RedisDedupStore::connect(&config.dedup_store_url, Duration::from_millis(100))
            .await
            .context("failed to connect to dedup store")?,
    ));

    let calculators = CalculatorRegistry::standard(config.sharp_bookmakers.clone());
    let validators = ValidationChain::standard(ValidationBounds {
        min_odds: config.min_odds,
        max_odds: config.max_odds,
        min_profit: config.min_profit,
        max_profit: config.max_profit,
    });
    let message_builder = MessageBuilder::new(
        config.html_cache_ttl,
        config.html_cache_max_entries,
        LinkTable::new(),
    );

    let bot_client = Arc::new(HttpChatBotClient::new(
        http_client.clone(),
        config.api_base.clone(),
        config.bot_tokens.clone(),
        Duration::from_secs(5),
    ));
    let dispatcher = Arc::new(PriorityDispatcher::new(
        config.dispatcher_max_queue,
        bot_client,
        config.bot_tokens.len(),
        config.dispatcher_bot_rate_per_second,
    ));
    let dispatcher_handles = dispatcher.spawn_consumers();

    let poller = AdaptivePoller::new(
        http_client,
        FeedRequestConfig {
            api_base: config.api_base.clone(),
            api_token: config.api_token.clone(),
            bookmakers: config.api_bookmakers.clone(),
            sports: Vec::new(),
            min_odds: config.min_odds,
            max_odds: config.max_odds,
            min_profit: config.min_profit,
            max_profit: config.max_profit,
        },
        config.polling_base_interval,
        config.polling_max_interval,
        Duration::from_secs(3),
    );

    let orchestrator = PipelineOrchestrator::new(
        &config,
        dedup_store,
        calculators,
        validators,
        message_builder,
        Arc::clone(&dispatcher),
    );

    let stats_log_interval = config.stats_log_interval;
    let shutdown_grace_period = config.shutdown_grace_period;

    tokio::select! {
        _ = orchestrator.run(poller, stats_log_interval) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    orchestrator.shutdown(shutdown_grace_period).await;
    for handle in dispatcher_handles {
        let _ = handle.await;
    }

    Ok(())
}
