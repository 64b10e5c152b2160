use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use surebot_pipeline::calculators::CalculatorRegistry;
use surebot_pipeline::config::Config;
use surebot_pipeline::dedup::InMemoryDedupStore;
use surebot_pipeline::dispatch::{ChatBotClient, PriorityDispatcher, SendOutcome};
use surebot_pipeline::entities::{Pick, Role, Surebet};
use surebot_pipeline::message::{LinkTable, MessageBuilder};
use surebot_pipeline::orchestrator::PipelineOrchestrator;
use surebot_pipeline::types::{EventTime, Market, MarketKind, Odds, Profit};
use surebot_pipeline::validation::{ValidationBounds, ValidationChain};
use tokio::sync::Notify;

fn test_config() -> Config {
    let mut bookmaker_channels = HashMap::new();
    bookmaker_channels.insert("softbook".to_string(), "chan-softbook".to_string());

    Config {
        api_base: "https://feed.example".to_string(),
        api_token: "token".to_string(),
        api_bookmakers: vec!["pinnacle".to_string(), "softbook".to_string()],
        sharp_bookmakers: vec!["pinnacle".to_string()],
        target_bookies: vec!["softbook".to_string()],
        bookmaker_channels,
        min_odds: 1.10,
        max_odds: 9.99,
        min_profit: -1.0,
        max_profit: 25.0,
        polling_base_interval: Duration::from_millis(500),
        polling_max_interval: Duration::from_secs(5),
        concurrent_picks: 16,
        dispatcher_max_queue: 100,
        dispatcher_bot_rate_per_second: 1000,
        html_cache_ttl: Duration::from_secs(60),
        html_cache_max_entries: 128,
        bot_tokens: vec!["bot1".to_string()],
        dedup_store_url: "redis://unused".to_string(),
        stats_log_interval: Duration::from_secs(10),
        shutdown_grace_period: Duration::from_secs(1),
        metrics_port: 0,
    }
}

fn surebet(profit_pct: f64, soft_odds: f64) -> Surebet {
    let now = chrono::Utc::now();
    let et = EventTime::from_epoch_millis((now + chrono::Duration::hours(1)).timestamp_millis(), now).unwrap();
    let market = Market::new(MarketKind::Over, Some(2.5), None, None, None, false);
    let sharp = Pick::new(
        "Team A",
        "Team B",
        "Tournament",
        et,
        market.clone(),
        Odds::new(2.0).unwrap(),
        "pinnacle",
        Role::Sharp,
    )
    .unwrap();
    let soft = Pick::new(
        "Team A",
        "Team B",
        "Tournament",
        et,
        market,
        Odds::new(soft_odds).unwrap(),
        "softbook",
        Role::Soft,
    )
    .unwrap();
    Surebet::new("record-1", sharp, soft, Profit::new(profit_pct).unwrap()).unwrap()
}

struct RecordingBotClient {
    sent: Arc<Notify>,
    count: AtomicUsize,
}

#[async_trait]
impl ChatBotClient for RecordingBotClient {
    async fn send(&self, _bot_index: usize, _channel_id: &str, _body: &str) -> SendOutcome {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.sent.notify_one();
        SendOutcome::Success
    }
}

fn build_orchestrator(
    config: &Config,
    dedup_store: Arc<InMemoryDedupStore>,
    bot_client: Arc<RecordingBotClient>,
) -> (PipelineOrchestrator, Arc<PriorityDispatcher>) {
    let calculators = CalculatorRegistry::standard(config.sharp_bookmakers.clone());
    let validators = ValidationChain::standard(ValidationBounds {
        min_odds: config.min_odds,
        max_odds: config.max_odds,
        min_profit: config.min_profit,
        max_profit: config.max_profit,
    });
    let message_builder = MessageBuilder::new(config.html_cache_ttl, config.html_cache_max_entries, LinkTable::new());
    let dispatcher = Arc::new(PriorityDispatcher::new(
        config.dispatcher_max_queue,
        bot_client,
        config.bot_tokens.len(),
        config.dispatcher_bot_rate_per_second,
    ));
    let orchestrator = PipelineOrchestrator::new(
        config,
        dedup_store,
        calculators,
        validators,
        message_builder,
        Arc::clone(&dispatcher),
    );
    (orchestrator, dispatcher)
}

#[tokio::test]
async fn s1_valid_pick_is_validated_computed_rendered_and_delivered() {
    let config = test_config();
    let dedup_store = Arc::new(InMemoryDedupStore::default());
    let sent = Arc::new(Notify::new());
    let bot_client = Arc::new(RecordingBotClient {
        sent: Arc::clone(&sent),
        count: AtomicUsize::new(0),
    });
    let (orchestrator, dispatcher) = build_orchestrator(&config, Arc::clone(&dedup_store), Arc::clone(&bot_client));
    let handles = dispatcher.spawn_consumers();

    orchestrator.process_cycle(vec![surebet(2.38, 2.10)]).await;

    tokio::time::timeout(Duration::from_secs(1), sent.notified())
        .await
        .expect("message should have been delivered");

    dispatcher.shutdown();
    for h in handles {
        let _ = h.await;
    }
    assert_eq!(bot_client.count.load(Ordering::SeqCst), 1);
    assert_eq!(orchestrator.counters().sent.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn s2_duplicate_pick_is_rejected_on_second_cycle() {
    let config = test_config();
    let dedup_store = Arc::new(InMemoryDedupStore::default());
    let sent = Arc::new(Notify::new());
    let bot_client = Arc::new(RecordingBotClient {
        sent: Arc::clone(&sent),
        count: AtomicUsize::new(0),
    });
    let (orchestrator, dispatcher) = build_orchestrator(&config, Arc::clone(&dedup_store), Arc::clone(&bot_client));
    let handles = dispatcher.spawn_consumers();

    let sb = surebet(2.38, 2.10);
    orchestrator.process_cycle(vec![sb.clone()]).await;
    tokio::time::timeout(Duration::from_secs(1), sent.notified())
        .await
        .expect("first delivery should succeed");

    // Same record, re-fetched (spec S2/S6): the soft prong's dedup key is
    // now present, so the second pass must be rejected before delivery.
    orchestrator.process_cycle(vec![sb]).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    dispatcher.shutdown();
    for h in handles {
        let _ = h.await;
    }
    assert_eq!(bot_client.count.load(Ordering::SeqCst), 1);
    assert_eq!(orchestrator.counters().rejected.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn soft_odds_below_minimum_is_rejected_without_store_writes() {
    let config = test_config();
    let dedup_store = Arc::new(InMemoryDedupStore::default());
    let sent = Arc::new(Notify::new());
    let bot_client = Arc::new(RecordingBotClient {
        sent: Arc::clone(&sent),
        count: AtomicUsize::new(0),
    });
    let (orchestrator, dispatcher) = build_orchestrator(&config, Arc::clone(&dedup_store), Arc::clone(&bot_client));
    let handles = dispatcher.spawn_consumers();

    // sharp odds 2.00 -> min acceptable soft odds ~= 1.9608; 1.20 is below it.
    orchestrator.process_cycle(vec![surebet(2.38, 1.20)]).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    dispatcher.shutdown();
    for h in handles {
        let _ = h.await;
    }
    assert_eq!(bot_client.count.load(Ordering::SeqCst), 0);
}
