use crate::calculators::{classify_stake_tier, CalculatorRegistry};
use crate::config::Config;
use crate::dedup::DedupStore;
use crate::dispatch::PriorityDispatcher;
use crate::entities::{BookmakerRegistry, Surebet};
use crate::error::ValidationFailure;
use crate::feed::{parse_batch, AdaptivePoller, FeedParser};
use crate::message::MessageBuilder;
use crate::metrics::PipelineCounters;
use crate::validation::ValidationChain;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{info, warn};

/// Wires every component and drives the poll → process → deliver cycle
/// (spec §4.8, component C10).
pub struct PipelineOrchestrator {
    dedup_store: Arc<dyn DedupStore>,
    parser: FeedParser,
    calculators: CalculatorRegistry,
    validators: Arc<ValidationChain>,
    message_builder: MessageBuilder,
    dispatcher: Arc<PriorityDispatcher>,
    counters: Arc<PipelineCounters>,
    concurrency: Arc<Semaphore>,
    bookmakers: BookmakerRegistry,
    shutdown: Arc<AtomicBool>,
}

impl PipelineOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &Config,
        dedup_store: Arc<dyn DedupStore>,
        calculators: CalculatorRegistry,
        validators: ValidationChain,
        message_builder: MessageBuilder,
        dispatcher: Arc<PriorityDispatcher>,
    ) -> Self {
        Self {
            dedup_store,
            parser: FeedParser::new(config.sharp_bookmakers.clone()),
            calculators,
            validators: Arc::new(validators),
            message_builder,
            dispatcher,
            counters: Arc::new(PipelineCounters::default()),
            concurrency: Arc::new(Semaphore::new(config.concurrent_picks)),
            bookmakers: BookmakerRegistry::build(
                &config.sharp_bookmakers,
                &config.target_bookies,
                &config.bookmaker_channels,
            ),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn counters(&self) -> Arc<PipelineCounters> {
        Arc::clone(&self.counters)
    }

    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Startup sequence plus the main polling loop (spec §4.8, "Startup" and
    /// "Per cycle"). Runs until `shutdown_flag()` is set.
    pub async fn run(&self, mut poller: AdaptivePoller, stats_log_interval: Duration) {
        let cursor = self.dedup_store.load_cursor().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to load cursor at startup; starting from scratch");
            None
        });
        poller.set_cursor(cursor);

        let mut last_stats_log = tokio::time::Instant::now();

        while !self.shutdown.load(Ordering::SeqCst) {
            match poller.fetch().await {
                Ok(Some(batch)) => {
                    self.counters
                        .received
                        .fetch_add(batch.records.len() as u64, Ordering::Relaxed);
                    let now = Utc::now();
                    let (surebets, discarded) = parse_batch(&self.parser, &batch.records, now);
                    for _ in 0..discarded {
                        self.counters.record_discarded();
                    }
                    self.counters
                        .parsed
                        .fetch_add(surebets.len() as u64, Ordering::Relaxed);

                    self.process_cycle(surebets).await;

                    if let Some(cursor) = &batch.next_cursor {
                        if let Err(err) = self.dedup_store.save_cursor(cursor).await {
                            warn!(error = %err, "failed to persist feed cursor");
                        }
                    }
                    poller.sleep_interval().await;
                }
                Ok(None) => {
                    poller.sleep_interval().await;
                }
                Err(err) => {
                    warn!(error = %err, "feed fetch failed");
                    poller.sleep_interval().await;
                }
            }

            if last_stats_log.elapsed() >= stats_log_interval {
                info!(stats = %self.counters.snapshot_line(), "pipeline stats");
                last_stats_log = tokio::time::Instant::now();
            }
        }
    }

    /// Processes one batch of parsed surebets with a bounded fan-out (spec
    /// §4.8, "Process all surviving records concurrently with a bounded
    /// fan-out").
    pub async fn process_cycle(&self, surebets: Vec<Surebet>) {
        let mut handles = Vec::with_capacity(surebets.len());
        for surebet in surebets {
            let permit = Arc::clone(&self.concurrency)
                .acquire_owned()
                .await
                .expect("semaphore is never closed");
            let dedup_store = Arc::clone(&self.dedup_store);
            let dispatcher = Arc::clone(&self.dispatcher);
            let counters = Arc::clone(&self.counters);
            let validators = Arc::clone(&self.validators);
            let channel = self
                .bookmakers
                .channel_for(&surebet.soft_prong.bookmaker_id)
                .map(str::to_string);

            // Calculator selection and message rendering are CPU-only (spec
            // §5: "must not suspend"); only the store lookups inside the
            // validation chain and the final writes suspend, and those now
            // happen inside the spawned task so they fan out under the
            // semaphore instead of serializing the whole batch.
            let min_odds: Option<f64> = self
                .calculators
                .for_sharp(&surebet.sharp_prong.bookmaker_id)
                .min_acceptable_odds(surebet.sharp_prong.odds)
                .ok();
            let tier = classify_stake_tier(surebet.profit);
            let body = match (tier, min_odds) {
                (Some(tier), Some(min_odds)) => {
                    Some(self.message_builder.build(&surebet, tier, min_odds))
                }
                _ => None,
            };

            let handle = tokio::spawn(async move {
                let _permit = permit;
                if let Err(failure) = validators.run(&surebet, dedup_store.as_ref()).await {
                    counters.record_rejected(&failure);
                    return;
                }
                counters.record_validated();

                let (Some(min_odds), Some(body), Some(channel)) = (min_odds, body, channel) else {
                    counters.record_dropped_error();
                    return;
                };
                if surebet.soft_prong.odds.value() < min_odds {
                    counters.record_rejected(&ValidationFailure::BelowMinimumOdds);
                    return;
                }

                if !dispatcher.try_enqueue(surebet.profit, channel, body) {
                    counters.record_dropped_overflow();
                    return;
                }

                let ttl = surebet.soft_prong.event_time.ttl_secs(Utc::now(), 1);
                let mut keys = vec![surebet.soft_prong.dedup_key()];
                keys.extend(surebet.soft_prong.opposite_dedup_keys());
                for key in &keys {
                    if let Err(err) = dedup_store.record(key, ttl).await {
                        crate::dedup::warn_on_write_failure(key, &err);
                    }
                }
                counters.record_deduped();
                counters.record_sent();
            });
            handles.push(handle);
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Requests shutdown: stops the poll loop, stops dispatcher consumers
    /// from picking up new work, and waits up to `grace_period` for the
    /// queue to drain (spec §4.8, "Shutdown").
    pub async fn shutdown(&self, grace_period: Duration) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.dispatcher.shutdown();
        let deadline = tokio::time::Instant::now() + grace_period;
        while tokio::time::Instant::now() < deadline && self.dispatcher.queue_len() > 0 {
            sleep(Duration::from_millis(50)).await;
        }
        if self.dispatcher.queue_len() > 0 {
            warn!(
                remaining = self.dispatcher.queue_len(),
                "shutdown grace period elapsed; abandoning queued entries"
            );
        }
    }
}
