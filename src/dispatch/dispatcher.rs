use crate::dispatch::bot_client::{ChatBotClient, SendOutcome};
use crate::dispatch::heap::DispatchHeap;
use crate::dispatch::rate_limiter::BotRateLimiter;
use crate::types::Profit;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, warn};

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_SCHEDULE_MS: [u64; 3] = [100, 400, 1600];
const IDLE_POLL: Duration = Duration::from_millis(25);

/// Bounded priority queue plus its pool of bot consumers (spec §4.7,
/// component C9). One consumer task per bot drains the shared heap under
/// mutual exclusion; producers enqueue without blocking them.
pub struct PriorityDispatcher {
    heap: Arc<DispatchHeap>,
    bot_client: Arc<dyn ChatBotClient>,
    rate_limiters: Vec<Arc<BotRateLimiter>>,
    shutdown: Arc<AtomicBool>,
}

impl PriorityDispatcher {
    pub fn new(
        capacity: usize,
        bot_client: Arc<dyn ChatBotClient>,
        bot_count: usize,
        messages_per_second_per_bot: u32,
    ) -> Self {
        Self {
            heap: Arc::new(DispatchHeap::new(capacity)),
            bot_client,
            rate_limiters: (0..bot_count)
                .map(|_| Arc::new(BotRateLimiter::new(messages_per_second_per_bot)))
                .collect(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn queue_len(&self) -> usize {
        self.heap.len()
    }

    /// Admits a rendered message for delivery (spec §4.8 step 4: "Enqueue on
    /// C9 keyed on the surebet's profit"). `false` means the queue was full
    /// and this entry did not outrank the current minimum.
    pub fn try_enqueue(&self, profit: Profit, channel_id: String, body: String) -> bool {
        self.heap.try_enqueue(profit, channel_id, body)
    }

    /// Signals every consumer to stop picking up new work (spec §4.8,
    /// "Shutdown: cancel the poller, drain the dispatcher for a bounded
    /// grace period").
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Spawns one consumer task per bot identity.
    pub fn spawn_consumers(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        self.rate_limiters
            .iter()
            .enumerate()
            .map(|(bot_index, limiter)| {
                let dispatcher = Arc::clone(self);
                let limiter = Arc::clone(limiter);
                tokio::spawn(async move { dispatcher.run_consumer(bot_index, limiter).await })
            })
            .collect()
    }

    async fn run_consumer(self: Arc<Self>, bot_index: usize, limiter: Arc<BotRateLimiter>) {
        loop {
            if self.shutdown.load(Ordering::SeqCst) && self.heap.is_empty() {
                return;
            }
            let Some(entry) = self.heap.pop_max() else {
                sleep(IDLE_POLL).await;
                continue;
            };

            limiter.wait_turn().await;
            match self
                .bot_client
                .send(bot_index, &entry.channel_id, &entry.body)
                .await
            {
                SendOutcome::Success => {
                    info!(bot_index, channel_id = %entry.channel_id, "message delivered");
                }
                SendOutcome::Permanent => {
                    warn!(bot_index, channel_id = %entry.channel_id, "permanent delivery failure; dropping");
                }
                SendOutcome::RateLimited(retry_after) => {
                    limiter.yield_for(retry_after).await;
                    self.heap.requeue_unchanged(entry);
                }
                SendOutcome::Transient => {
                    if entry.attempts + 1 >= MAX_ATTEMPTS {
                        warn!(
                            bot_index,
                            channel_id = %entry.channel_id,
                            attempts = entry.attempts + 1,
                            "transient delivery failures exhausted retries; dropping"
                        );
                    } else {
                        let backoff = BACKOFF_SCHEDULE_MS[entry.attempts as usize];
                        sleep(Duration::from_millis(backoff)).await;
                        self.heap.requeue(entry);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    struct ScriptedBotClient {
        outcomes: Vec<SendOutcome>,
        index: AtomicUsize,
        sent: Arc<Notify>,
    }

    #[async_trait]
    impl ChatBotClient for ScriptedBotClient {
        async fn send(&self, _bot_index: usize, _channel_id: &str, _body: &str) -> SendOutcome {
            let i = self.index.fetch_add(1, Ordering::SeqCst);
            let outcome = match self.outcomes.get(i) {
                Some(SendOutcome::Success) => SendOutcome::Success,
                Some(SendOutcome::Permanent) => SendOutcome::Permanent,
                Some(SendOutcome::Transient) => SendOutcome::Transient,
                Some(SendOutcome::RateLimited(d)) => SendOutcome::RateLimited(*d),
                None => SendOutcome::Success,
            };
            if matches!(outcome, SendOutcome::Success) {
                self.sent.notify_one();
            }
            outcome
        }
    }

    fn p(v: f64) -> Profit {
        Profit::new(v).unwrap()
    }

    #[tokio::test]
    async fn successful_delivery_drains_the_queue() {
        let sent = Arc::new(Notify::new());
        let client = Arc::new(ScriptedBotClient {
            outcomes: vec![SendOutcome::Success],
            index: AtomicUsize::new(0),
            sent: Arc::clone(&sent),
        });
        let dispatcher = Arc::new(PriorityDispatcher::new(10, client, 1, 1000));
        assert!(dispatcher.try_enqueue(p(2.0), "chan".into(), "body".into()));
        let handles = dispatcher.spawn_consumers();
        sent.notified().await;
        dispatcher.shutdown();
        for h in handles {
            let _ = h.await;
        }
        assert_eq!(dispatcher.queue_len(), 0);
    }

    #[tokio::test]
    async fn transient_failure_is_retried_then_eventually_dropped() {
        let sent = Arc::new(Notify::new());
        let client = Arc::new(ScriptedBotClient {
            outcomes: vec![
                SendOutcome::Transient,
                SendOutcome::Transient,
                SendOutcome::Transient,
            ],
            index: AtomicUsize::new(0),
            sent: Arc::clone(&sent),
        });
        let dispatcher = Arc::new(PriorityDispatcher::new(10, client, 1, 1000));
        assert!(dispatcher.try_enqueue(p(2.0), "chan".into(), "body".into()));
        let handles = dispatcher.spawn_consumers();
        // Give the consumer time to exhaust all 3 attempts (100+400ms backoff).
        tokio::time::sleep(Duration::from_millis(700)).await;
        dispatcher.shutdown();
        for h in handles {
            let _ = h.await;
        }
        assert_eq!(dispatcher.queue_len(), 0);
    }
}
