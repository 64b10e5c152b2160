use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Per-bot send throttle (spec §4.7: "per-bot token bucket (default 30
/// messages/s per bot)"). A minimal fixed-interval gate rather than a true
/// bucket: each `wait_turn` blocks until at least `1/rate` has elapsed since
/// the previous send, which is sufficient to bound a single bot's throughput.
pub struct BotRateLimiter {
    min_interval: Duration,
    last_sent: Mutex<Option<Instant>>,
}

impl BotRateLimiter {
    pub fn new(messages_per_second: u32) -> Self {
        let messages_per_second = messages_per_second.max(1);
        Self {
            min_interval: Duration::from_secs_f64(1.0 / messages_per_second as f64),
            last_sent: Mutex::new(None),
        }
    }

    /// Waits until this bot's next send slot, then reserves it.
    pub async fn wait_turn(&self) {
        loop {
            let now = Instant::now();
            let wait = {
                let mut last = self.last_sent.lock();
                match *last {
                    Some(prev) if now < prev + self.min_interval => Some(prev + self.min_interval - now),
                    _ => {
                        *last = Some(now);
                        None
                    }
                }
            };
            match wait {
                Some(duration) => sleep(duration).await,
                None => return,
            }
        }
    }

    /// Yields the bot's slot for an externally reported retry-after, e.g. a
    /// 429 response (spec §4.7: "yield the reported retry-after for that bot
    /// only").
    pub async fn yield_for(&self, retry_after: Duration) {
        *self.last_sent.lock() = Some(Instant::now() + retry_after - self.min_interval.min(retry_after));
        sleep(retry_after).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn second_call_waits_for_the_interval() {
        let limiter = BotRateLimiter::new(20); // 50ms interval
        let start = Instant::now();
        limiter.wait_turn().await;
        limiter.wait_turn().await;
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
