use crate::feed::wire::{RawFeedResponse, RawRecord};
use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Bounded retry budget for transport errors/timeouts, independent of the
/// 429 counter (spec §4.5: "retries with bounded exponential backoff ...
/// up to 3 attempts per cycle; an unrecoverable cycle yields the empty
/// batch").
const MAX_FETCH_ATTEMPTS: u32 = 3;
const FETCH_INITIAL_BACKOFF_MS: u64 = 100;

/// One fetched batch plus the cursor token to persist once the batch has been
/// parsed and processed (spec §4.5: "updates the cursor to `{sort_by}:{id}`
/// of the last record in feed order").
pub struct FetchedBatch {
    pub records: Vec<RawRecord>,
    pub next_cursor: Option<String>,
}

/// Parameters of the upstream feed request (spec §4.5, §6).
#[derive(Debug, Clone)]
pub struct FeedRequestConfig {
    pub api_base: String,
    pub api_token: String,
    pub bookmakers: Vec<String>,
    pub sports: Vec<String>,
    pub min_odds: f64,
    pub max_odds: f64,
    pub min_profit: f64,
    pub max_profit: f64,
}

/// Rate-limited, cursor-driven feed fetcher (spec §4.5, component C6).
///
/// Tracks `consecutive_rate_limits` to compute the adaptive inter-cycle
/// sleep: `current_interval = min(max_interval, base_interval * 2^k)`.
pub struct AdaptivePoller {
    client: Client,
    request: FeedRequestConfig,
    base_interval: Duration,
    max_interval: Duration,
    request_timeout: Duration,
    consecutive_rate_limits: u32,
    cursor: Option<String>,
}

impl AdaptivePoller {
    pub fn new(
        client: Client,
        request: FeedRequestConfig,
        base_interval: Duration,
        max_interval: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            request,
            base_interval,
            max_interval,
            request_timeout,
            consecutive_rate_limits: 0,
            cursor: None,
        }
    }

    /// Seeds the cursor from the dedup store at startup (spec §4.5, §6.2
    /// step 3: "Load cursor from C4 into C6").
    pub fn set_cursor(&mut self, cursor: Option<String>) {
        self.cursor = cursor;
    }

    /// The interval to sleep before the next cycle, per the current
    /// rate-limit streak (spec §4.5, §5 invariant 6).
    pub fn current_interval(&self) -> Duration {
        let factor = 2u32.saturating_pow(self.consecutive_rate_limits.min(4));
        (self.base_interval * factor).min(self.max_interval)
    }

    fn build_request(&self) -> reqwest::RequestBuilder {
        let url = format!("{}/request", self.request.api_base);
        let mut query = vec![
            ("product".to_string(), "surebets".to_string()),
            ("outcomes".to_string(), "2".to_string()),
            ("order".to_string(), "created_at_desc".to_string()),
            ("min-profit".to_string(), self.request.min_profit.to_string()),
            ("max-profit".to_string(), self.request.max_profit.to_string()),
            ("min-odds".to_string(), self.request.min_odds.to_string()),
            ("max-odds".to_string(), self.request.max_odds.to_string()),
            ("hide-different-rules".to_string(), "true".to_string()),
            ("startAge".to_string(), "PT10M".to_string()),
            ("limit".to_string(), "5000".to_string()),
            ("oddsFormat".to_string(), "eu".to_string()),
            ("source".to_string(), self.request.bookmakers.join("|")),
        ];
        if !self.request.sports.is_empty() {
            query.push(("sport".to_string(), self.request.sports.join("|")));
        }
        if let Some(cursor) = &self.cursor {
            query.push(("cursor".to_string(), cursor.clone()));
        }
        self.client
            .get(url)
            .bearer_auth(&self.request.api_token)
            .query(&query)
    }

    /// Sends the request, retrying transport errors and timeouts with
    /// exponential backoff up to `MAX_FETCH_ATTEMPTS` (spec §4.5). Does not
    /// retry on a successful response, including rate-limit/non-2xx
    /// statuses — those are handled by the caller.
    async fn send_with_retry(&self) -> Result<Response> {
        let mut backoff_ms = FETCH_INITIAL_BACKOFF_MS;
        let mut last_err = None;
        for attempt in 0..MAX_FETCH_ATTEMPTS {
            match timeout(self.request_timeout, self.build_request().send()).await {
                Ok(Ok(resp)) => return Ok(resp),
                Ok(Err(err)) => last_err = Some(anyhow!(err).context("feed request failed")),
                Err(_) => last_err = Some(anyhow!("feed request timed out")),
            }
            if attempt + 1 < MAX_FETCH_ATTEMPTS {
                warn!(attempt = attempt + 1, backoff_ms, "retrying feed request");
                sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms = backoff_ms.saturating_mul(2);
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("feed request failed with no recorded error")))
    }

    /// Fetches and parses the next batch, advancing the in-memory cursor on
    /// success. Returns `Ok(None)` on a rate-limit response (caller should
    /// re-sleep without treating it as a hard error); `Err` on transport or
    /// decode failure.
    pub async fn fetch(&mut self) -> Result<Option<FetchedBatch>> {
        let response = self.send_with_retry().await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            self.consecutive_rate_limits = (self.consecutive_rate_limits + 1).min(4);
            warn!(
                consecutive_rate_limits = self.consecutive_rate_limits,
                "feed rate-limited"
            );
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow!("feed returned status {}", response.status()));
        }

        let body: RawFeedResponse = response
            .json()
            .await
            .context("failed to decode feed response")?;

        self.consecutive_rate_limits = self.consecutive_rate_limits.saturating_sub(1);

        let next_cursor = body
            .records
            .last()
            .map(|last| format!("{}:{}", last.sort_by, last.id));
        if let Some(cursor) = &next_cursor {
            self.cursor = Some(cursor.clone());
        }

        debug!(count = body.records.len(), cursor = ?next_cursor, "fetched feed batch");
        Ok(Some(FetchedBatch {
            records: body.records,
            next_cursor,
        }))
    }

    /// Sleeps for the current adaptive interval, respecting `cancel`.
    pub async fn sleep_interval(&self) {
        sleep(self.current_interval()).await;
    }
}
