use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

/// Result of one delivery attempt, classified per spec §4.7's error policy.
#[derive(Debug)]
pub enum SendOutcome {
    Success,
    /// 5xx or timeout: retryable with backoff and bot rotation.
    Transient,
    /// 429: retryable after the reported delay, same bot.
    RateLimited(Duration),
    /// 4xx other than 429, or a forbidden channel: dropped, never retried.
    Permanent,
}

/// One outbound chat bot identity (spec §6: "Multiple bot identities, each
/// with its own token; destination is a channel id").
#[async_trait]
pub trait ChatBotClient: Send + Sync {
    async fn send(&self, bot_index: usize, channel_id: &str, body: &str) -> SendOutcome;
}

#[derive(Serialize)]
struct SendMessagePayload<'a> {
    channel_id: &'a str,
    text: &'a str,
}

/// HTTPS chat client, one bearer token per bot identity (spec §6, "Outbound
/// chat (HTTPS, JSON)"). Built once at startup and cloned into dispatcher
/// tasks, matching the teacher's `Client`-field-by-value pattern.
pub struct HttpChatBotClient {
    client: Client,
    api_base: String,
    bot_tokens: Vec<String>,
    send_timeout: Duration,
}

impl HttpChatBotClient {
    pub fn new(client: Client, api_base: String, bot_tokens: Vec<String>, send_timeout: Duration) -> Self {
        Self {
            client,
            api_base,
            bot_tokens,
            send_timeout,
        }
    }

    pub fn bot_count(&self) -> usize {
        self.bot_tokens.len()
    }
}

#[async_trait]
impl ChatBotClient for HttpChatBotClient {
    async fn send(&self, bot_index: usize, channel_id: &str, body: &str) -> SendOutcome {
        let Some(token) = self.bot_tokens.get(bot_index) else {
            warn!(bot_index, "no token configured for bot index");
            return SendOutcome::Permanent;
        };
        let url = format!("{}/send", self.api_base);
        let payload = SendMessagePayload {
            channel_id,
            text: body,
        };
        let request = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&payload)
            .send();

        let response = match tokio::time::timeout(self.send_timeout, request).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(_)) | Err(_) => return SendOutcome::Transient,
        };

        let status = response.status();
        if status.is_success() {
            SendOutcome::Success
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_millis(500));
            SendOutcome::RateLimited(retry_after)
        } else if status.is_server_error() {
            SendOutcome::Transient
        } else {
            SendOutcome::Permanent
        }
    }
}
