use crate::error::ConfigError;
use std::collections::HashMap;
use std::time::Duration;

fn env_var(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn env_list(name: &str, default: &str) -> Vec<String> {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .split(['|', ','])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            var: name,
            reason: format!("could not parse '{}'", raw),
        }),
        Err(_) => Ok(default),
    }
}

/// Typed configuration loaded from the environment (spec §6, "Configuration
/// (recognized options)"), mirroring the teacher's `Config::from_env`
/// pattern of `dotenv` + `std::env::var` with parsed defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub api_token: String,
    pub api_bookmakers: Vec<String>,
    pub sharp_bookmakers: Vec<String>,
    pub target_bookies: Vec<String>,
    pub bookmaker_channels: HashMap<String, String>,

    pub min_odds: f64,
    pub max_odds: f64,
    pub min_profit: f64,
    pub max_profit: f64,

    pub polling_base_interval: Duration,
    pub polling_max_interval: Duration,

    pub concurrent_picks: usize,
    pub dispatcher_max_queue: usize,
    pub dispatcher_bot_rate_per_second: u32,

    pub html_cache_ttl: Duration,
    pub html_cache_max_entries: usize,

    pub bot_tokens: Vec<String>,

    pub dedup_store_url: String,

    pub stats_log_interval: Duration,
    pub shutdown_grace_period: Duration,

    pub metrics_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let api_base = env_var("SUREBOT_API_BASE")?;
        let api_token = env_var("SUREBOT_API_TOKEN")?;
        let api_bookmakers = env_list("SUREBOT_API_BOOKMAKERS", "");
        let sharp_bookmakers = env_list("SUREBOT_SHARP_BOOKMAKERS", "");
        let target_bookies = env_list("SUREBOT_TARGET_BOOKIES", "");

        let bookmaker_channels = env_list("SUREBOT_BOOKMAKER_CHANNELS", "")
            .into_iter()
            .map(|pair| {
                let mut parts = pair.splitn(2, '=');
                let bookie = parts.next().unwrap_or_default().trim().to_string();
                let channel = parts.next().unwrap_or_default().trim().to_string();
                (bookie, channel)
            })
            .filter(|(bookie, channel)| !bookie.is_empty() && !channel.is_empty())
            .collect::<HashMap<_, _>>();

        let bot_tokens = env_list("SUREBOT_BOT_TOKENS", "");
        if bot_tokens.is_empty() {
            return Err(ConfigError::MissingVar("SUREBOT_BOT_TOKENS"));
        }

        let dedup_store_url = env_var("SUREBOT_DEDUP_STORE_URL")?;

        let config = Self {
            api_base,
            api_token,
            api_bookmakers,
            sharp_bookmakers,
            target_bookies,
            bookmaker_channels,
            min_odds: env_parsed("SUREBOT_MIN_ODDS", 1.10)?,
            max_odds: env_parsed("SUREBOT_MAX_ODDS", 9.99)?,
            min_profit: env_parsed("SUREBOT_MIN_PROFIT", -1.0)?,
            max_profit: env_parsed("SUREBOT_MAX_PROFIT", 25.0)?,
            polling_base_interval: Duration::from_secs_f64(env_parsed(
                "SUREBOT_POLLING_BASE_INTERVAL_SECS",
                0.5,
            )?),
            polling_max_interval: Duration::from_secs_f64(env_parsed(
                "SUREBOT_POLLING_MAX_INTERVAL_SECS",
                5.0,
            )?),
            concurrent_picks: env_parsed("SUREBOT_CONCURRENT_PICKS", 250)?,
            dispatcher_max_queue: env_parsed("SUREBOT_DISPATCHER_MAX_QUEUE", 1000)?,
            dispatcher_bot_rate_per_second: env_parsed("SUREBOT_BOT_RATE_PER_SECOND", 30)?,
            html_cache_ttl: Duration::from_secs(env_parsed("SUREBOT_HTML_CACHE_TTL_SECS", 60)?),
            html_cache_max_entries: env_parsed("SUREBOT_HTML_CACHE_MAX_ENTRIES", 4096)?,
            bot_tokens,
            dedup_store_url,
            stats_log_interval: Duration::from_secs(env_parsed("SUREBOT_STATS_LOG_INTERVAL_SECS", 10)?),
            shutdown_grace_period: Duration::from_secs(env_parsed("SUREBOT_SHUTDOWN_GRACE_SECS", 5)?),
            metrics_port: env_parsed("SUREBOT_METRICS_PORT", 9898)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Fail-fast check from spec §9's open question: every target bookie must
    /// have a channel mapping, rather than silently dropping its picks.
    fn validate(&self) -> Result<(), ConfigError> {
        for bookie in &self.target_bookies {
            if !self.bookmaker_channels.contains_key(bookie) {
                return Err(ConfigError::UnmappedTargetBookie(bookie.clone()));
            }
        }
        Ok(())
    }
}
