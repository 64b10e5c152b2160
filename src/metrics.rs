use crate::error::ValidationFailure;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Counter names surfaced through the Prometheus exporter (spec §4.8,
/// "Counters/observability: picks received, parsed, validated, deduped,
/// sent, dropped-by-overflow, dropped-by-error; bucketed by reason").
pub const PICKS_RECEIVED: &str = "surebot_picks_received_total";
pub const PICKS_PARSED: &str = "surebot_picks_parsed_total";
pub const PICKS_DISCARDED: &str = "surebot_picks_discarded_total";
pub const PICKS_VALIDATED: &str = "surebot_picks_validated_total";
pub const PICKS_REJECTED: &str = "surebot_picks_rejected_total";
pub const PICKS_DEDUPED: &str = "surebot_picks_deduped_total";
pub const PICKS_SENT: &str = "surebot_picks_sent_total";
pub const PICKS_DROPPED_OVERFLOW: &str = "surebot_picks_dropped_overflow_total";
pub const PICKS_DROPPED_ERROR: &str = "surebot_picks_dropped_error_total";

/// Reason-bucketed rejection counters (spec §4.8: rejections "bucketed by
/// reason"), one per [`ValidationFailure`] variant.
pub const PICKS_REJECTED_ODDS_RANGE: &str = "surebot_picks_rejected_odds_range_total";
pub const PICKS_REJECTED_PROFIT_RANGE: &str = "surebot_picks_rejected_profit_range_total";
pub const PICKS_REJECTED_NOT_FUTURE: &str = "surebot_picks_rejected_not_future_total";
pub const PICKS_REJECTED_MISSING_ROLE: &str = "surebot_picks_rejected_missing_role_total";
pub const PICKS_REJECTED_DUPLICATE: &str = "surebot_picks_rejected_duplicate_total";
pub const PICKS_REJECTED_OPPOSITE_MARKET: &str = "surebot_picks_rejected_opposite_market_total";
pub const PICKS_REJECTED_STORE_UNAVAILABLE: &str = "surebot_picks_rejected_store_unavailable_total";
pub const PICKS_REJECTED_BELOW_MINIMUM_ODDS: &str = "surebot_picks_rejected_below_minimum_odds_total";

/// Installs the Prometheus recorder and binds its scrape endpoint. Mirrors
/// the "metrics + metrics-exporter-prometheus" pairing used elsewhere in the
/// arbitrage-tooling corpus for this exact purpose.
pub fn install(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    describe_counter!(PICKS_RECEIVED, "Raw records received from the upstream feed");
    describe_counter!(PICKS_PARSED, "Records successfully parsed into surebets");
    describe_counter!(PICKS_DISCARDED, "Records discarded at parse time");
    describe_counter!(PICKS_VALIDATED, "Surebets that passed the validation chain");
    describe_counter!(PICKS_REJECTED, "Surebets rejected by the validation chain");
    describe_counter!(PICKS_DEDUPED, "Dedup keys written after successful enqueue");
    describe_counter!(PICKS_SENT, "Messages successfully delivered to chat");
    describe_counter!(PICKS_DROPPED_OVERFLOW, "Picks dropped by dispatcher overflow");
    describe_counter!(PICKS_DROPPED_ERROR, "Picks dropped by an unrecoverable error");
    describe_counter!(PICKS_REJECTED_ODDS_RANGE, "Picks rejected: soft odds outside configured range");
    describe_counter!(PICKS_REJECTED_PROFIT_RANGE, "Picks rejected: profit outside configured range");
    describe_counter!(PICKS_REJECTED_NOT_FUTURE, "Picks rejected: event not strictly in the future");
    describe_counter!(PICKS_REJECTED_MISSING_ROLE, "Picks rejected: missing sharp or soft role");
    describe_counter!(PICKS_REJECTED_DUPLICATE, "Picks rejected: dedup key already present");
    describe_counter!(PICKS_REJECTED_OPPOSITE_MARKET, "Picks rejected: opposite-market key already present");
    describe_counter!(PICKS_REJECTED_STORE_UNAVAILABLE, "Picks rejected: dedup store membership query failed");
    describe_counter!(PICKS_REJECTED_BELOW_MINIMUM_ODDS, "Picks rejected: soft odds below the sharp-derived minimum");
    Ok(())
}

/// In-process running totals, logged on the periodic stats line (spec §4.8,
/// "surfaced through a periodic log line at a fixed interval").
#[derive(Debug, Default)]
pub struct PipelineCounters {
    pub received: std::sync::atomic::AtomicU64,
    pub parsed: std::sync::atomic::AtomicU64,
    pub discarded: std::sync::atomic::AtomicU64,
    pub validated: std::sync::atomic::AtomicU64,
    pub rejected: std::sync::atomic::AtomicU64,
    pub deduped: std::sync::atomic::AtomicU64,
    pub sent: std::sync::atomic::AtomicU64,
    pub dropped_overflow: std::sync::atomic::AtomicU64,
    pub dropped_error: std::sync::atomic::AtomicU64,
    pub rejected_odds_range: std::sync::atomic::AtomicU64,
    pub rejected_profit_range: std::sync::atomic::AtomicU64,
    pub rejected_not_future: std::sync::atomic::AtomicU64,
    pub rejected_missing_role: std::sync::atomic::AtomicU64,
    pub rejected_duplicate: std::sync::atomic::AtomicU64,
    pub rejected_opposite_market: std::sync::atomic::AtomicU64,
    pub rejected_store_unavailable: std::sync::atomic::AtomicU64,
    pub rejected_below_minimum_odds: std::sync::atomic::AtomicU64,
}

macro_rules! bump {
    ($self:ident, $field:ident, $metric:expr) => {
        $self
            .$field
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        counter!($metric).increment(1);
    };
}

impl PipelineCounters {
    pub fn record_received(&self) {
        bump!(self, received, PICKS_RECEIVED);
    }
    pub fn record_parsed(&self) {
        bump!(self, parsed, PICKS_PARSED);
    }
    pub fn record_discarded(&self) {
        bump!(self, discarded, PICKS_DISCARDED);
    }
    pub fn record_validated(&self) {
        bump!(self, validated, PICKS_VALIDATED);
    }
    /// Bumps the aggregate `rejected` counter plus the reason-specific
    /// counter for `failure` (spec §4.8: rejections "bucketed by reason").
    pub fn record_rejected(&self, failure: &ValidationFailure) {
        bump!(self, rejected, PICKS_REJECTED);
        match failure {
            ValidationFailure::OddsRange => {
                bump!(self, rejected_odds_range, PICKS_REJECTED_ODDS_RANGE);
            }
            ValidationFailure::ProfitRange => {
                bump!(self, rejected_profit_range, PICKS_REJECTED_PROFIT_RANGE);
            }
            ValidationFailure::NotFuture => {
                bump!(self, rejected_not_future, PICKS_REJECTED_NOT_FUTURE);
            }
            ValidationFailure::MissingRole => {
                bump!(self, rejected_missing_role, PICKS_REJECTED_MISSING_ROLE);
            }
            ValidationFailure::Duplicate => {
                bump!(self, rejected_duplicate, PICKS_REJECTED_DUPLICATE);
            }
            ValidationFailure::OppositeMarket => {
                bump!(self, rejected_opposite_market, PICKS_REJECTED_OPPOSITE_MARKET);
            }
            ValidationFailure::StoreUnavailable => {
                bump!(self, rejected_store_unavailable, PICKS_REJECTED_STORE_UNAVAILABLE);
            }
            ValidationFailure::BelowMinimumOdds => {
                bump!(self, rejected_below_minimum_odds, PICKS_REJECTED_BELOW_MINIMUM_ODDS);
            }
        }
    }
    pub fn record_deduped(&self) {
        bump!(self, deduped, PICKS_DEDUPED);
    }
    pub fn record_sent(&self) {
        bump!(self, sent, PICKS_SENT);
    }
    pub fn record_dropped_overflow(&self) {
        bump!(self, dropped_overflow, PICKS_DROPPED_OVERFLOW);
    }
    pub fn record_dropped_error(&self) {
        bump!(self, dropped_error, PICKS_DROPPED_ERROR);
    }

    pub fn snapshot_line(&self) -> String {
        use std::sync::atomic::Ordering::Relaxed;
        format!(
            "received={} parsed={} discarded={} validated={} rejected={} deduped={} sent={} dropped_overflow={} dropped_error={} rejected_duplicate={} rejected_opposite_market={}",
            self.received.load(Relaxed),
            self.parsed.load(Relaxed),
            self.discarded.load(Relaxed),
            self.validated.load(Relaxed),
            self.rejected.load(Relaxed),
            self.deduped.load(Relaxed),
            self.sent.load(Relaxed),
            self.dropped_overflow.load(Relaxed),
            self.dropped_error.load(Relaxed),
            self.rejected_duplicate.load(Relaxed),
            self.rejected_opposite_market.load(Relaxed),
        )
    }
}
