//! Error taxonomy for the pipeline.
//!
//! Construction errors are typed so the orchestrator can bucket drop counters
//! by reason; transport/store errors cross component boundaries as `anyhow`.

use thiserror::Error;

/// A value/entity failed to construct from a raw feed record.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConstructionError {
    #[error("odds {0} outside [1.01, 1000]")]
    OddsOutOfRange(f64),

    #[error("profit {0} outside [-100, 100]")]
    ProfitOutOfRange(f64),

    #[error("unknown market kind: {0}")]
    UnknownMarketKind(String),

    #[error("event time {0} is not strictly in the future")]
    EventNotFuture(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("surebet prongs do not have distinct bookmaker roles")]
    DuplicateBookmakerRole,

    #[error("surebet prongs reference different event times")]
    EventTimeMismatch,

    #[error("sharp odds too skewed to yield a positive minimum odds")]
    SharpTooSkewed,
}

/// Why a validation link rejected a pick. Mirrors the validation chain order in spec §4.4.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("soft odds outside configured range")]
    OddsRange,

    #[error("profit outside configured range")]
    ProfitRange,

    #[error("event is not strictly in the future")]
    NotFuture,

    #[error("surebet is missing a sharp or soft role")]
    MissingRole,

    #[error("dedup key already present")]
    Duplicate,

    #[error("opposite-market key already present")]
    OppositeMarket,

    #[error("dedup store membership query failed")]
    StoreUnavailable,

    #[error("soft odds fell below the sharp-derived minimum acceptable odds")]
    BelowMinimumOdds,
}

/// Startup-time configuration error. The only error kind allowed to abort the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    #[error("target bookmaker '{0}' has no entry in bookmaker_channels")]
    UnmappedTargetBookie(String),
}
