//! Upstream feed access: adaptive polling and record parsing (spec §4.5,
//! components C6 and C7).

mod parser;
mod poller;
mod wire;

pub use parser::{parse_batch, FeedParser};
pub use poller::{AdaptivePoller, FeedRequestConfig, FetchedBatch};
pub use wire::{RawFeedResponse, RawMarketType, RawProng, RawRecord};
