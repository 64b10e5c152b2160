//! Ordered, fail-fast pick validators (spec §4.4, component C5).

mod chain;
mod links;

pub use chain::ValidationChain;
pub use links::{
    DedupAndOppositeMarketLink, FutureEventLink, OddsRangeLink, ProfitRangeLink, RolesPresentLink,
    ValidationBounds, ValidationLink,
};
