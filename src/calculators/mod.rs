//! Stake tier and minimum-odds calculators (spec §4.2, component C3).

mod confidence;
mod min_odds;
mod registry;
mod stake_tier;

pub use confidence::score_confidence;
pub use min_odds::{min_acceptable_odds, round_half_up_2dp};
pub use registry::{CalculatorRegistry, SharpCalculator, StandardCalculator};
pub use stake_tier::{classify as classify_stake_tier, StakeTier};
