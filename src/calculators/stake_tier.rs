use crate::types::Profit;
use serde::{Deserialize, Serialize};

/// Four-level qualitative indicator derived from profit (spec §4.2, "Stake tier").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeTier {
    Low,
    MediumLow,
    MediumHigh,
    High,
}

impl StakeTier {
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Low => "\u{1F534}",          // 🔴
            Self::MediumLow => "\u{1F7E0}",    // 🟠
            Self::MediumHigh => "\u{1F7E1}",   // 🟡
            Self::High => "\u{1F7E2}",         // 🟢
        }
    }
}

/// Classifies `profit` into a stake tier. Intervals are left-inclusive,
/// right-exclusive; `None` means the profit is outside the acceptable range
/// and the pick must be rejected (spec §4.2).
pub fn classify(profit: Profit) -> Option<StakeTier> {
    let p = profit.percent();
    if !(-1.0..=25.0).contains(&p) {
        return None;
    }
    Some(if p < -0.5 {
        StakeTier::Low
    } else if p < 1.5 {
        StakeTier::MediumLow
    } else if p < 4.0 {
        StakeTier::MediumHigh
    } else {
        StakeTier::High
    })
}
