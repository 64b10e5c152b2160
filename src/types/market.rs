use crate::error::ConstructionError;
use serde::{Deserialize, Serialize};

/// Closed enumeration of bet kinds, each with a designated opposite relation
/// (spec §6, "Opposite markets table").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    Win1,
    Win2,
    Over,
    Under,
    Ah1,
    Ah2,
    Odd,
    Even,
    Yes,
    No,
    #[serde(rename = "1x")]
    OneX,
    X2,
    #[serde(rename = "12")]
    OneTwo,
}

impl MarketKind {
    pub fn from_str(raw: &str) -> Result<Self, ConstructionError> {
        Ok(match raw {
            "win1" => Self::Win1,
            "win2" => Self::Win2,
            "over" => Self::Over,
            "under" => Self::Under,
            "ah1" => Self::Ah1,
            "ah2" => Self::Ah2,
            "odd" => Self::Odd,
            "even" => Self::Even,
            "yes" => Self::Yes,
            "no" => Self::No,
            "1x" => Self::OneX,
            "x2" => Self::X2,
            "12" => Self::OneTwo,
            other => return Err(ConstructionError::UnknownMarketKind(other.to_string())),
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win1 => "win1",
            Self::Win2 => "win2",
            Self::Over => "over",
            Self::Under => "under",
            Self::Ah1 => "ah1",
            Self::Ah2 => "ah2",
            Self::Odd => "odd",
            Self::Even => "even",
            Self::Yes => "yes",
            Self::No => "no",
            Self::OneX => "1x",
            Self::X2 => "x2",
            Self::OneTwo => "12",
        }
    }

    /// The closed opposite relation from spec §6. Bidirectional where symmetric;
    /// `1x`/`x2`/`12` form a 3-way cyclic relation of pairs.
    pub fn opposites(&self) -> &'static [MarketKind] {
        match self {
            Self::Win1 => &[Self::Win2],
            Self::Win2 => &[Self::Win1],
            Self::Over => &[Self::Under],
            Self::Under => &[Self::Over],
            Self::Ah1 => &[Self::Ah2],
            Self::Ah2 => &[Self::Ah1],
            Self::Odd => &[Self::Even],
            Self::Even => &[Self::Odd],
            Self::Yes => &[Self::No],
            Self::No => &[Self::Yes],
            Self::OneX => &[Self::X2, Self::OneTwo],
            Self::X2 => &[Self::OneX, Self::OneTwo],
            Self::OneTwo => &[Self::OneX, Self::X2],
        }
    }
}

/// A concrete market: kind plus the modifiers the feed reports (condition value,
/// period, base side, game phase, negation flag). Two markets are the "same
/// variety" for dedup purposes when all of these match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub kind: MarketKind,
    pub condition: Option<f64>,
    pub period: Option<String>,
    pub base: Option<String>,
    pub game_phase: Option<String>,
    pub negated: bool,
}

impl Market {
    pub fn new(
        kind: MarketKind,
        condition: Option<f64>,
        period: Option<String>,
        base: Option<String>,
        game_phase: Option<String>,
        negated: bool,
    ) -> Self {
        Self {
            kind,
            condition,
            period,
            base,
            game_phase,
            negated,
        }
    }

    /// Canonical string identifying this market's "variety" for the dedup key
    /// (spec §3, "Dedup key"). Two equal markets must yield equal varieties.
    pub fn variety(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}",
            self.kind.as_str(),
            self.condition
                .map(|c| format!("{:.2}", c))
                .unwrap_or_default(),
            self.period.as_deref().unwrap_or(""),
            self.base.as_deref().unwrap_or(""),
            self.game_phase.as_deref().unwrap_or(""),
            self.negated as u8,
        )
    }

    /// Markets with the same modifiers but each opposite kind in turn, used to
    /// build the opposite-market dedup keys (spec §4.4 link 6).
    pub fn opposite_varieties(&self) -> Vec<String> {
        self.kind
            .opposites()
            .iter()
            .map(|opp| {
                Market {
                    kind: *opp,
                    condition: self.condition,
                    period: self.period.clone(),
                    base: self.base.clone(),
                    game_phase: self.game_phase.clone(),
                    negated: self.negated,
                }
                .variety()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_relation_is_symmetric_for_simple_pairs() {
        for kind in [
            MarketKind::Win1,
            MarketKind::Win2,
            MarketKind::Over,
            MarketKind::Under,
            MarketKind::Ah1,
            MarketKind::Ah2,
            MarketKind::Odd,
            MarketKind::Even,
            MarketKind::Yes,
            MarketKind::No,
        ] {
            for opp in kind.opposites() {
                assert!(opp.opposites().contains(&kind), "{:?} -> {:?}", kind, opp);
            }
        }
    }

    #[test]
    fn one_x_group_is_pairwise_opposite() {
        assert_eq!(
            MarketKind::OneX.opposites(),
            &[MarketKind::X2, MarketKind::OneTwo]
        );
        assert!(MarketKind::X2.opposites().contains(&MarketKind::OneX));
        assert!(MarketKind::OneTwo.opposites().contains(&MarketKind::X2));
    }

    #[test]
    fn round_trips_through_as_str() {
        for kind in [
            MarketKind::Win1,
            MarketKind::OneX,
            MarketKind::X2,
            MarketKind::OneTwo,
        ] {
            assert_eq!(MarketKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }
}
