use crate::entities::bookmaker::Role;
use crate::error::ConstructionError;
use crate::types::{EventTime, Market, Odds};
use serde::{Deserialize, Serialize};

/// A concrete bet at one bookmaker on one event. Immutable after construction
/// (spec §3, "Pick").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pick {
    pub team_home: String,
    pub team_away: String,
    pub tournament: String,
    pub event_time: EventTime,
    pub market: Market,
    pub odds: Odds,
    pub bookmaker_id: String,
    pub bookmaker_role: Role,
}

impl Pick {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        team_home: impl Into<String>,
        team_away: impl Into<String>,
        tournament: impl Into<String>,
        event_time: EventTime,
        market: Market,
        odds: Odds,
        bookmaker_id: impl Into<String>,
        bookmaker_role: Role,
    ) -> Result<Self, ConstructionError> {
        let team_home = team_home.into();
        let team_away = team_away.into();
        if team_home.trim().is_empty() {
            return Err(ConstructionError::MissingField("team_home"));
        }
        if team_away.trim().is_empty() {
            return Err(ConstructionError::MissingField("team_away"));
        }
        let bookmaker_id = bookmaker_id.into();
        if bookmaker_id.trim().is_empty() {
            return Err(ConstructionError::MissingField("bookmaker_id"));
        }
        Ok(Self {
            team_home,
            team_away,
            tournament: tournament.into(),
            event_time,
            market,
            odds,
            bookmaker_id,
            bookmaker_role,
        })
    }

    /// Canonical, order-independent key for the two team names (spec §3,
    /// "Dedup key ... with team names normalized (order canonicalized, case
    /// folded, whitespace trimmed)").
    fn normalized_teams(&self) -> String {
        let mut names = [
            self.team_home.trim().to_lowercase(),
            self.team_away.trim().to_lowercase(),
        ];
        names.sort();
        names.join("|")
    }

    /// `teams ∥ event_time ∥ market_kind ∥ variety ∥ bookmaker_id` (spec §3).
    pub fn dedup_key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.normalized_teams(),
            self.event_time.as_datetime().timestamp(),
            self.market.kind.as_str(),
            self.market.variety(),
            self.bookmaker_id
        )
    }

    /// Dedup keys of every market that would rebound this pick's position
    /// (spec §4.4 link 6, "Opposite-market").
    pub fn opposite_dedup_keys(&self) -> Vec<String> {
        let teams = self.normalized_teams();
        let event_ts = self.event_time.as_datetime().timestamp();
        self.market
            .opposite_varieties()
            .into_iter()
            .zip(self.market.kind.opposites())
            .map(|(variety, kind)| {
                format!(
                    "{}|{}|{}|{}|{}",
                    teams,
                    event_ts,
                    kind.as_str(),
                    variety,
                    self.bookmaker_id
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MarketKind;
    use chrono::Utc;

    fn future_event_time() -> EventTime {
        let now = Utc::now();
        EventTime::from_epoch_millis(
            (now + chrono::Duration::hours(1)).timestamp_millis(),
            now,
        )
        .unwrap()
    }

    fn market(kind: MarketKind) -> Market {
        Market::new(kind, Some(2.5), None, None, None, false)
    }

    #[test]
    fn dedup_key_is_team_order_independent() {
        let et = future_event_time();
        let a = Pick::new(
            "A",
            "B",
            "T",
            et,
            market(MarketKind::Over),
            Odds::new(2.0).unwrap(),
            "bk",
            Role::Soft,
        )
        .unwrap();
        let b = Pick::new(
            "B",
            "A",
            "T",
            et,
            market(MarketKind::Over),
            Odds::new(2.0).unwrap(),
            "bk",
            Role::Soft,
        )
        .unwrap();
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn opposite_dedup_keys_cover_under() {
        let et = future_event_time();
        let over = Pick::new(
            "A",
            "B",
            "T",
            et,
            market(MarketKind::Over),
            Odds::new(2.0).unwrap(),
            "bk",
            Role::Soft,
        )
        .unwrap();
        let under = Pick::new(
            "A",
            "B",
            "T",
            et,
            market(MarketKind::Under),
            Odds::new(2.0).unwrap(),
            "bk",
            Role::Soft,
        )
        .unwrap();
        assert!(over.opposite_dedup_keys().contains(&under.dedup_key()));
    }

    #[test]
    fn rejects_empty_team_name() {
        let et = future_event_time();
        let err = Pick::new(
            "  ",
            "B",
            "T",
            et,
            market(MarketKind::Over),
            Odds::new(2.0).unwrap(),
            "bk",
            Role::Soft,
        )
        .unwrap_err();
        assert_eq!(err, ConstructionError::MissingField("team_home"));
    }
}
