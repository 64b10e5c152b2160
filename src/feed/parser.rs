use crate::entities::bookmaker::Role;
use crate::entities::{Pick, Surebet};
use crate::error::ConstructionError;
use crate::feed::wire::{RawMarketType, RawProng, RawRecord};
use crate::types::{EventTime, Market, MarketKind, Odds, Profit};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

/// Maps raw surebet records into [`Surebet`]s, assigning sharp/soft roles
/// from the configured sharp-bookmaker set (spec §4.5, component C7).
///
/// Never panics on malformed input: every rejection is a [`ConstructionError`]
/// returned to the caller, which increments a drop counter and moves on
/// (spec §4.5: "does not raise on partial data — it returns a discard with
/// reason").
pub struct FeedParser {
    sharp_bookmakers: HashSet<String>,
}

impl FeedParser {
    pub fn new(sharp_bookmakers: impl IntoIterator<Item = String>) -> Self {
        Self {
            sharp_bookmakers: sharp_bookmakers.into_iter().collect(),
        }
    }

    fn role_of(&self, bookmaker_id: &str) -> Role {
        if self.sharp_bookmakers.contains(bookmaker_id) {
            Role::Sharp
        } else {
            Role::Soft
        }
    }

    fn parse_prong(&self, raw: &RawProng, now: DateTime<Utc>) -> Result<Pick, ConstructionError> {
        let odds = Odds::new(raw.value)?;
        let event_time = EventTime::from_epoch_millis(raw.time, now)?;
        let market = parse_market(&raw.market_type)?;
        let role = self.role_of(&raw.bk);
        Pick::new(
            raw.teams[0].clone(),
            raw.teams[1].clone(),
            raw.tournament.clone(),
            event_time,
            market,
            odds,
            raw.bk.clone(),
            role,
        )
    }

    /// Parses one raw record into a [`Surebet`]. Rejects records whose
    /// prongs are not exactly one sharp and one soft (spec §4.5: "rejects
    /// records where neither or both sides are sharp").
    pub fn parse(&self, raw: &RawRecord, now: DateTime<Utc>) -> Result<Surebet, ConstructionError> {
        if raw.prongs.len() != 2 {
            return Err(ConstructionError::MissingField("prongs"));
        }
        let a = self.parse_prong(&raw.prongs[0], now)?;
        let b = self.parse_prong(&raw.prongs[1], now)?;
        let profit = Profit::new(raw.profit)?;
        Surebet::new(raw.id.clone(), a, b, profit)
    }
}

fn parse_market(raw: &RawMarketType) -> Result<Market, ConstructionError> {
    let kind = MarketKind::from_str(&raw.kind)?;
    Ok(Market::new(
        kind,
        raw.condition,
        raw.period.clone(),
        raw.base.clone(),
        raw.game.clone(),
        raw.no.unwrap_or(false),
    ))
}

/// Parses every record in a batch, discarding malformed ones with a logged
/// reason rather than aborting the batch (spec §4.5, §6.2 "Convert to
/// Surebets (C7), discarding malformed records with a counter increment").
pub fn parse_batch(
    parser: &FeedParser,
    records: &[RawRecord],
    now: DateTime<Utc>,
) -> (Vec<Surebet>, usize) {
    let mut surebets = Vec::with_capacity(records.len());
    let mut discarded = 0usize;
    for raw in records {
        match parser.parse(raw, now) {
            Ok(sb) => surebets.push(sb),
            Err(err) => {
                discarded += 1;
                debug!(record_id = %raw.id, error = %err, "discarding malformed feed record");
            }
        }
    }
    (surebets, discarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::wire::RawFeedResponse;

    fn sample_json(sort_by: &str, profit: f64, soft_odds: f64, offset_ms: i64) -> String {
        format!(
            r#"{{
                "records": [
                    {{
                        "id": "r1",
                        "sort_by": "{sort_by}",
                        "time": {time},
                        "created": 1,
                        "profit": {profit},
                        "prongs": [
                            {{
                                "bk": "pinnacle",
                                "value": 2.0,
                                "time": {time},
                                "teams": ["Team A", "Team B"],
                                "tournament": "T",
                                "type": {{"kind": "over", "condition": 2.5}}
                            }},
                            {{
                                "bk": "softbook",
                                "value": {soft_odds},
                                "time": {time},
                                "teams": ["Team A", "Team B"],
                                "tournament": "T",
                                "type": {{"kind": "over", "condition": 2.5}}
                            }}
                        ]
                    }}
                ]
            }}"#,
            sort_by = sort_by,
            time = (Utc::now() + chrono::Duration::milliseconds(offset_ms)).timestamp_millis(),
            profit = profit,
            soft_odds = soft_odds,
        )
    }

    #[test]
    fn parses_a_well_formed_record() {
        let now = Utc::now();
        let body = sample_json("created_at_desc:1", 2.38, 2.10, 3_600_000);
        let resp: RawFeedResponse = serde_json::from_str(&body).unwrap();
        let parser = FeedParser::new(["pinnacle".to_string()]);
        let (surebets, discarded) = parse_batch(&parser, &resp.records, now);
        assert_eq!(discarded, 0);
        assert_eq!(surebets.len(), 1);
        assert_eq!(surebets[0].sharp_prong.bookmaker_id, "pinnacle");
        assert_eq!(surebets[0].soft_prong.bookmaker_id, "softbook");
    }

    #[test]
    fn discards_record_with_two_sharps() {
        let now = Utc::now();
        let body = sample_json("created_at_desc:1", 2.38, 2.10, 3_600_000);
        let resp: RawFeedResponse = serde_json::from_str(&body).unwrap();
        let parser = FeedParser::new(["pinnacle".to_string(), "softbook".to_string()]);
        let (surebets, discarded) = parse_batch(&parser, &resp.records, now);
        assert_eq!(discarded, 1);
        assert!(surebets.is_empty());
    }

    #[test]
    fn discards_record_with_unknown_market_kind() {
        let now = Utc::now();
        let body = sample_json("created_at_desc:1", 2.38, 2.10, 3_600_000)
            .replace(r#"{"kind": "over", "condition": 2.5}"#, r#"{"kind": "nonsense"}"#);
        let resp: RawFeedResponse = serde_json::from_str(&body).unwrap();
        let parser = FeedParser::new(["pinnacle".to_string()]);
        let (surebets, discarded) = parse_batch(&parser, &resp.records, now);
        assert_eq!(discarded, 1);
        assert!(surebets.is_empty());
    }

    #[test]
    fn discards_record_with_non_future_event_time() {
        let now = Utc::now();
        let body = sample_json("created_at_desc:1", 2.38, 2.10, -1_000);
        let resp: RawFeedResponse = serde_json::from_str(&body).unwrap();
        let parser = FeedParser::new(["pinnacle".to_string()]);
        let (surebets, discarded) = parse_batch(&parser, &resp.records, now);
        assert_eq!(discarded, 1);
        assert!(surebets.is_empty());
    }
}
