use crate::entities::bookmaker::Role;
use crate::entities::pick::Pick;
use crate::error::ConstructionError;
use crate::types::Profit;
use serde::{Deserialize, Serialize};

/// Two picks on opposing outcomes of the same event, one sharp-priced and one
/// soft-priced, plus the feed's reported edge (spec §3, "Surebet").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surebet {
    pub record_id: String,
    pub sharp_prong: Pick,
    pub soft_prong: Pick,
    pub profit: Profit,
}

impl Surebet {
    pub fn new(
        record_id: impl Into<String>,
        prong_a: Pick,
        prong_b: Pick,
        profit: Profit,
    ) -> Result<Self, ConstructionError> {
        let (sharp_prong, soft_prong) = match (prong_a.bookmaker_role, prong_b.bookmaker_role) {
            (Role::Sharp, Role::Soft) => (prong_a, prong_b),
            (Role::Soft, Role::Sharp) => (prong_b, prong_a),
            _ => return Err(ConstructionError::DuplicateBookmakerRole),
        };

        if !sharp_prong.event_time.same_minute(&soft_prong.event_time) {
            return Err(ConstructionError::EventTimeMismatch);
        }

        Ok(Self {
            record_id: record_id.into(),
            sharp_prong,
            soft_prong,
            profit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventTime, Market, MarketKind, Odds};
    use chrono::Utc;

    fn event_time_in(now: chrono::DateTime<Utc>, offset_secs: i64) -> EventTime {
        EventTime::from_epoch_millis(
            (now + chrono::Duration::seconds(offset_secs)).timestamp_millis(),
            now,
        )
        .unwrap()
    }

    fn pick(role: Role, et: EventTime, bookmaker: &str) -> Pick {
        Pick::new(
            "A",
            "B",
            "T",
            et,
            Market::new(MarketKind::Over, Some(2.5), None, None, None, false),
            Odds::new(2.0).unwrap(),
            bookmaker,
            role,
        )
        .unwrap()
    }

    #[test]
    fn assigns_sharp_and_soft_regardless_of_input_order() {
        let now = Utc::now();
        let et = event_time_in(now, 3600);
        let sharp = pick(Role::Sharp, et, "pinnacle");
        let soft = pick(Role::Soft, et, "softbook");

        let sb = Surebet::new("r1", soft.clone(), sharp.clone(), Profit::new(2.0).unwrap()).unwrap();
        assert_eq!(sb.sharp_prong.bookmaker_id, "pinnacle");
        assert_eq!(sb.soft_prong.bookmaker_id, "softbook");
    }

    #[test]
    fn rejects_two_sharps() {
        let now = Utc::now();
        let et = event_time_in(now, 3600);
        let a = pick(Role::Sharp, et, "pinnacle");
        let b = pick(Role::Sharp, et, "other_sharp");
        assert_eq!(
            Surebet::new("r1", a, b, Profit::new(2.0).unwrap()).unwrap_err(),
            ConstructionError::DuplicateBookmakerRole
        );
    }

    #[test]
    fn rejects_mismatched_event_times() {
        let now = Utc::now();
        let sharp = pick(Role::Sharp, event_time_in(now, 3600), "pinnacle");
        let soft = pick(Role::Soft, event_time_in(now, 3600 + 120), "softbook");
        assert_eq!(
            Surebet::new("r1", sharp, soft, Profit::new(2.0).unwrap()).unwrap_err(),
            ConstructionError::EventTimeMismatch
        );
    }
}
