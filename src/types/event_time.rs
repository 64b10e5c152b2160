use crate::error::ConstructionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A UTC instant strictly in the future at the moment of validation.
///
/// Constructed once at parse time from the feed's millisecond epoch; re-checked
/// against "now" again in the validation chain (spec §4.4 link 3), since time
/// passes between parse and validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventTime(DateTime<Utc>);

impl EventTime {
    pub fn from_epoch_millis(ms: i64, now: DateTime<Utc>) -> Result<Self, ConstructionError> {
        let dt = DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| ConstructionError::EventNotFuture(ms.to_string()))?;
        if dt <= now {
            return Err(ConstructionError::EventNotFuture(dt.to_rfc3339()));
        }
        Ok(Self(dt))
    }

    #[inline]
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn is_future(&self, now: DateTime<Utc>) -> bool {
        self.0 > now
    }

    /// Seconds between `now` and this event, floored at `min_secs` (spec §3,
    /// "Dedup entries have TTL = max(1s, event_time - now)").
    pub fn ttl_secs(&self, now: DateTime<Utc>, min_secs: i64) -> i64 {
        (self.0 - now).num_seconds().max(min_secs)
    }

    /// True if the two times fall within the same minute (spec §3, "bounded
    /// tolerance, e.g., equal minute").
    pub fn same_minute(&self, other: &EventTime) -> bool {
        self.0.timestamp() / 60 == other.0.timestamp() / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn rejects_non_future() {
        let now = Utc::now();
        let past_ms = (now - Duration::seconds(1)).timestamp_millis();
        assert!(EventTime::from_epoch_millis(past_ms, now).is_err());

        let now_ms = now.timestamp_millis();
        assert!(EventTime::from_epoch_millis(now_ms, now).is_err());
    }

    #[test]
    fn accepts_future_and_computes_ttl() {
        let now = Utc::now();
        let future_ms = (now + Duration::hours(1)).timestamp_millis();
        let et = EventTime::from_epoch_millis(future_ms, now).unwrap();
        let ttl = et.ttl_secs(now, 1);
        assert!((ttl - 3600).abs() <= 1);
    }

    #[test]
    fn ttl_floors_at_minimum() {
        let now = Utc::now();
        let soon_ms = (now + Duration::milliseconds(500)).timestamp_millis();
        let et = EventTime::from_epoch_millis(soon_ms, now).unwrap();
        assert_eq!(et.ttl_secs(now, 1), 1);
    }

    #[test]
    fn same_minute_tolerance() {
        let now = Utc::now();
        let a = EventTime::from_epoch_millis((now + Duration::hours(1)).timestamp_millis(), now)
            .unwrap();
        let b = EventTime::from_epoch_millis(
            (now + Duration::hours(1) + Duration::seconds(10)).timestamp_millis(),
            now,
        )
        .unwrap();
        assert!(a.same_minute(&b));
    }
}
