use crate::dedup::DedupStore;
use crate::entities::Surebet;
use crate::error::ValidationFailure;
use async_trait::async_trait;
use chrono::Utc;

/// The odds/profit bounds the first two links check against (spec §6,
/// config options `min_odds`, `max_odds`, `min_profit`, `max_profit`).
#[derive(Debug, Clone, Copy)]
pub struct ValidationBounds {
    pub min_odds: f64,
    pub max_odds: f64,
    pub min_profit: f64,
    pub max_profit: f64,
}

impl Default for ValidationBounds {
    fn default() -> Self {
        Self {
            min_odds: 1.10,
            max_odds: 9.99,
            min_profit: -1.0,
            max_profit: 25.0,
        }
    }
}

/// One link of the ordered, fail-fast validation chain (spec §4.4). Cheap CPU
/// checks (links 1-4) ignore `store`; the dedup links (5-6) consult it.
#[async_trait]
pub trait ValidationLink: Send + Sync {
    async fn check(
        &self,
        surebet: &Surebet,
        bounds: &ValidationBounds,
        store: &dyn DedupStore,
    ) -> Result<(), ValidationFailure>;
}

/// Link 1: soft prong's odds in range (spec §4.4 item 1).
pub struct OddsRangeLink;

#[async_trait]
impl ValidationLink for OddsRangeLink {
    async fn check(
        &self,
        surebet: &Surebet,
        bounds: &ValidationBounds,
        _store: &dyn DedupStore,
    ) -> Result<(), ValidationFailure> {
        let v = surebet.soft_prong.odds.value();
        if v < bounds.min_odds || v > bounds.max_odds {
            return Err(ValidationFailure::OddsRange);
        }
        Ok(())
    }
}

/// Link 2: profit in range (spec §4.4 item 2).
pub struct ProfitRangeLink;

#[async_trait]
impl ValidationLink for ProfitRangeLink {
    async fn check(
        &self,
        surebet: &Surebet,
        bounds: &ValidationBounds,
        _store: &dyn DedupStore,
    ) -> Result<(), ValidationFailure> {
        let p = surebet.profit.percent();
        if p < bounds.min_profit || p > bounds.max_profit {
            return Err(ValidationFailure::ProfitRange);
        }
        Ok(())
    }
}

/// Link 3: event strictly in the future (spec §4.4 item 3).
pub struct FutureEventLink;

#[async_trait]
impl ValidationLink for FutureEventLink {
    async fn check(
        &self,
        surebet: &Surebet,
        _bounds: &ValidationBounds,
        _store: &dyn DedupStore,
    ) -> Result<(), ValidationFailure> {
        if !surebet.soft_prong.event_time.is_future(Utc::now()) {
            return Err(ValidationFailure::NotFuture);
        }
        Ok(())
    }
}

/// Link 4: one prong sharp, one soft — re-asserted defensively even though
/// `Surebet::new` already enforces it (spec §4.4 item 4).
pub struct RolesPresentLink;

#[async_trait]
impl ValidationLink for RolesPresentLink {
    async fn check(
        &self,
        surebet: &Surebet,
        _bounds: &ValidationBounds,
        _store: &dyn DedupStore,
    ) -> Result<(), ValidationFailure> {
        use crate::entities::Role;
        match (surebet.sharp_prong.bookmaker_role, surebet.soft_prong.bookmaker_role) {
            (Role::Sharp, Role::Soft) => Ok(()),
            _ => Err(ValidationFailure::MissingRole),
        }
    }
}

/// Links 5-6: soft prong's dedup key and opposite-market keys, consulted with
/// a single batched query (spec §4.4 items 5-6, §5 "single round-trip per
/// pick"). Index 0 of the queried key set is always the dedup key; the rest
/// are the opposite-market keys, so one `exists_each` call can still
/// distinguish which reason to report.
pub struct DedupAndOppositeMarketLink;

#[async_trait]
impl ValidationLink for DedupAndOppositeMarketLink {
    async fn check(
        &self,
        surebet: &Surebet,
        _bounds: &ValidationBounds,
        store: &dyn DedupStore,
    ) -> Result<(), ValidationFailure> {
        let mut keys = vec![surebet.soft_prong.dedup_key()];
        keys.extend(surebet.soft_prong.opposite_dedup_keys());

        let hits = match store.exists_each(&keys).await {
            Ok(hits) => hits,
            // A failed membership query is conservative: drop the pick
            // rather than risk a duplicate (spec §4.3, error policy).
            Err(_) => return Err(ValidationFailure::StoreUnavailable),
        };

        if hits.first().copied().unwrap_or(false) {
            return Err(ValidationFailure::Duplicate);
        }
        if hits[1..].iter().any(|&hit| hit) {
            return Err(ValidationFailure::OppositeMarket);
        }
        Ok(())
    }
}
