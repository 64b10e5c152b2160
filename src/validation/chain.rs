use crate::dedup::DedupStore;
use crate::entities::Surebet;
use crate::error::ValidationFailure;
use crate::validation::links::{
    DedupAndOppositeMarketLink, FutureEventLink, OddsRangeLink, ProfitRangeLink, RolesPresentLink,
    ValidationBounds, ValidationLink,
};

/// Ordered, fail-fast sequence of [`ValidationLink`]s (spec §4.4). Built with
/// a fluent `add` so tests can assemble a partial chain or drop a link
/// entirely ("removal for tests is explicit").
pub struct ValidationChain {
    bounds: ValidationBounds,
    links: Vec<Box<dyn ValidationLink>>,
}

impl ValidationChain {
    pub fn new(bounds: ValidationBounds) -> Self {
        Self {
            bounds,
            links: Vec::new(),
        }
    }

    pub fn add(mut self, link: Box<dyn ValidationLink>) -> Self {
        self.links.push(link);
        self
    }

    /// Drops the link at `index`, for tests that want to exercise the chain
    /// without one of its links (e.g. without the dedup check).
    pub fn remove(mut self, index: usize) -> Self {
        self.links.remove(index);
        self
    }

    /// The mandated order from spec §4.4: cheap CPU checks (1-4) before the
    /// single store-backed dedup/opposite-market check (5-6).
    pub fn standard(bounds: ValidationBounds) -> Self {
        Self::new(bounds)
            .add(Box::new(OddsRangeLink))
            .add(Box::new(ProfitRangeLink))
            .add(Box::new(FutureEventLink))
            .add(Box::new(RolesPresentLink))
            .add(Box::new(DedupAndOppositeMarketLink))
    }

    /// Runs every link in order, short-circuiting on the first failure.
    pub async fn run(
        &self,
        surebet: &Surebet,
        store: &dyn DedupStore,
    ) -> Result<(), ValidationFailure> {
        for link in &self.links {
            link.check(surebet, &self.bounds, store).await?;
        }
        Ok(())
    }
}
