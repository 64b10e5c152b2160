use crate::calculators::min_odds;
use crate::error::ConstructionError;
use crate::types::Odds;
use std::collections::HashMap;
use std::sync::Arc;

/// A sharp bookmaker's pricing model. Stake tier is universal (spec §4.2) but
/// the minimum-odds formula is selected per sharp, so a new sharp with a
/// different tolerance can be added without touching the validation chain or
/// orchestrator (spec §4.2: "Adding a new sharp is a new registry entry; no
/// other component changes").
pub trait SharpCalculator: Send + Sync {
    fn min_acceptable_odds(&self, sharp_odds: Odds) -> Result<f64, ConstructionError>;
}

/// The standard `1 / (1.01 - 1/s)` formula (spec §4.2), used by every sharp
/// unless a registry entry overrides it.
pub struct StandardCalculator;

impl SharpCalculator for StandardCalculator {
    fn min_acceptable_odds(&self, sharp_odds: Odds) -> Result<f64, ConstructionError> {
        min_odds::min_acceptable_odds(sharp_odds)
    }
}

/// Maps sharp bookmaker id -> its calculator.
#[derive(Clone)]
pub struct CalculatorRegistry {
    by_sharp: HashMap<String, Arc<dyn SharpCalculator>>,
    default: Arc<dyn SharpCalculator>,
}

impl CalculatorRegistry {
    /// Builds a registry with the standard calculator for every sharp id
    /// named in `sharp_bookmakers` (spec §6, config option `sharp_bookmakers`).
    pub fn standard(sharp_bookmakers: impl IntoIterator<Item = String>) -> Self {
        let default: Arc<dyn SharpCalculator> = Arc::new(StandardCalculator);
        let by_sharp = sharp_bookmakers
            .into_iter()
            .map(|id| (id, Arc::clone(&default)))
            .collect();
        Self { by_sharp, default }
    }

    pub fn register(&mut self, sharp_id: impl Into<String>, calculator: Arc<dyn SharpCalculator>) {
        self.by_sharp.insert(sharp_id.into(), calculator);
    }

    pub fn for_sharp(&self, sharp_id: &str) -> &Arc<dyn SharpCalculator> {
        self.by_sharp.get(sharp_id).unwrap_or(&self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_sharp_falls_back_to_standard() {
        let registry = CalculatorRegistry::standard(["pinnacle".to_string()]);
        let calc = registry.for_sharp("unknown_sharp");
        let min = calc.min_acceptable_odds(Odds::new(2.0).unwrap()).unwrap();
        assert!((min - 1.960784313725).abs() < 1e-9);
    }

    #[test]
    fn registered_sharp_resolves_to_its_entry() {
        let registry = CalculatorRegistry::standard(["pinnacle".to_string()]);
        let calc = registry.for_sharp("pinnacle");
        assert!(calc.min_acceptable_odds(Odds::new(1.5).unwrap()).is_ok());
    }
}
