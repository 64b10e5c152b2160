use crate::error::ConstructionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A signed percentage in `[-100, 100]`. Carries no unit beyond "percent".
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Profit(f64);

impl Profit {
    pub const MIN: f64 = -100.0;
    pub const MAX: f64 = 100.0;

    pub fn new(percent: f64) -> Result<Self, ConstructionError> {
        if !percent.is_finite() || percent < Self::MIN || percent > Self::MAX {
            return Err(ConstructionError::ProfitOutOfRange(percent));
        }
        Ok(Self(percent))
    }

    #[inline]
    pub fn percent(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Profit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

// Heap ordering needs a total order over profit; NaN is already excluded at construction.
impl Eq for Profit {}
impl Ord for Profit {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).expect("Profit is always finite")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_boundary_values() {
        assert!(Profit::new(-100.0).is_ok());
        assert!(Profit::new(100.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Profit::new(100.01).is_err());
        assert!(Profit::new(-100.01).is_err());
        assert!(Profit::new(f64::NAN).is_err());
    }

    #[test]
    fn orders_by_value() {
        let low = Profit::new(1.0).unwrap();
        let high = Profit::new(2.0).unwrap();
        assert!(low < high);
    }
}
