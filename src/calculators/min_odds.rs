use crate::error::ConstructionError;
use crate::types::Odds;

/// The accepted tolerance below "true fair odds" that still counts as
/// profitable (spec §4.2: "The 1.01 corresponds to the accepted -1% tolerance").
const TOLERANCE: f64 = 1.01;

/// Minimum acceptable soft odds given sharp odds `s`:
/// `min_odds = 1 / (1.01 - 1/s)`.
///
/// Returns `SharpTooSkewed` if the computed value is non-positive or
/// non-finite (spec §4.2).
pub fn min_acceptable_odds(sharp: Odds) -> Result<f64, ConstructionError> {
    let denom = TOLERANCE - sharp.implied_prob();
    let raw = 1.0 / denom;
    if !raw.is_finite() || raw <= 0.0 {
        return Err(ConstructionError::SharpTooSkewed);
    }
    Ok(raw)
}

/// Rounds a raw minimum-odds value half-up to two decimals, for display only
/// (spec §4.2: "Rounding: round half-up to two decimals for display; compare
/// the raw value against soft odds internally").
pub fn round_half_up_2dp(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_worked_example_s1() {
        // sharp_odds = 2.00 -> min_odds = 1 / (1.01 - 0.5) = 1.9607843...
        let min = min_acceptable_odds(Odds::new(2.0).unwrap()).unwrap();
        assert!((min - 1.960784313725).abs() < 1e-9);
    }

    #[test]
    fn sharp_odds_at_floor_yields_finite_min_odds() {
        let min = min_acceptable_odds(Odds::new(1.01).unwrap()).unwrap();
        assert!(min.is_finite());
        assert!(min > 0.0);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_half_up_2dp(1.9649), 1.96);
        assert_eq!(round_half_up_2dp(1.9650), 1.97);
        assert_eq!(round_half_up_2dp(1.9704), 1.97);
    }
}
