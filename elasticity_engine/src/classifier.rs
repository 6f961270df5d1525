//! Classification of elasticity coefficients into demand categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Demand category implied by the magnitude of an elasticity coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElasticityType {
    /// |coefficient| > 2 — demand swings far more than price
    HighlyElastic,
    /// 1 < |coefficient| <= 2
    Elastic,
    /// |coefficient| within the inclusive [0.9, 1.1] band
    UnitElastic,
    /// |coefficient| < 0.9
    Inelastic,
}

impl ElasticityType {
    /// Whether the category is on the elastic side of unit elasticity.
    pub fn is_elastic(&self) -> bool {
        matches!(self, ElasticityType::HighlyElastic | ElasticityType::Elastic)
    }
}

impl fmt::Display for ElasticityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElasticityType::HighlyElastic => "highly_elastic",
            ElasticityType::Elastic => "elastic",
            ElasticityType::UnitElastic => "unit_elastic",
            ElasticityType::Inelastic => "inelastic",
        };
        write!(f, "{}", name)
    }
}

/// Maps a coefficient to its demand category.
///
/// Only the magnitude matters; the sign carries no classification meaning.
/// The inclusive unit band is checked before the elastic/inelastic bands so
/// the overlapping thresholds cannot reclassify a near-unit coefficient.
pub fn classify(coefficient: f64) -> ElasticityType {
    let magnitude = coefficient.abs();

    if (0.9..=1.1).contains(&magnitude) {
        ElasticityType::UnitElastic
    } else if magnitude > 2.0 {
        ElasticityType::HighlyElastic
    } else if magnitude > 1.0 {
        ElasticityType::Elastic
    } else {
        ElasticityType::Inelastic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_band_takes_precedence() {
        assert_eq!(classify(-1.0), ElasticityType::UnitElastic);
        assert_eq!(classify(-0.9), ElasticityType::UnitElastic);
        assert_eq!(classify(1.1), ElasticityType::UnitElastic);
    }

    #[test]
    fn bands_cover_the_magnitude_axis() {
        assert_eq!(classify(-2.5), ElasticityType::HighlyElastic);
        assert_eq!(classify(-2.0), ElasticityType::Elastic);
        assert_eq!(classify(1.5), ElasticityType::Elastic);
        assert_eq!(classify(-0.5), ElasticityType::Inelastic);
        assert_eq!(classify(0.0), ElasticityType::Inelastic);
    }

    #[test]
    fn sign_is_ignored() {
        assert_eq!(classify(2.5), classify(-2.5));
        assert_eq!(classify(0.95), classify(-0.95));
    }
}
