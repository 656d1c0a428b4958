//! One-repetition-maximum estimation and percentage-based set prescription
//!
//! Estimates a 1RM from a single submaximal set, then prescribes a working
//! weight and rep count for a chosen intensity (% of 1RM) as six identical sets.
//!
//! ```rust,ignore
//! use liftlog::one_rm::{OneRmCalculator, OneRmRequest};
//! use rust_decimal_macros::dec;
//!
//! let response = OneRmCalculator::calculate(&OneRmRequest {
//!     weight: dec!(100),
//!     reps: 5,
//!     percentage: dec!(80),
//!     formula: "epley".to_string(),
//! });
//! assert_eq!(response.one_rm, dec!(116.67));
//! assert_eq!(response.target_reps, 5);
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Number of sets in every prescription
pub const PRESCRIBED_SETS: usize = 6;

/// Highest rep count the estimation formulas accept
pub const MAX_REPS: u32 = 20;

/// Percentage of 1RM → prescribed reps, first match wins
const TARGET_REP_TABLE: [(Decimal, u32); 4] = [
    (dec!(90), 3),
    (dec!(80), 5),
    (dec!(70), 8),
    (dec!(60), 10),
];

const FALLBACK_TARGET_REPS: u32 = 12;

/// 1RM estimation formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OneRmFormula {
    /// weight × 36 / (37 − reps)
    #[default]
    Brzycki,
    /// weight × (1 + reps / 30)
    Epley,
    /// weight × 100 / (101.3 − 2.67123 × reps)
    Lander,
}

impl OneRmFormula {
    /// Resolve a request selector. Empty or unknown selectors fall back to Brzycki.
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim().to_lowercase().as_str() {
            "brzycki" | "" => OneRmFormula::Brzycki,
            "epley" => OneRmFormula::Epley,
            "lander" => OneRmFormula::Lander,
            other => {
                warn!(formula = other, "Unknown 1RM formula, falling back to brzycki");
                OneRmFormula::Brzycki
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OneRmFormula::Brzycki => "brzycki",
            OneRmFormula::Epley => "epley",
            OneRmFormula::Lander => "lander",
        }
    }

    /// Unrounded 1RM estimate. A single rep is the max itself.
    ///
    /// Saturates at `Decimal::MAX` instead of overflowing.
    pub fn estimate(&self, weight: Decimal, reps: u32) -> Decimal {
        if reps == 1 {
            return weight;
        }
        let reps = Decimal::from(reps.min(MAX_REPS));
        let factor = match self {
            OneRmFormula::Brzycki => dec!(36) / (dec!(37) - reps),
            OneRmFormula::Epley => Decimal::ONE + reps / dec!(30),
            OneRmFormula::Lander => dec!(100) / (dec!(101.3) - dec!(2.67123) * reps),
        };
        weight.saturating_mul(factor)
    }
}

/// 1RM calculation request. Ranges are checked by `validation::Validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneRmRequest {
    /// Weight lifted, kg, > 0
    pub weight: Decimal,
    /// Reps performed, 1..=20
    pub reps: u32,
    /// Target intensity, % of 1RM, 50..=100
    pub percentage: Decimal,
    /// brzycki, epley or lander
    #[serde(default)]
    pub formula: String,
}

/// One prescribed working set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPrescription {
    pub reps: u32,
    #[serde(rename = "kg")]
    pub weight: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneRmResponse {
    #[serde(rename = "oneRM")]
    pub one_rm: Decimal,
    pub target_weight: Decimal,
    pub target_reps: u32,
    pub percentage: Decimal,
    /// The requested selector; an empty one is reported as `brzycki`
    pub formula: String,
    pub sets: Vec<SetPrescription>,
}

/// Stateless 1RM calculator
pub struct OneRmCalculator;

impl OneRmCalculator {
    /// Estimate the 1RM and build the six-set prescription
    pub fn calculate(request: &OneRmRequest) -> OneRmResponse {
        let formula = OneRmFormula::from_selector(&request.formula);
        let one_rm = formula.estimate(request.weight, request.reps);
        let target_weight = round2(one_rm.saturating_mul(request.percentage / dec!(100)));
        let target_reps = Self::target_reps(request.percentage);

        debug!(
            formula = formula.as_str(),
            %one_rm,
            %target_weight,
            target_reps,
            "Calculated 1RM prescription"
        );

        OneRmResponse {
            one_rm: round2(one_rm),
            target_weight,
            target_reps,
            percentage: request.percentage,
            formula: Self::echoed_formula(&request.formula),
            sets: vec![
                SetPrescription {
                    reps: target_reps,
                    weight: target_weight,
                };
                PRESCRIBED_SETS
            ],
        }
    }

    fn echoed_formula(selector: &str) -> String {
        if selector.trim().is_empty() {
            OneRmFormula::default().as_str().to_string()
        } else {
            selector.to_string()
        }
    }

    /// Reps prescribed for a working percentage of 1RM
    pub fn target_reps(percentage: Decimal) -> u32 {
        TARGET_REP_TABLE
            .iter()
            .find(|(threshold, _)| percentage >= *threshold)
            .map(|(_, reps)| *reps)
            .unwrap_or(FALLBACK_TARGET_REPS)
    }
}

/// Round half away from zero to two decimal places
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
