use std::fmt;

use serde::{Deserialize, Serialize};

/// Probabilities strictly above this are labelled [`RiskLabel::High`].
pub const DELAY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLabel {
    High,
    Low,
}

impl RiskLabel {
    pub fn from_probability(probability: f64) -> Self {
        if probability > DELAY_THRESHOLD {
            Self::High
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High Risk",
            Self::Low => "Low Risk",
        }
    }
}

/// Delay probability for one shipment plus its thresholded label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability of the positive ("delayed") class, in [0, 1].
    pub probability: f64,
    pub risk: RiskLabel,
}

impl PredictionResult {
    /// Wrap a classifier output. Values are clamped into [0, 1]; NaN yields `None`.
    pub fn from_probability(probability: f64) -> Option<Self> {
        if probability.is_nan() {
            return None;
        }
        let probability = probability.clamp(0.0, 1.0);
        Some(Self {
            probability,
            risk: RiskLabel::from_probability(probability),
        })
    }

    /// Probability as a percentage with two decimals, e.g. `"78.00%"`.
    pub fn percentage(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk == RiskLabel::High
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.risk.as_str(), self.percentage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(RiskLabel::from_probability(0.5), RiskLabel::Low);
        assert_eq!(RiskLabel::from_probability(0.500_001), RiskLabel::High);
        assert_eq!(RiskLabel::from_probability(0.0), RiskLabel::Low);
        assert_eq!(RiskLabel::from_probability(1.0), RiskLabel::High);
    }

    #[test]
    fn display_formats_percentage() {
        let high = PredictionResult::from_probability(0.78).unwrap();
        assert_eq!(high.to_string(), "High Risk: 78.00%");

        let low = PredictionResult::from_probability(0.125).unwrap();
        assert_eq!(low.to_string(), "Low Risk: 12.50%");
        assert!(!low.is_high_risk());
    }

    #[test]
    fn out_of_range_is_clamped() {
        let p = PredictionResult::from_probability(1.2).unwrap();
        assert_eq!(p.probability, 1.0);
        let p = PredictionResult::from_probability(-0.1).unwrap();
        assert_eq!(p.probability, 0.0);
    }

    #[test]
    fn nan_is_rejected() {
        assert!(PredictionResult::from_probability(f64::NAN).is_none());
    }
}
