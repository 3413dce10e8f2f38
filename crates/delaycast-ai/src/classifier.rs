//! Delay classifiers over one-hot shipment features.
//!
//! The classifier is trained elsewhere and shipped as an artifact. The default
//! backend evaluates an exported logistic regression (intercept + one
//! coefficient per schema column); the `onnx` feature adds an ONNX Runtime
//! backend for arbitrary exported models.

use std::path::{Path, PathBuf};

use delaycast_core::FeatureVector;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// File name of the logistic regression artifact inside an artifact directory.
pub const LOGISTIC_MODEL_FILE: &str = "logistic_delay_model.json";

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("model file not found: {0}")]
    NotFound(PathBuf),

    #[error("model has {expected} inputs but feature vector has {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("classifier returned an invalid probability: {0}")]
    InvalidProbability(f64),

    #[error("malformed model artifact: {0}")]
    Malformed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("onnx runtime error: {0}")]
    Onnx(String),
}

/// A fitted binary classifier for the "delayed" class.
///
/// Implementations are read-only after loading and safe to share across threads.
pub trait Classifier: Send + Sync {
    /// Probability in [0, 1] that the shipment described by `features` is delayed.
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, ClassifierError>;

    /// Number of features the model was fitted on, when the artifact says so.
    fn input_width(&self) -> Option<usize>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

/// Logistic regression evaluated in-process: `sigmoid(intercept + w·x)`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogisticClassifier {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LogisticClassifier {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Result<Self, ClassifierError> {
        let model = Self {
            intercept,
            coefficients,
        };
        model.validate()?;
        Ok(model)
    }

    /// Load `{ "intercept": f64, "coefficients": [f64, ...] }` from disk.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        if !path.exists() {
            return Err(ClassifierError::NotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let model: Self = serde_json::from_slice(&bytes)?;
        model.validate()?;
        info!(
            inputs = model.coefficients.len(),
            path = %path.display(),
            "loaded logistic delay model"
        );
        Ok(model)
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        if !self.intercept.is_finite() {
            return Err(ClassifierError::Malformed("intercept is not finite".into()));
        }
        if let Some(i) = self.coefficients.iter().position(|w| !w.is_finite()) {
            return Err(ClassifierError::Malformed(format!(
                "coefficient {i} is not finite"
            )));
        }
        Ok(())
    }
}

impl Classifier for LogisticClassifier {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        if features.len() != self.coefficients.len() {
            return Err(ClassifierError::WidthMismatch {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }
        let logit: f64 = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.values())
                .map(|(w, &x)| w * f64::from(x))
                .sum::<f64>();
        checked_probability(sigmoid(logit))
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn name(&self) -> &str {
        "logistic"
    }
}

/// Reject probabilities a well-formed model cannot produce.
pub(crate) fn checked_probability(p: f64) -> Result<f64, ClassifierError> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(ClassifierError::InvalidProbability(p))
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delaycast_core::{ExpectedSchema, build_feature_vector};

    fn schema() -> ExpectedSchema {
        ExpectedSchema::new([
            "Shipping Mode_Standard Class",
            "Order Region_Western Europe",
            "Type_CASH",
        ])
        .unwrap()
    }

    #[test]
    fn zero_vector_gives_sigmoid_of_intercept() {
        let model = LogisticClassifier::new(0.0, vec![1.0, 2.0, 3.0]).unwrap();
        let v = build_feature_vector(Vec::<(&str, &str)>::new(), &schema());
        let p = model.predict_probability(&v).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn active_columns_shift_the_logit() {
        let model = LogisticClassifier::new(-1.0, vec![2.0, 0.5, -3.0]).unwrap();
        let v = build_feature_vector(
            [("Shipping Mode", "Standard Class"), ("Order Region", "Western Europe")],
            &schema(),
        );
        let p = model.predict_probability(&v).unwrap();
        let expected = 1.0 / (1.0 + (-1.5f64).exp());
        assert!((p - expected).abs() < 1e-12, "got {p}, expected {expected}");
        assert!(p > 0.5);
    }

    #[test]
    fn extreme_logits_stay_in_range() {
        let model = LogisticClassifier::new(-800.0, vec![0.0; 3]).unwrap();
        let v = build_feature_vector(Vec::<(&str, &str)>::new(), &schema());
        let p = model.predict_probability(&v).unwrap();
        assert!((0.0..=1.0).contains(&p));

        let model = LogisticClassifier::new(800.0, vec![0.0; 3]).unwrap();
        assert_eq!(model.predict_probability(&v).unwrap(), 1.0);
    }

    #[test]
    fn width_mismatch_is_an_error() {
        let model = LogisticClassifier::new(0.0, vec![1.0, 1.0]).unwrap();
        let v = build_feature_vector([("Type", "CASH")], &schema());
        let err = model.predict_probability(&v).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::WidthMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn non_finite_weights_rejected() {
        let err = LogisticClassifier::new(0.0, vec![1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, ClassifierError::Malformed(_)));
    }

    #[test]
    fn load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOGISTIC_MODEL_FILE);
        std::fs::write(&path, r#"{"intercept": -0.25, "coefficients": [0.1, 0.2, 0.3]}"#).unwrap();

        let model = LogisticClassifier::load(&path).unwrap();
        assert_eq!(model.intercept(), -0.25);
        assert_eq!(model.input_width(), Some(3));
        assert_eq!(model.name(), "logistic");
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LogisticClassifier::load(&dir.path().join(LOGISTIC_MODEL_FILE)).unwrap_err();
        assert!(matches!(err, ClassifierError::NotFound(_)));
    }

    #[test]
    fn probability_check() {
        assert!(checked_probability(0.3).is_ok());
        assert!(matches!(
            checked_probability(f64::NAN),
            Err(ClassifierError::InvalidProbability(_))
        ));
        assert!(checked_probability(1.01).is_err());
    }
}
