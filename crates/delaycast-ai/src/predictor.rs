//! Startup-loaded prediction context: expected schema + classifier.

use std::path::Path;

use delaycast_core::schema::SCHEMA_FILE;
use delaycast_core::{
    ExpectedSchema, FeatureVector, PredictionResult, SchemaError, ShipmentInputs,
    build_feature_vector,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::classifier::{Classifier, ClassifierError, LOGISTIC_MODEL_FILE, LogisticClassifier};

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("expected schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("classifier: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("classifier expects {model} features but schema has {schema} columns")]
    SchemaMismatch { model: usize, schema: usize },
}

/// Immutable prediction context, loaded once and passed explicitly to callers.
pub struct Predictor {
    schema: ExpectedSchema,
    classifier: Box<dyn Classifier>,
}

impl Predictor {
    /// Assemble a predictor from already-loaded parts.
    ///
    /// Fails when the classifier declares an input width different from the schema length.
    pub fn new(
        schema: ExpectedSchema,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, PredictorError> {
        if let Some(width) = classifier.input_width()
            && width != schema.len()
        {
            return Err(PredictorError::SchemaMismatch {
                model: width,
                schema: schema.len(),
            });
        }
        Ok(Self { schema, classifier })
    }

    /// Load `model_columns.json` and the classifier artifact from `artifact_dir`.
    ///
    /// With the `onnx` feature, a `model.onnx` in the directory takes precedence
    /// over `logistic_delay_model.json`.
    pub fn load(artifact_dir: &Path) -> Result<Self, PredictorError> {
        let schema = ExpectedSchema::load(&artifact_dir.join(SCHEMA_FILE))?;
        let classifier = load_classifier(artifact_dir)?;
        info!(
            backend = classifier.name(),
            columns = schema.len(),
            dir = %artifact_dir.display(),
            "predictor ready"
        );
        Self::new(schema, classifier)
    }

    pub fn schema(&self) -> &ExpectedSchema {
        &self.schema
    }

    pub fn backend(&self) -> &str {
        self.classifier.name()
    }

    /// One-hot encode `inputs` against the expected schema.
    pub fn encode(&self, inputs: &ShipmentInputs) -> FeatureVector {
        build_feature_vector(inputs.attributes(), &self.schema)
    }

    /// Encode `inputs`, run the classifier, and threshold the result.
    pub fn predict(&self, inputs: &ShipmentInputs) -> Result<PredictionResult, ClassifierError> {
        let features = self.encode(inputs);
        self.predict_features(&features)
    }

    pub fn predict_features(
        &self,
        features: &FeatureVector,
    ) -> Result<PredictionResult, ClassifierError> {
        let probability = self.classifier.predict_probability(features)?;
        let result = PredictionResult::from_probability(probability)
            .ok_or(ClassifierError::InvalidProbability(probability))?;
        debug!(probability, risk = ?result.risk, "prediction");
        Ok(result)
    }
}

#[cfg(feature = "onnx")]
fn load_classifier(artifact_dir: &Path) -> Result<Box<dyn Classifier>, ClassifierError> {
    let onnx_path = artifact_dir.join(crate::onnx::ONNX_MODEL_FILE);
    if onnx_path.exists() {
        return Ok(Box::new(crate::OnnxClassifier::load(&onnx_path)?));
    }
    Ok(Box::new(LogisticClassifier::load(
        &artifact_dir.join(LOGISTIC_MODEL_FILE),
    )?))
}

#[cfg(not(feature = "onnx"))]
fn load_classifier(artifact_dir: &Path) -> Result<Box<dyn Classifier>, ClassifierError> {
    Ok(Box::new(LogisticClassifier::load(
        &artifact_dir.join(LOGISTIC_MODEL_FILE),
    )?))
}
