//! ONNX Runtime backend for exported delay classifiers.
//!
//! Expects a model with a single float input of shape `[N, width]` and a
//! `probabilities` output of shape `[N, 2]` (or `[N, 1]`), i.e. a
//! scikit-learn export with the label zip-map disabled.

use std::path::Path;

use delaycast_core::FeatureVector;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;
use parking_lot::Mutex;
use tracing::info;

use crate::classifier::{Classifier, ClassifierError, checked_probability};

/// File name of an ONNX export inside an artifact directory.
pub const ONNX_MODEL_FILE: &str = "model.onnx";

const PROBABILITY_OUTPUT: &str = "probabilities";

pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    width: Option<usize>,
}

impl OnnxClassifier {
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        if !path.exists() {
            return Err(ClassifierError::NotFound(path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(onnx_error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(onnx_error)?
            .commit_from_file(path)
            .map_err(onnx_error)?;

        let input = session
            .inputs()
            .first()
            .ok_or_else(|| ClassifierError::Malformed("model has no inputs".into()))?;
        let input_name = input.name().to_string();
        let width = infer_width(input.dtype());

        if !session
            .outputs()
            .iter()
            .any(|o| o.name() == PROBABILITY_OUTPUT)
        {
            return Err(ClassifierError::Malformed(format!(
                "model has no '{PROBABILITY_OUTPUT}' output"
            )));
        }

        info!(input = %input_name, ?width, model = %path.display(), "loaded onnx delay model");
        Ok(Self {
            session: Mutex::new(session),
            input_name,
            width,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        if let Some(expected) = self.width
            && expected != features.len()
        {
            return Err(ClassifierError::WidthMismatch {
                expected,
                actual: features.len(),
            });
        }

        let shape = [1i64, features.len() as i64];
        let tensor = Tensor::from_array((shape, features.values().to_vec().into_boxed_slice()))
            .map_err(onnx_error)?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(onnx_error)?;
        let (shape, data) = outputs[PROBABILITY_OUTPUT]
            .try_extract_tensor::<f32>()
            .map_err(onnx_error)?;
        let dims: &[i64] = shape;

        // Positive ("delayed") class is the last column of the first row.
        let p = match dims {
            [_, cols] if *cols >= 1 => data[(*cols as usize) - 1],
            _ => {
                return Err(ClassifierError::Malformed(format!(
                    "unexpected probability shape {dims:?}"
                )));
            }
        };
        checked_probability(f64::from(p))
    }

    fn input_width(&self) -> Option<usize> {
        self.width
    }

    fn name(&self) -> &str {
        "onnx"
    }
}

fn onnx_error(e: impl std::fmt::Display) -> ClassifierError {
    ClassifierError::Onnx(e.to_string())
}

/// Feature width from the model's input type, when it is static.
fn infer_width(input_type: &ort::value::ValueType) -> Option<usize> {
    match input_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
