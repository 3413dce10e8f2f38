//! AI layer: delay classification over one-hot shipment features, and a local
//! LLM client for strategic risk insights.

pub mod classifier;
pub mod insight;
#[cfg(feature = "onnx")]
mod onnx;
pub mod predictor;

pub use classifier::{Classifier, ClassifierError, LogisticClassifier};
pub use insight::{GenerateRequest, GenerateResponse, InsightClient, InsightConfig, InsightError};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
pub use predictor::{Predictor, PredictorError};
