//! Core types for delaycast: the classifier's expected schema, shipment
//! attributes, one-hot feature encoding, prediction results, and event logs.

mod error;
pub mod event_log;
pub mod features;
pub mod prediction;
pub mod schema;
pub mod shipment;

pub use error::{EventLogError, SchemaError};
pub use event_log::{Event, EventLog};
pub use features::{FeatureVector, build_feature_vector};
pub use prediction::{DELAY_THRESHOLD, PredictionResult, RiskLabel};
pub use schema::ExpectedSchema;
pub use shipment::{CustomerSegment, OrderRegion, PaymentType, ShipmentInputs, ShippingMode};
