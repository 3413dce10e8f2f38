//! Categorical shipment attributes and their closed value sets.
//!
//! The attribute names and value spellings match the one-hot columns produced
//! by the training pipeline, so `ShipmentInputs::attributes()` can be fed
//! straight into [`build_feature_vector`](crate::build_feature_vector).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {attribute} value: {value:?}")]
pub struct ParseAttributeError {
    pub attribute: &'static str,
    pub value: String,
}

/// Declares a closed set of attribute values with their training-data spellings.
macro_rules! closed_set {
    (
        $(#[$meta:meta])*
        $name:ident, $attribute:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Attribute name used as the column prefix.
            pub const ATTRIBUTE: &'static str = $attribute;

            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseAttributeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| ParseAttributeError {
                        attribute: $attribute,
                        value: s.to_string(),
                    })
            }
        }
    };
}

closed_set! {
    /// How the order was paid.
    PaymentType, "Type" {
        Debit => "DEBIT",
        Transfer => "TRANSFER",
        Cash => "CASH",
        Payment => "PAYMENT",
    }
}

closed_set! {
    /// Destination market region.
    OrderRegion, "Order Region" {
        WesternEurope => "Western Europe",
        CentralAmerica => "Central America",
        SouthAmerica => "South America",
        SoutheastAsia => "Southeast Asia",
    }
}

closed_set! {
    ShippingMode, "Shipping Mode" {
        StandardClass => "Standard Class",
        FirstClass => "First Class",
        SecondClass => "Second Class",
        SameDay => "Same Day",
    }
}

closed_set! {
    CustomerSegment, "Customer Segment" {
        Consumer => "Consumer",
        Corporate => "Corporate",
        HomeOffice => "Home Office",
    }
}

/// One prediction request: a value from each closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentInputs {
    pub payment_type: PaymentType,
    pub order_region: OrderRegion,
    pub shipping_mode: ShippingMode,
    pub segment: CustomerSegment,
}

impl ShipmentInputs {
    /// The four `(attribute, value)` pairs, in form order.
    pub fn attributes(&self) -> [(&'static str, &'static str); 4] {
        [
            (PaymentType::ATTRIBUTE, self.payment_type.as_str()),
            (OrderRegion::ATTRIBUTE, self.order_region.as_str()),
            (ShippingMode::ATTRIBUTE, self.shipping_mode.as_str()),
            (CustomerSegment::ATTRIBUTE, self.segment.as_str()),
        ]
    }
}

impl Default for ShipmentInputs {
    /// The first entry of each selection control.
    fn default() -> Self {
        Self {
            payment_type: PaymentType::Debit,
            order_region: OrderRegion::WesternEurope,
            shipping_mode: ShippingMode::StandardClass,
            segment: CustomerSegment::Consumer,
        }
    }
}
