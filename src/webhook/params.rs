//! Typed per-intent parameters decoded at the envelope boundary.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::Intent;
use crate::error::{EnvelopeError, EnvelopeResult};

/// A parameter value that may arrive as a number or as text.
///
/// The provider sends quantities and order ids as floats, but free-form
/// utterances can surface as strings or stranger shapes. Decoding stays
/// lenient so that validation, not deserialization, decides what is usable
/// and answers with the corrective fulfillment message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    Other(Value),
}

impl ParamValue {
    /// Interpret as a strictly positive whole quantity.
    ///
    /// Textual and fractional values are rejected; a quantity that cannot be
    /// stored as-is must never be silently truncated into the draft.
    pub fn as_quantity(&self) -> Option<u32> {
        match self {
            ParamValue::Number(n) if *n > 0.0 && n.fract() == 0.0 && *n <= f64::from(u32::MAX) => {
                Some(*n as u32)
            }
            _ => None,
        }
    }

    /// Interpret as an order id.
    ///
    /// Whole numbers of either sign pass through (the caller ranges-checks);
    /// text is accepted only when it parses as an integer.
    pub fn as_order_id(&self) -> Option<i64> {
        match self {
            ParamValue::Number(n)
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 =>
            {
                Some(*n as i64)
            }
            ParamValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Parameters for the add-to-order intent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddParams {
    /// Food item names, positionally paired with `quantities`.
    #[serde(rename = "food-item", default)]
    pub food_items: Vec<String>,
    /// Requested quantities, positionally paired with `food_items`.
    #[serde(rename = "number", default)]
    pub quantities: Vec<ParamValue>,
}

/// Parameters for the remove-from-order intent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoveParams {
    /// Food item names to remove from the draft.
    #[serde(rename = "food-item", default)]
    pub food_items: Vec<String>,
}

/// Parameters for the track-order intent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackParams {
    /// The order id to look up; absent when the user gave none.
    #[serde(default)]
    pub order_id: Option<ParamValue>,
}

impl AddParams {
    /// Decode from the envelope's flat parameter map
    pub fn from_parameters(parameters: &Map<String, Value>) -> EnvelopeResult<Self> {
        decode(Intent::AddToOrder, parameters)
    }
}

impl RemoveParams {
    /// Decode from the envelope's flat parameter map
    pub fn from_parameters(parameters: &Map<String, Value>) -> EnvelopeResult<Self> {
        decode(Intent::RemoveFromOrder, parameters)
    }
}

impl TrackParams {
    /// Decode from the envelope's flat parameter map
    pub fn from_parameters(parameters: &Map<String, Value>) -> EnvelopeResult<Self> {
        decode(Intent::TrackOrder, parameters)
    }
}

fn decode<T: DeserializeOwned>(
    intent: Intent,
    parameters: &Map<String, Value>,
) -> EnvelopeResult<T> {
    serde_json::from_value(Value::Object(parameters.clone())).map_err(|e| {
        EnvelopeError::InvalidParameters {
            intent: intent.as_str().to_string(),
            message: e.to_string(),
        }
    })
}
