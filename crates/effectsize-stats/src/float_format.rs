//! Serde helpers for result values that may be non-finite.
//!
//! JSON has no literal for NaN or infinity, so those values are written as
//! the strings `"NaN"`, `"inf"` and `"-inf"` and read back to the same
//! `f64`. Finite values stay plain numbers. CSV output uses the same labels.
//!
//! Use with `#[serde(with = "float_format")]` and
//! `#[schemars(with = "float_format::ReportFloat")]`; the [`option`]
//! submodule covers `Option<f64>` cells.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire shape of a result value: a number or a non-finite label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ReportFloat {
    Finite(f64),
    NonFinite(NonFinite),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum NonFinite {
    #[serde(rename = "NaN")]
    NaN,
    #[serde(rename = "inf")]
    Infinity,
    #[serde(rename = "-inf")]
    NegInfinity,
}

impl NonFinite {
    pub fn label(&self) -> &'static str {
        match self {
            NonFinite::NaN => "NaN",
            NonFinite::Infinity => "inf",
            NonFinite::NegInfinity => "-inf",
        }
    }
}

impl From<f64> for ReportFloat {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            ReportFloat::NonFinite(NonFinite::NaN)
        } else if value == f64::INFINITY {
            ReportFloat::NonFinite(NonFinite::Infinity)
        } else if value == f64::NEG_INFINITY {
            ReportFloat::NonFinite(NonFinite::NegInfinity)
        } else {
            ReportFloat::Finite(value)
        }
    }
}

impl From<ReportFloat> for f64 {
    fn from(value: ReportFloat) -> Self {
        match value {
            ReportFloat::Finite(value) => value,
            ReportFloat::NonFinite(NonFinite::NaN) => f64::NAN,
            ReportFloat::NonFinite(NonFinite::Infinity) => f64::INFINITY,
            ReportFloat::NonFinite(NonFinite::NegInfinity) => f64::NEG_INFINITY,
        }
    }
}

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    match ReportFloat::from(*value) {
        ReportFloat::Finite(value) => serializer.serialize_f64(value),
        ReportFloat::NonFinite(label) => serializer.serialize_str(label.label()),
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    ReportFloat::deserialize(deserializer).map(f64::from)
}

pub mod option {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::ReportFloat;

    /// `None` stays empty (`null` in JSON, an empty CSV cell).
    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Option::<ReportFloat>::deserialize(deserializer).map(|value| value.map(f64::from))
    }
}
