//! Persistable reference parsing.
//!
//! A persistable reference arrives either as a JSON object or as a string
//! holding serialized JSON. Both forms are canonicalized to one JSON object
//! before the unit or date/time grammar looks at it, so the engines never
//! care which form a client sent.

pub mod datetime;
pub mod unit;

pub use datetime::{DateTimeDescriptor, DateTimeKind};
pub use unit::UnitDescriptor;

use serde_json::{Map, Value};
use thiserror::Error;

use georef_model::error::json_type_name;

pub const TYPE_FIELD: &str = "type";

/// Why a persistable reference could not be turned into a descriptor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReferenceError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("unknown reference type '{0}'")]
    UnknownType(String),
    #[error("expected a {expected} reference, found type '{found}'")]
    WrongGrammar {
        expected: &'static str,
        found: String,
    },
}

/// The `type` code of a persistable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceType {
    /// Unit with scale/offset conversion parameters.
    ScaleOffsetUnit,
    /// Unit with Energistics `a,b,c,d` conversion parameters.
    AbcdUnit,
    /// A unit of measure family; values are already in its base unit.
    Measurement,
    Date,
    DateTime,
}

impl ReferenceType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "USO" => Some(Self::ScaleOffsetUnit),
            "UAD" => Some(Self::AbcdUnit),
            "UM" => Some(Self::Measurement),
            "DAT" => Some(Self::Date),
            "DTM" => Some(Self::DateTime),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::ScaleOffsetUnit => "USO",
            Self::AbcdUnit => "UAD",
            Self::Measurement => "UM",
            Self::Date => "DAT",
            Self::DateTime => "DTM",
        }
    }

    pub fn is_unit(self) -> bool {
        matches!(
            self,
            Self::ScaleOffsetUnit | Self::AbcdUnit | Self::Measurement
        )
    }
}

/// Canonicalize either representation of a reference to a JSON object.
pub fn canonicalize(reference: &Value) -> Result<Map<String, Value>, ReferenceError> {
    match reference {
        Value::Object(map) => Ok(map.clone()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ReferenceError::NotAnObject(json_type_name(&other))),
            Err(error) => Err(ReferenceError::InvalidJson(error.to_string())),
        },
        other => Err(ReferenceError::NotAnObject(json_type_name(other))),
    }
}

/// Read the `type` code of a canonicalized reference.
pub fn reference_type(reference: &Map<String, Value>) -> Result<ReferenceType, ReferenceError> {
    let code = reference
        .get(TYPE_FIELD)
        .ok_or(ReferenceError::MissingField(TYPE_FIELD))?
        .as_str()
        .ok_or_else(|| ReferenceError::InvalidField {
            field: TYPE_FIELD,
            reason: "expected a string".to_string(),
        })?;
    ReferenceType::from_code(code).ok_or_else(|| ReferenceError::UnknownType(code.to_string()))
}

/// Read a required finite number.
pub(crate) fn number_field(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<f64, ReferenceError> {
    let value = object
        .get(field)
        .filter(|v| !v.is_null())
        .ok_or(ReferenceError::MissingField(field))?;
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ReferenceError::InvalidField {
            field,
            reason: format!("expected a number, found {}", json_type_name(value)),
        })
}

pub(crate) fn string_field<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<Option<&'a str>, ReferenceError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(other) => Err(ReferenceError::InvalidField {
            field,
            reason: format!("expected a string, found {}", json_type_name(other)),
        }),
    }
}
