use thiserror::Error;

use crate::geojson::GeometryKind;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("geometry must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("unknown geometry type '{0}'")]
    UnknownType(String),
    #[error("invalid {kind} coordinates: {reason}")]
    InvalidCoordinates { kind: GeometryKind, reason: String },
    #[error("{0} has no coordinates")]
    NoCoordinates(GeometryKind),
    #[error("expected a {expected}, found {found}")]
    UnexpectedKind {
        expected: GeometryKind,
        found: GeometryKind,
    },
    #[error("{0} is not a valid geometry")]
    Invalid(GeometryKind),
}

pub type Result<T> = std::result::Result<T, GeometryError>;
