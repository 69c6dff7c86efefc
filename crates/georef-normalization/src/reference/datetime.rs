//! Date and date/time references (`DAT` / `DTM`).

use serde::Serialize;
use serde_json::Value;

use super::{ReferenceError, ReferenceType, canonicalize, reference_type, string_field};

/// Pattern of the canonical `DAT` reference.
pub const ISO_DATE_FORMAT: &str = "yyyy-MM-dd";
/// Pattern of the canonical `DTM` reference.
pub const ISO_DATE_TIME_FORMAT: &str = "yyyy-MM-ddTHH:mm:ss.SSSZ";
pub const UTC_ZONE: &str = "UTC";

const FORMAT_FIELD: &str = "format";
const TIME_ZONE_FIELD: &str = "timeZone";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeKind {
    /// Calendar date without a time of day.
    Date,
    /// Instant, normalized to UTC.
    DateTime,
}

impl DateTimeKind {
    fn reference_type(self) -> ReferenceType {
        match self {
            Self::Date => ReferenceType::Date,
            Self::DateTime => ReferenceType::DateTime,
        }
    }
}

/// A parsed date/time reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeDescriptor {
    pub kind: DateTimeKind,
    pub format: String,
    pub time_zone: Option<String>,
}

impl DateTimeDescriptor {
    /// Parse a persistable date/time reference (string or object form).
    ///
    /// The format pattern itself is not compiled here; a malformed pattern is
    /// reported against each value it fails to parse.
    pub fn parse(reference: &Value) -> Result<Self, ReferenceError> {
        let reference = canonicalize(reference)?;
        let kind = match reference_type(&reference)? {
            ReferenceType::Date => DateTimeKind::Date,
            ReferenceType::DateTime => DateTimeKind::DateTime,
            other => {
                return Err(ReferenceError::WrongGrammar {
                    expected: "date/time",
                    found: other.code().to_string(),
                });
            }
        };
        let format = string_field(&reference, FORMAT_FIELD)?
            .ok_or(ReferenceError::MissingField(FORMAT_FIELD))?;
        if format.trim().is_empty() {
            return Err(ReferenceError::InvalidField {
                field: FORMAT_FIELD,
                reason: "format must not be empty".to_string(),
            });
        }
        let time_zone = string_field(&reference, TIME_ZONE_FIELD)?
            .map(str::trim)
            .filter(|zone| !zone.is_empty())
            .map(str::to_string);
        Ok(Self {
            kind,
            format: format.to_string(),
            time_zone,
        })
    }

    /// The canonical ISO 8601 descriptor for a kind.
    pub fn canonical(kind: DateTimeKind) -> Self {
        match kind {
            DateTimeKind::Date => Self {
                kind,
                format: ISO_DATE_FORMAT.to_string(),
                time_zone: None,
            },
            DateTimeKind::DateTime => Self {
                kind,
                format: ISO_DATE_TIME_FORMAT.to_string(),
                time_zone: Some(UTC_ZONE.to_string()),
            },
        }
    }

    /// Serialize this descriptor as a persistable reference string.
    pub fn to_reference(&self) -> String {
        let reference = SerializedReference {
            format: &self.format,
            time_zone: self.time_zone.as_deref(),
            reference_type: self.kind.reference_type().code(),
        };
        serde_json::to_string(&reference).unwrap_or_default()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SerializedReference<'a> {
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone: Option<&'a str>,
    #[serde(rename = "type")]
    reference_type: &'static str,
}
