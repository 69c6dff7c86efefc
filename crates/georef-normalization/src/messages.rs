//! Diagnostic message templates.
//!
//! Every failure a conversion pass can detect maps to exactly one variant
//! here; the rendered text is what lands in the record's diagnostics.

use std::fmt;

use thiserror::Error;

use georef_model::MetaError;

/// The conversion pass a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Unit,
    DateTime,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("Unit"),
            Self::DateTime => f.write_str("DateTime"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionIssue {
    #[error("{pass} conversion: missing data block")]
    MissingDataBlock { pass: Pass },

    #[error("{pass} conversion: property names missing")]
    MissingPropertyNames { pass: Pass },

    #[error("{pass} conversion: illegal value for property names")]
    IllegalPropertyNames { pass: Pass },

    #[error("{pass} conversion: persistable reference missing")]
    MissingReference { pass: Pass },

    #[error("{pass} conversion: persistable reference not valid: {reason}")]
    InvalidReference { pass: Pass, reason: String },

    #[error("{pass} conversion: property {property} missing")]
    MissingProperty { pass: Pass, property: String },

    #[error("Unit conversion: illegal value for property {property}")]
    IllegalPropertyValue { property: String },

    #[error("DateTime conversion: invalid formatter '{format}': {reason}")]
    InvalidFormatter { format: String, reason: String },

    #[error("DateTime conversion: invalid datetime value '{value}' for property {property}: {range}")]
    InvalidDateTimeValue {
        value: String,
        property: String,
        range: String,
    },

    #[error(
        "DateTime conversion: value '{value}' of property {property} does not match reference format '{format}'"
    )]
    MismatchedReference {
        value: String,
        property: String,
        format: String,
    },

    #[error("DateTime conversion: error parsing value '{value}' of property {property}: {reason}")]
    ParseFailure {
        value: String,
        property: String,
        reason: String,
    },

    #[error("DateTime conversion: invalid timezone '{zone}' for property {property}")]
    InvalidTimeZone { zone: String, property: String },
}

impl ConversionIssue {
    /// The diagnostic for a structurally broken meta entry.
    pub fn from_meta_error(pass: Pass, error: &MetaError) -> Self {
        match error {
            MetaError::MissingPropertyNames => Self::MissingPropertyNames { pass },
            MetaError::IllegalPropertyNames => Self::IllegalPropertyNames { pass },
            MetaError::MissingReference => Self::MissingReference { pass },
        }
    }

    pub fn missing_property(pass: Pass, property: &str) -> Self {
        Self::MissingProperty {
            pass,
            property: property.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_carry_pass_prefix() {
        let unit = ConversionIssue::MissingReference { pass: Pass::Unit };
        let date = ConversionIssue::MissingReference {
            pass: Pass::DateTime,
        };
        assert_eq!(unit.to_string(), "Unit conversion: persistable reference missing");
        assert_eq!(
            date.to_string(),
            "DateTime conversion: persistable reference missing"
        );
    }

    #[test]
    fn invalid_value_carries_range() {
        let issue = ConversionIssue::InvalidDateTimeValue {
            value: "2019-26-03".to_string(),
            property: "SpudDate".to_string(),
            range: "Invalid value for MonthOfYear (valid values 1 - 12): 26".to_string(),
        };
        insta::assert_snapshot!(
            issue.to_string(),
            @"DateTime conversion: invalid datetime value '2019-26-03' for property SpudDate: Invalid value for MonthOfYear (valid values 1 - 12): 26"
        );
    }
}
