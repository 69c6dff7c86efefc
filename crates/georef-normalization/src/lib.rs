//! Frame-of-reference normalization of record trees.
//!
//! Records carry a `data` block of client values and a `meta` block
//! describing the frame of reference of some of those values. This crate
//! rewrites the described values in place:
//!
//! - **unit**: quantities to SI base units
//! - **datetime**: date and date/time literals to ISO 8601 (UTC)
//! - **reference**: parsing of persistable unit and date/time references
//! - **path**: dotted, array-aware property paths into data blocks
//! - **pipeline**: batch driver running both passes
//!
//! # Example
//!
//! ```
//! use georef_model::ConversionRecord;
//! use georef_normalization::convert_units;
//! use serde_json::json;
//!
//! let feet = r#"{"scaleOffset":{"scale":0.3048,"offset":0.0},"symbol":"ft","baseMeasurement":{"ancestry":"Length","type":"UM"},"type":"USO"}"#;
//! let mut record = ConversionRecord::new(json!({
//!     "data": {"MD": 10},
//!     "meta": [{"kind": "unit", "propertyNames": ["MD"], "persistableReference": feet}]
//! }));
//! convert_units(&mut record);
//! assert_eq!(record.record()["meta"][0]["name"], "m");
//! ```
//!
//! No failure escapes a record: problems become diagnostics on the
//! [`ConversionRecord`](georef_model::ConversionRecord) and the record moves to
//! the error status, keeping whatever was converted before the failure.

pub mod datetime;
pub mod messages;
pub mod numeric;
pub mod path;
pub mod pipeline;
pub mod reference;
pub mod unit;

pub use datetime::{convert_dates, convert_literal};
pub use messages::{ConversionIssue, Pass};
pub use path::{PathStep, PropertyPath};
pub use pipeline::{BatchSummary, NormalizationOptions, normalize_record, normalize_records};
pub use reference::{DateTimeDescriptor, DateTimeKind, ReferenceError, UnitDescriptor};
pub use unit::convert_units;
