//! Date/time normalization of record data blocks.
//!
//! Every `dateTime` meta entry names properties holding date or date/time
//! literals and the reference (pattern and time zone) they were written in.
//! Literals are rewritten to ISO 8601: `yyyy-MM-dd` for dates and
//! `yyyy-MM-ddTHH:mm:ss.SSSZ` in UTC for date/times.
//!
//! Unlike unit conversion, a failing value never stops the entry: every
//! matched value is attempted and each failure gets its own diagnostic.

pub mod pattern;
pub mod zone;

pub use pattern::{DateTimePattern, ParsedDateTime, PatternError};
pub use zone::Zone;

use chrono::{NaiveTime, TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, trace};

use georef_model::{ConversionRecord, MetaItem, MetaKind, redact_value};

use crate::messages::{ConversionIssue, Pass};
use crate::path;
use crate::reference::{DateTimeDescriptor, DateTimeKind};

const PASS: Pass = Pass::DateTime;

/// Normalize every `dateTime`-described property of a record in place.
pub fn convert_dates(record: &mut ConversionRecord) {
    if !record.has_data() {
        record.add_error(ConversionIssue::MissingDataBlock { pass: PASS }.to_string());
        return;
    }
    let Some(items) = record.meta_items() else {
        debug!(id = record.id(), "No meta block, nothing to convert");
        return;
    };
    record.mark_processed();

    for item in items
        .iter()
        .filter(|item| item.is_kind(&MetaKind::DateTime))
    {
        convert_meta_item(record, item);
    }
}

fn convert_meta_item(record: &mut ConversionRecord, item: &MetaItem) {
    let names = match item.property_names() {
        Ok(names) => names,
        Err(error) => {
            record.add_error(ConversionIssue::from_meta_error(PASS, &error).to_string());
            return;
        }
    };
    let reference = match item.persistable_reference() {
        Ok(reference) => reference,
        Err(error) => {
            record.add_error(ConversionIssue::from_meta_error(PASS, &error).to_string());
            return;
        }
    };
    let descriptor = match DateTimeDescriptor::parse(reference) {
        Ok(descriptor) => descriptor,
        Err(error) => {
            record.add_error(
                ConversionIssue::InvalidReference {
                    pass: PASS,
                    reason: error.to_string(),
                }
                .to_string(),
            );
            return;
        }
    };

    let mut converted = false;
    let mut failed = false;
    for name in &names {
        let matches = record
            .data()
            .map_or_else(Vec::new, |data| path::resolve_owned(data, name));
        if matches.is_empty() {
            record.add_error(ConversionIssue::missing_property(PASS, name).to_string());
            continue;
        }
        for (location, value) in matches {
            let literal = match value {
                Value::Null => {
                    record.add_error(ConversionIssue::missing_property(PASS, name).to_string());
                    continue;
                }
                Value::String(literal) => literal,
                other => {
                    failed = true;
                    record.add_error(
                        ConversionIssue::MismatchedReference {
                            value: other.to_string(),
                            property: name.clone(),
                            format: descriptor.format.clone(),
                        }
                        .to_string(),
                    );
                    continue;
                }
            };
            match convert_literal(&descriptor, &literal) {
                Ok(iso) => {
                    trace!(
                        property = %name,
                        from = redact_value(&literal),
                        to = redact_value(&iso),
                        "Converted to ISO 8601"
                    );
                    if let Some(data) = record.data_mut() {
                        path::write_at(data, &location, Value::String(iso));
                    }
                    converted = true;
                }
                Err(error) => {
                    failed = true;
                    record.add_error(describe_failure(&descriptor, name, &literal, error).to_string());
                }
            }
        }
    }

    if converted && !failed {
        let canonical = DateTimeDescriptor::canonical(descriptor.kind).to_reference();
        record.update_meta(item.index, &canonical, None);
        debug!(
            meta = item.index,
            properties = names.len(),
            "Rewrote date/time reference to ISO 8601"
        );
    }
}

/// Convert one literal under a descriptor to its ISO 8601 form.
///
/// The reference's time zone must resolve whenever one is given, for date
/// references too. Date references keep the calendar date as written.
/// Date/time references are shifted to UTC using the offset in the literal,
/// else the reference's time zone, else UTC.
pub fn convert_literal(
    descriptor: &DateTimeDescriptor,
    literal: &str,
) -> Result<String, PatternError> {
    let pattern = DateTimePattern::compile(&descriptor.format)?;
    let parsed = pattern.parse(literal)?;
    let zone = descriptor
        .time_zone
        .as_deref()
        .map(Zone::resolve)
        .transpose()?;
    match descriptor.kind {
        DateTimeKind::Date => Ok(parsed.date.format("%Y-%m-%d").to_string()),
        DateTimeKind::DateTime => {
            let local = parsed.date.and_time(parsed.time.unwrap_or(NaiveTime::MIN));
            let instant = match (parsed.offset, zone) {
                (Some(offset), _) => offset
                    .from_local_datetime(&local)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc)),
                (None, Some(zone)) => zone.to_utc(local),
                (None, None) => Some(Utc.from_utc_datetime(&local)),
            };
            let instant = instant.ok_or_else(|| {
                PatternError::Generic(format!("local time {local} does not exist in time zone"))
            })?;
            Ok(instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        }
    }
}

/// Map a classified parse failure to its diagnostic.
fn describe_failure(
    descriptor: &DateTimeDescriptor,
    property: &str,
    literal: &str,
    error: PatternError,
) -> ConversionIssue {
    match error {
        PatternError::MalformedPattern { reason } => ConversionIssue::InvalidFormatter {
            format: descriptor.format.clone(),
            reason,
        },
        range @ PatternError::ComponentOutOfRange { .. } => ConversionIssue::InvalidDateTimeValue {
            value: literal.to_string(),
            property: property.to_string(),
            range: range.to_string(),
        },
        PatternError::StructuralMismatch { .. } => ConversionIssue::MismatchedReference {
            value: literal.to_string(),
            property: property.to_string(),
            format: descriptor.format.clone(),
        },
        PatternError::UnresolvedTimeZone(zone) => ConversionIssue::InvalidTimeZone {
            zone,
            property: property.to_string(),
        },
        PatternError::Generic(reason) => ConversionIssue::ParseFailure {
            value: literal.to_string(),
            property: property.to_string(),
            reason,
        },
    }
}
