//! Unit normalization of record data blocks.
//!
//! Every `unit` meta entry names properties holding quantities and the unit
//! reference they are expressed in. Values are rewritten to the SI base unit
//! and, when the whole entry converted cleanly, the entry itself is rewritten
//! to describe the base unit.
//!
//! The first non-numeric value stops the entry: names after it are left
//! untouched.

use tracing::{debug, trace};

use georef_model::{ConversionRecord, MetaItem, MetaKind, redact_value};

use crate::messages::{ConversionIssue, Pass};
use crate::numeric::{number_value, value_as_f64};
use crate::path;
use crate::reference::UnitDescriptor;

const PASS: Pass = Pass::Unit;

/// Normalize every `unit`-described property of a record in place.
///
/// A record without a data block has nothing to convert and is not an error.
/// Without a meta block the record keeps its no-frame-of-reference status.
pub fn convert_units(record: &mut ConversionRecord) {
    let Some(items) = record.meta_items() else {
        debug!(id = record.id(), "No meta block, nothing to convert");
        return;
    };
    record.mark_processed();
    if !record.has_data() {
        debug!(id = record.id(), "No data block, nothing to convert");
        return;
    }

    for item in items.iter().filter(|item| item.is_kind(&MetaKind::Unit)) {
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
    let unit = match UnitDescriptor::parse(reference) {
        Ok(unit) => unit,
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
    'names: for name in &names {
        let matches = record
            .data()
            .map_or_else(Vec::new, |data| path::resolve_owned(data, name));
        if matches.is_empty() {
            record.add_error(ConversionIssue::missing_property(PASS, name).to_string());
            continue;
        }
        for (location, value) in matches {
            if value.is_null() {
                record.add_error(ConversionIssue::missing_property(PASS, name).to_string());
                continue;
            }
            let Some(si) = value_as_f64(&value)
                .map(|v| unit.to_si(v))
                .and_then(number_value)
            else {
                failed = true;
                record.add_error(
                    ConversionIssue::IllegalPropertyValue {
                        property: name.clone(),
                    }
                    .to_string(),
                );
                break 'names;
            };
            trace!(
                property = %name,
                from = redact_value(&value.to_string()),
                to = redact_value(&si.to_string()),
                "Converted to {}",
                unit.base_symbol
            );
            if let Some(data) = record.data_mut() {
                path::write_at(data, &location, si);
            }
            converted = true;
        }
    }

    if converted && !failed {
        record.update_meta(item.index, &unit.base_reference(), Some(&unit.base_symbol));
        debug!(
            meta = item.index,
            base = %unit.base_symbol,
            "Rewrote unit reference to base unit"
        );
    }
}
