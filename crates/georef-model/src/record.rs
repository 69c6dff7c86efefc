//! The conversion record: a record tree plus its diagnostics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ModelError, Result, json_type_name};
use crate::meta::{MetaItem, NAME_FIELD, PERSISTABLE_REFERENCE_FIELD};
use crate::status::ConversionStatus;

pub const DATA_FIELD: &str = "data";
pub const META_FIELD: &str = "meta";
pub const ID_FIELD: &str = "id";

/// A record being normalized, together with the diagnostics produced so far.
///
/// The record starts as [`ConversionStatus::NoFrameOfReference`]; a pass that
/// finds metadata to act on marks it processed, and any diagnostic moves it to
/// [`ConversionStatus::Error`]. Diagnostics are append-only and the error
/// status is never cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRecord {
    record: Value,
    messages: Vec<String>,
    status: ConversionStatus,
}

impl ConversionRecord {
    pub fn new(record: Value) -> Self {
        Self {
            record,
            messages: Vec::new(),
            status: ConversionStatus::NoFrameOfReference,
        }
    }

    /// Build a conversion record, rejecting trees that are not JSON objects.
    pub fn try_new(record: Value) -> Result<Self> {
        if !record.is_object() {
            return Err(ModelError::NotAnObject(json_type_name(&record)));
        }
        Ok(Self::new(record))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::try_new(serde_json::from_str(json)?)
    }

    pub fn record(&self) -> &Value {
        &self.record
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn status(&self) -> ConversionStatus {
        self.status
    }

    pub fn id(&self) -> Option<&str> {
        self.record.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn into_record(self) -> Value {
        self.record
    }

    /// Append a diagnostic and move the record to the error status.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
        self.status = self.status.merge(ConversionStatus::Error);
    }

    /// Record that a pass found frame-of-reference metadata to act on.
    pub fn mark_processed(&mut self) {
        self.status = self.status.merge(ConversionStatus::Success);
    }

    pub fn has_data(&self) -> bool {
        self.data().is_some()
    }

    pub fn data(&self) -> Option<&Value> {
        self.record.get(DATA_FIELD).filter(|v| !v.is_null())
    }

    pub fn data_mut(&mut self) -> Option<&mut Value> {
        self.record.get_mut(DATA_FIELD).filter(|v| !v.is_null())
    }

    /// The entries of the `meta` array, or `None` when the record has no
    /// `meta` array at all.
    pub fn meta_items(&self) -> Option<Vec<MetaItem>> {
        let items = self.record.get(META_FIELD)?.as_array()?;
        Some(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| MetaItem::from_value(index, item))
                .collect(),
        )
    }

    /// Rewrite a meta entry's reference, and optionally its `name`.
    ///
    /// Returns `false` when the entry does not exist or is not an object.
    pub fn update_meta(&mut self, index: usize, reference: &str, name: Option<&str>) -> bool {
        let Some(entry) = self
            .record
            .get_mut(META_FIELD)
            .and_then(Value::as_array_mut)
            .and_then(|items| items.get_mut(index))
            .and_then(Value::as_object_mut)
        else {
            return false;
        };
        set_field(entry, PERSISTABLE_REFERENCE_FIELD, Value::from(reference));
        if let Some(name) = name {
            set_field(entry, NAME_FIELD, Value::from(name));
        }
        true
    }

    pub fn summary(&self) -> ConversionSummary {
        ConversionSummary {
            id: self.id().map(str::to_string),
            status: self.status,
            errors: self.messages.clone(),
        }
    }
}

/// Existing keys keep their position; new keys are appended.
fn set_field(entry: &mut Map<String, Value>, key: &str, value: Value) {
    match entry.get_mut(key) {
        Some(slot) => *slot = value,
        None => {
            entry.insert(key.to_string(), value);
        }
    }
}

/// Serializable status report for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: ConversionStatus,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn errors_are_sticky() {
        let mut record = ConversionRecord::new(json!({}));
        record.add_error("first");
        record.mark_processed();
        assert_eq!(record.status(), ConversionStatus::Error);
        assert_eq!(record.messages(), ["first".to_string()]);
    }

    #[test]
    fn untouched_record_has_no_frame_of_reference() {
        let record = ConversionRecord::new(json!({"id": "a"}));
        assert_eq!(record.status(), ConversionStatus::NoFrameOfReference);
        assert!(record.messages().is_empty());
        assert_eq!(record.id(), Some("a"));
    }

    #[test]
    fn meta_items_absent_without_array() {
        assert!(ConversionRecord::new(json!({})).meta_items().is_none());
        assert!(
            ConversionRecord::new(json!({"meta": {}}))
                .meta_items()
                .is_none()
        );
        assert_eq!(
            ConversionRecord::new(json!({"meta": []}))
                .meta_items()
                .map(|items| items.len()),
            Some(0)
        );
    }

    #[test]
    fn update_meta_keeps_key_order() {
        let mut record = ConversionRecord::new(json!({
            "meta": [{"kind": "unit", "persistableReference": "old", "propertyNames": ["MD"]}]
        }));
        assert!(record.update_meta(0, "new", Some("m")));
        let entry = &record.record()["meta"][0];
        let keys: Vec<&str> = entry.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["kind", "persistableReference", "propertyNames", "name"]);
        assert_eq!(entry["persistableReference"], "new");
        assert!(!record.update_meta(4, "new", None));
    }

    #[test]
    fn null_data_is_absent() {
        let record = ConversionRecord::new(json!({"data": null}));
        assert!(!record.has_data());
    }

    #[test]
    fn try_new_rejects_non_objects() {
        let err = ConversionRecord::try_new(json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "record must be a JSON object, found array");
    }
}
