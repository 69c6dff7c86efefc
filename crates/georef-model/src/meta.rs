//! Typed view over the entries of a record's `meta` block.
//!
//! Each entry declares which data properties it applies to and the frame of
//! reference those values are expressed in:
//!
//! ```json
//! { "kind": "unit", "name": "ft", "propertyNames": ["MD"],
//!   "persistableReference": "{\"scaleOffset\":{...},\"type\":\"USO\"}" }
//! ```

use serde_json::Value;
use thiserror::Error;

pub const KIND_FIELD: &str = "kind";
pub const NAME_FIELD: &str = "name";
pub const PROPERTY_NAMES_FIELD: &str = "propertyNames";
pub const PERSISTABLE_REFERENCE_FIELD: &str = "persistableReference";

/// Which conversion engine a meta entry is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaKind {
    Unit,
    DateTime,
    /// Any other kind (for example `CRS`); ignored by the engines.
    Other(String),
}

impl MetaKind {
    /// Kinds are matched case-insensitively.
    pub fn parse(kind: &str) -> Self {
        if kind.eq_ignore_ascii_case("unit") {
            Self::Unit
        } else if kind.eq_ignore_ascii_case("dateTime") {
            Self::DateTime
        } else {
            Self::Other(kind.to_string())
        }
    }
}

/// Problems with the structural fields of a meta entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetaError {
    #[error("property names missing")]
    MissingPropertyNames,
    #[error("property names must be a list of strings")]
    IllegalPropertyNames,
    #[error("persistable reference missing")]
    MissingReference,
}

/// One entry of the `meta` array, copied out of the record tree.
///
/// `index` is the entry's position in the array, used to write the canonical
/// reference back once its properties are converted.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaItem {
    pub index: usize,
    pub kind: MetaKind,
    pub property_names: Option<Value>,
    pub persistable_reference: Option<Value>,
    pub name: Option<String>,
}

impl MetaItem {
    /// Read a meta entry. Entries that are not objects, or that have no
    /// string `kind`, are reported as [`MetaKind::Other`].
    pub fn from_value(index: usize, value: &Value) -> Self {
        let kind = value
            .get(KIND_FIELD)
            .and_then(Value::as_str)
            .map_or_else(|| MetaKind::Other(String::new()), MetaKind::parse);
        Self {
            index,
            kind,
            property_names: non_null(value.get(PROPERTY_NAMES_FIELD)),
            persistable_reference: non_null(value.get(PERSISTABLE_REFERENCE_FIELD)),
            name: value
                .get(NAME_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    pub fn is_kind(&self, kind: &MetaKind) -> bool {
        &self.kind == kind
    }

    /// The property paths this entry applies to.
    pub fn property_names(&self) -> Result<Vec<String>, MetaError> {
        let Some(names) = &self.property_names else {
            return Err(MetaError::MissingPropertyNames);
        };
        let Value::Array(items) = names else {
            return Err(MetaError::IllegalPropertyNames);
        };
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or(MetaError::IllegalPropertyNames)
            })
            .collect()
    }

    pub fn persistable_reference(&self) -> Result<&Value, MetaError> {
        self.persistable_reference
            .as_ref()
            .ok_or(MetaError::MissingReference)
    }
}

fn non_null(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_is_case_insensitive() {
        assert_eq!(MetaKind::parse("UNIT"), MetaKind::Unit);
        assert_eq!(MetaKind::parse("DateTime"), MetaKind::DateTime);
        assert_eq!(MetaKind::parse("datetime"), MetaKind::DateTime);
        assert_eq!(MetaKind::parse("CRS"), MetaKind::Other("CRS".to_string()));
    }

    #[test]
    fn reads_all_fields() {
        let item = MetaItem::from_value(
            2,
            &json!({
                "kind": "Unit",
                "name": "ft",
                "propertyNames": ["MD", "TVD"],
                "persistableReference": "{}"
            }),
        );
        assert_eq!(item.index, 2);
        assert!(item.is_kind(&MetaKind::Unit));
        assert_eq!(item.name.as_deref(), Some("ft"));
        assert_eq!(
            item.property_names().unwrap(),
            vec!["MD".to_string(), "TVD".to_string()]
        );
        assert_eq!(item.persistable_reference().unwrap(), &json!("{}"));
    }

    #[test]
    fn null_fields_count_as_missing() {
        let item = MetaItem::from_value(
            0,
            &json!({"kind": "unit", "propertyNames": null, "persistableReference": null}),
        );
        assert_eq!(item.property_names(), Err(MetaError::MissingPropertyNames));
        assert_eq!(item.persistable_reference(), Err(MetaError::MissingReference));
    }

    #[test]
    fn property_names_must_be_strings() {
        let scalar = MetaItem::from_value(0, &json!({"kind": "unit", "propertyNames": "MD"}));
        assert_eq!(scalar.property_names(), Err(MetaError::IllegalPropertyNames));

        let mixed = MetaItem::from_value(0, &json!({"kind": "unit", "propertyNames": ["MD", 3]}));
        assert_eq!(mixed.property_names(), Err(MetaError::IllegalPropertyNames));
    }

    #[test]
    fn non_object_entries_are_ignored_kinds() {
        let item = MetaItem::from_value(0, &json!("unit"));
        assert!(matches!(item.kind, MetaKind::Other(_)));
    }
}
