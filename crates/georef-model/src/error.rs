use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Short name of a JSON value's type, used in error messages.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
