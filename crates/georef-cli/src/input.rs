//! Reading record batches and GeoJSON documents, writing JSON output.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use georef_geometry::GeoJson;
use georef_model::error::json_type_name;

/// Split a JSON document into records: an array holds one record per
/// element, a single object is one record.
pub fn parse_records(text: &str) -> Result<Vec<Value>> {
    let document: Value = serde_json::from_str(text).context("parse records")?;
    match document {
        Value::Array(records) => Ok(records),
        record @ Value::Object(_) => Ok(vec![record]),
        other => bail!(
            "expected a JSON array or object of records, found {}",
            json_type_name(&other)
        ),
    }
}

pub fn read_records(path: &Path) -> Result<Vec<Value>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let records = parse_records(&text).with_context(|| format!("load {}", path.display()))?;
    debug!(path = %path.display(), records = records.len(), "Loaded records");
    Ok(records)
}

pub fn read_geojson(path: &Path) -> Result<GeoJson> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    text.parse::<GeoJson>()
        .with_context(|| format!("parse GeoJSON {}", path.display()))
}

/// Write pretty JSON to `output`, or stdout when no path is given.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value).context("serialize output")?;
    text.push('\n');
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("write to stdout")?;
            stdout.flush().context("flush stdout")?;
        }
    }
    Ok(())
}
