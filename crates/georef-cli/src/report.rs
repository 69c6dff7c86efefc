//! Summaries shown by the CLI.

use std::collections::BTreeMap;

use serde::Serialize;

use georef_geometry::GeoJson;
use georef_model::{ConversionRecord, ConversionStatus};

/// Outcome of one normalized record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordRow {
    /// Record id, or its position in the batch when it has none.
    pub label: String,
    pub status: ConversionStatus,
    pub messages: Vec<String>,
}

impl RecordRow {
    pub fn from_record(position: usize, record: &ConversionRecord) -> Self {
        Self {
            label: record
                .id()
                .map_or_else(|| format!("#{position}"), str::to_string),
            status: record.status(),
            messages: record.messages().to_vec(),
        }
    }
}

/// Structural facts about a GeoJSON document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub tag: String,
    pub valid: bool,
    pub dimension: usize,
    pub tuples: usize,
    pub bbox: Option<Vec<f64>>,
    /// Node count per type tag.
    pub nodes: BTreeMap<String, usize>,
}

impl InspectReport {
    /// Inspect a document without touching its caches.
    pub fn from_geojson(geojson: &GeoJson) -> Self {
        let mut probe = geojson.clone();
        let valid = probe.is_valid();
        probe.update_bbox();
        let mut nodes = BTreeMap::new();
        for node in probe.flatten() {
            *nodes.entry(node.tag()).or_insert(0) += 1;
        }
        Self {
            tag: probe.tag(),
            valid,
            dimension: probe.dimension(),
            tuples: probe.len(),
            bbox: probe.bbox().map(<[f64]>::to_vec),
            nodes,
        }
    }
}
