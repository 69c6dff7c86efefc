use std::path::PathBuf;

use anyhow::Result;
use serde_json::Value;
use tracing::{info, info_span, warn};

use georef_cli::input::{read_geojson, read_records, write_json};
use georef_cli::report::{InspectReport, RecordRow};
use georef_geometry::CrsVariant;
use georef_model::ConversionRecord;
use georef_normalization::{BatchSummary, NormalizationOptions, normalize_records};

use crate::cli::{InspectArgs, NormalizeArgs};

pub struct NormalizeResult {
    pub rows: Vec<RecordRow>,
    pub summary: BatchSummary,
    pub output: Option<PathBuf>,
}

pub fn run_normalize(args: &NormalizeArgs) -> Result<NormalizeResult> {
    let span = info_span!("normalize_file", input = %args.input.display());
    let _guard = span.enter();

    let records = read_records(&args.input)?;
    let options = NormalizationOptions::default()
        .with_units(!args.no_units)
        .with_dates(!args.no_dates);
    let converted = normalize_records(records, options);

    let summary = BatchSummary::from_records(&converted);
    let rows: Vec<RecordRow> = converted
        .iter()
        .enumerate()
        .map(|(position, record)| RecordRow::from_record(position, record))
        .collect();
    for row in rows.iter().filter(|row| row.status.is_error()) {
        warn!(
            record = %row.label,
            errors = row.messages.len(),
            "Record has conversion errors"
        );
    }

    let normalized: Vec<Value> = converted
        .into_iter()
        .map(ConversionRecord::into_record)
        .collect();
    write_json(&normalized, args.output.as_deref())?;

    Ok(NormalizeResult {
        rows,
        summary,
        output: args.output.clone(),
    })
}

pub fn run_inspect(args: &InspectArgs) -> Result<InspectReport> {
    let mut geojson = read_geojson(&args.input)?;
    if let Some(variant) = args.retag {
        let variant = CrsVariant::from(variant);
        geojson.set_variant(variant);
        write_json(&geojson, args.output.as_deref())?;
        info!(tag = %geojson.tag(), "Retagged document");
    }
    Ok(InspectReport::from_geojson(&geojson))
}
