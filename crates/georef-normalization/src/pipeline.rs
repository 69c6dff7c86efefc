//! Batch normalization: unit pass then date/time pass, per record.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, info_span};

use georef_model::{ConversionRecord, ConversionStatus};

use crate::datetime::convert_dates;
use crate::unit::convert_units;

/// Which passes to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationOptions {
    pub units: bool,
    pub dates: bool,
}

impl Default for NormalizationOptions {
    fn default() -> Self {
        Self {
            units: true,
            dates: true,
        }
    }
}

impl NormalizationOptions {
    #[must_use]
    pub fn with_units(mut self, enable: bool) -> Self {
        self.units = enable;
        self
    }

    #[must_use]
    pub fn with_dates(mut self, enable: bool) -> Self {
        self.dates = enable;
        self
    }
}

/// Run the enabled passes over one record.
///
/// Both passes share the record's diagnostics, so the final status is the
/// dominant status of the two.
pub fn normalize_record(record: &mut ConversionRecord, options: NormalizationOptions) {
    if options.units {
        convert_units(record);
    }
    if options.dates {
        convert_dates(record);
    }
}

/// Status counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub error: usize,
    pub no_frame_of_reference: usize,
}

impl BatchSummary {
    pub fn from_records(records: &[ConversionRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };
        for record in records {
            match record.status() {
                ConversionStatus::Success => summary.success += 1,
                ConversionStatus::Error => summary.error += 1,
                ConversionStatus::NoFrameOfReference => summary.no_frame_of_reference += 1,
            }
        }
        summary
    }

    pub fn has_errors(&self) -> bool {
        self.error > 0
    }
}

/// Normalize a batch of record trees, in order.
pub fn normalize_records(
    records: impl IntoIterator<Item = Value>,
    options: NormalizationOptions,
) -> Vec<ConversionRecord> {
    let span = info_span!("normalize", units = options.units, dates = options.dates);
    let _guard = span.enter();
    let converted: Vec<ConversionRecord> = records
        .into_iter()
        .map(|tree| {
            let mut record = ConversionRecord::new(tree);
            normalize_record(&mut record, options);
            record
        })
        .collect();
    let summary = BatchSummary::from_records(&converted);
    info!(
        total = summary.total,
        success = summary.success,
        error = summary.error,
        no_frame_of_reference = summary.no_frame_of_reference,
        "Normalized records"
    );
    converted
}
