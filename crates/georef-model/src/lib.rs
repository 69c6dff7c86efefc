//! Data model for frame-of-reference normalization.
//!
//! - **record**: [`ConversionRecord`], the record tree plus its diagnostics
//! - **status**: the tri-state [`ConversionStatus`]
//! - **meta**: typed view over `meta` entries ([`MetaItem`])
//! - **redact**: the switch keeping record values out of logs

pub mod error;
pub mod meta;
pub mod record;
pub mod redact;
pub mod status;

pub use error::{ModelError, Result};
pub use meta::{MetaError, MetaItem, MetaKind};
pub use record::{ConversionRecord, ConversionSummary};
pub use redact::redact_value;
pub use status::ConversionStatus;
