//! Per-record conversion status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of converting one record.
///
/// Statuses merge with a fixed precedence: `Error` dominates `Success`, which
/// dominates `NoFrameOfReference`. A record therefore only reports
/// `NoFrameOfReference` when no pass found anything to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionStatus {
    /// Every applicable property was converted (or nothing needed converting).
    Success,
    /// At least one diagnostic was recorded.
    Error,
    /// The record carries no frame-of-reference metadata.
    NoFrameOfReference,
}

impl ConversionStatus {
    fn rank(self) -> u8 {
        match self {
            Self::NoFrameOfReference => 0,
            Self::Success => 1,
            Self::Error => 2,
        }
    }

    /// Combine two statuses, keeping the dominant one.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            Self::NoFrameOfReference => "NO_FRAME_OF_REFERENCE",
        }
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
