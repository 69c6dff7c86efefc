//! CLI library components for the `georef` binary.

pub mod input;
pub mod logging;
pub mod report;
