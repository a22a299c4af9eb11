//! Report decoding error types

use thiserror::Error;

/// Errors that can occur while classifying or decoding a report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Buffer is shorter than the field or layout being read requires
    #[error("Malformed report: need {needed} bytes, got {actual}")]
    Malformed { needed: usize, actual: usize },

    /// Dispatch table or layout is not usable (e.g. bit index above 7)
    #[error("Invalid report layout: {0}")]
    InvalidLayout(String),
}
