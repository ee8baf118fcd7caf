use thiserror::Error;

use crate::quarter::YearQuarter;

/// Convenience result type used across the crate.
pub type HpiResult<T> = Result<T, HpiError>;

/// Error type returned by quarter conversion, series/dataset operations and loading.
///
/// Domain failures are all recoverable. Malformed cells during ingestion are not errors: they are
/// skipped as gaps in the published series.
#[derive(Debug, Error)]
pub enum HpiError {
    /// A year-quarter code outside years 1960..=2060 or quarters 1..=4.
    #[error("invalid year-quarter code {code}")]
    InvalidDate { code: YearQuarter },

    /// A lookup date before the first or after the last stored date.
    #[error("date {date} outside stored range {first}..={last}")]
    DateOutOfRange {
        date: YearQuarter,
        first: YearQuarter,
        last: YearQuarter,
    },

    /// Appended dates do not continue the series one quarter at a time.
    #[error("discontinuous append for '{geo}': {message}")]
    DiscontinuousAppend { geo: String, message: String },

    /// No series is stored under the requested geography key.
    #[error("geo '{geo}' not found in {geo_class} data")]
    GeoNotFound { geo: String, geo_class: String },

    /// Mismatched or empty argument arrays.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// A geography-class label outside the seven supported classes.
    #[error("unrecognized geography class '{label}'")]
    UnrecognizedGeographyClass { label: String },

    /// Every candidate in a best-match cascade failed.
    #[error("no dataset has a value at {date} for keys {keys:?}")]
    NoMatch { date: YearQuarter, keys: Vec<String> },

    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read or write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON snapshot error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "excel")]
    /// Workbook error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[cfg(feature = "fetch")]
    /// Download error (feature-gated behind `fetch`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The source could not be read as a sheet (unknown extension, empty workbook, disabled feature).
    #[error("source error: {message}")]
    Source { message: String },
}

impl HpiError {
    pub(crate) fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }

    pub(crate) fn unreadable(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }
}
