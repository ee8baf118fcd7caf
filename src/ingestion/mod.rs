//! Sheet loading: from a file (or an already-extracted grid) to a [`crate::types::Dataset`].
//!
//! Most callers should use [`load_from_path`] (from [`unified`]) which:
//!
//! - auto-detects CSV vs. workbook by file extension (or you can override via [`LoadOptions`])
//! - detects the geography class from the sheet title
//! - optionally reports success/failure/alerts to a [`LoadObserver`]
//!
//! Callers that extract cells themselves can go straight to [`grid::ingest_grid`].

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod grid;
pub mod observability;
pub mod unified;

pub use grid::{ingest_grid, ingest_grid_as, normalize_rows, HpiRow, NormalizedRows, SheetLayout};
pub use observability::{
    CompositeObserver, FileObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats, TracingObserver,
};
pub use unified::{load_from_path, load_many, LoadOptions, LoadRequest, SheetSelection, SourceFormat};
