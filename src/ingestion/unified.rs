//! Unified load entrypoint.
//!
//! Most callers should use [`load_from_path`], which reads one published sheet into a
//! [`crate::types::Dataset`].
//!
//! - If [`LoadOptions::format`] is `None`, the source format is inferred from the file extension.
//! - If [`LoadOptions::geo_class`] is `None`, the class is detected from the sheet's title row.
//! - If an [`super::observability::LoadObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::info;

use crate::error::{HpiError, HpiResult};
use crate::geo::GeoClass;
use crate::types::Dataset;

use super::grid::ingest_counting;
use super::observability::{LoadContext, LoadObserver, LoadSeverity, LoadStats};

/// Supported sheet sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// A sheet saved as comma-separated values.
    Csv,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Which worksheet of a workbook to read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SheetSelection {
    /// The first sheet (default). The published workbooks carry one sheet each.
    #[default]
    First,
    /// A single named sheet.
    Named(String),
}

/// Options controlling how a sheet is loaded.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoadOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<SourceFormat>,
    /// Workbook-specific options.
    pub sheet: SheetSelection,
    /// If `None`, detect the class from the title row.
    pub geo_class: Option<GeoClass>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("format", &self.format)
            .field("sheet", &self.sheet)
            .field("geo_class", &self.geo_class)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format: None,
            sheet: SheetSelection::default(),
            geo_class: None,
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

/// Load one published sheet from `path`.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with series/observation/skipped-row stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use house_price_index::ingestion::{load_from_path, LoadOptions};
///
/// # fn main() -> Result<(), house_price_index::HpiError> {
/// let metro = load_from_path("hpi_at_metro.csv", &LoadOptions::default())?;
/// println!("{} {}", metro.geo_class(), metro.index("10180", 20033)?);
/// # Ok(())
/// # }
/// ```
///
/// ```no_run
/// use std::sync::Arc;
///
/// use house_price_index::geo::GeoClass;
/// use house_price_index::ingestion::{load_from_path, LoadOptions, LoadSeverity, TracingObserver};
///
/// # fn main() -> Result<(), house_price_index::HpiError> {
/// let opts = LoadOptions {
///     geo_class: Some(GeoClass::State),
///     observer: Some(Arc::new(TracingObserver)),
///     alert_at_or_above: LoadSeverity::Error,
///     ..Default::default()
/// };
/// let states = load_from_path("hpi_at_state.xlsx", &opts)?;
/// println!("geos={}", states.len());
/// # Ok(())
/// # }
/// ```
pub fn load_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> HpiResult<Dataset> {
    let path = path.as_ref();
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let ctx = LoadContext {
        path: path.to_path_buf(),
        format: fmt,
    };

    let result = read_grid(path, fmt, &options.sheet)
        .and_then(|grid| ingest_counting(&grid, options.geo_class));

    match &result {
        Ok((ds, skipped)) => {
            info!(path = %path.display(), geo_class = %ds.geo_class(), series = ds.len(), "loaded");
            if let Some(obs) = options.observer.as_ref() {
                obs.on_success(
                    &ctx,
                    LoadStats {
                        geo_class: ds.geo_class(),
                        series: ds.len(),
                        observations: ds.observation_count(),
                        skipped_rows: *skipped,
                    },
                );
            }
        }
        Err(e) => {
            if let Some(obs) = options.observer.as_ref() {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result.map(|(ds, _)| ds)
}

/// Load several sheets in parallel, one [`Dataset`] per path.
///
/// Results come back in input order. Each sheet is built independently, so one failure does not
/// affect the others.
pub fn load_many<P>(paths: &[P], options: &LoadOptions) -> Vec<HpiResult<Dataset>>
where
    P: AsRef<Path> + Sync,
{
    info!(files = paths.len(), "loading sheets in parallel");
    paths
        .par_iter()
        .map(|p| load_from_path(p, options))
        .collect()
}

fn read_grid(path: &Path, fmt: SourceFormat, sheet: &SheetSelection) -> HpiResult<Vec<Vec<String>>> {
    match fmt {
        SourceFormat::Csv => super::csv::read_csv_grid(path),
        SourceFormat::Excel => read_excel_dispatch(path, sheet),
    }
}

fn severity_for_error(e: &HpiError) -> LoadSeverity {
    match e {
        HpiError::Io(_) => LoadSeverity::Critical,
        HpiError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => LoadSeverity::Critical,
            _ => LoadSeverity::Error,
        },
        #[cfg(feature = "excel")]
        HpiError::Excel(err) => {
            if error_chain_contains_io(err) {
                LoadSeverity::Critical
            } else {
                LoadSeverity::Error
            }
        }
        #[cfg(feature = "fetch")]
        HpiError::Http(_) => LoadSeverity::Critical,
        _ => LoadSeverity::Error,
    }
}

#[cfg_attr(not(feature = "excel"), allow(dead_code))]
fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

fn infer_format_from_path(path: &Path) -> HpiResult<SourceFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            HpiError::unreadable(format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ))
        })?;

    SourceFormat::from_extension(ext).ok_or_else(|| {
        HpiError::unreadable(format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ))
    })
}

fn read_excel_dispatch(path: &Path, sheet: &SheetSelection) -> HpiResult<Vec<Vec<String>>> {
    // Avoid unused warnings when the feature is off.
    let _ = (path, sheet);

    #[cfg(feature = "excel")]
    {
        use super::excel;

        match sheet {
            SheetSelection::First => excel::read_excel_grid(path, None),
            SheetSelection::Named(name) => excel::read_excel_grid(path, Some(name.as_str())),
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(HpiError::unreadable(
            "excel sources not enabled (enable cargo feature 'excel')",
        ))
    }
}

/// Convenience helper for callers that want an owned request object.
///
/// Useful for queueing loads in a job system.
#[derive(Clone)]
pub struct LoadRequest {
    /// Path to the sheet.
    pub path: PathBuf,
    /// Options controlling the load.
    pub options: LoadOptions,
}

impl fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRequest")
            .field("path", &self.path)
            .field("options", &self.options)
            .finish()
    }
}

impl LoadRequest {
    /// Execute the request by calling [`load_from_path`].
    pub fn run(&self) -> HpiResult<Dataset> {
        load_from_path(&self.path, &self.options)
    }
}
