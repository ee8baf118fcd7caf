//! Load outcome reporting.
//!
//! [`super::load_from_path`] reports every attempt to an optional [`LoadObserver`]. Two sinks ship
//! with the crate: [`TracingObserver`] forwards outcomes as `tracing` events, and [`FileObserver`]
//! appends one line per outcome to a log file. [`CompositeObserver`] fans out to several.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{error, info, warn};

use crate::error::HpiError;
use crate::geo::GeoClass;

use super::unified::SourceFormat;

/// How bad a failed load is. Ordered, so thresholds compare with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    Info,
    Warning,
    /// The sheet could not be turned into a dataset (unknown class, malformed layout, ...).
    Error,
    /// The source itself was unreachable: file I/O or download failures.
    Critical,
}

/// Which sheet a report is about.
#[derive(Debug, Clone)]
pub struct LoadContext {
    pub path: PathBuf,
    pub format: SourceFormat,
}

impl fmt::Display for LoadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "format={:?} path={}", self.format, self.path.display())
    }
}

/// Shape of a successfully loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub geo_class: GeoClass,
    /// Number of geographies.
    pub series: usize,
    /// Stored (date, value) pairs across all series.
    pub observations: usize,
    /// Data rows skipped for missing or malformed cells.
    pub skipped_rows: usize,
}

impl fmt::Display for LoadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "class={} series={} obs={} skipped={}",
            self.geo_class, self.series, self.observations, self.skipped_rows
        )
    }
}

/// Receives load outcomes. All methods default to no-ops except `on_alert`.
pub trait LoadObserver: Send + Sync {
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &HpiError) {}

    /// Called after `on_failure` when the severity meets the configured threshold.
    ///
    /// Defaults to forwarding to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &HpiError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Forwards every callback to each wrapped observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.observers.iter().for_each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &HpiError) {
        self.observers.iter().for_each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &HpiError) {
        self.observers.iter().for_each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Emits outcomes as `tracing` events: successes at `info`, failures at `warn` (or `error` for
/// [`LoadSeverity::Critical`]), alerts at `error` with `alert = true`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        info!(
            path = %ctx.path.display(),
            geo_class = %stats.geo_class,
            series = stats.series,
            observations = stats.observations,
            skipped_rows = stats.skipped_rows,
            "sheet loaded"
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &HpiError) {
        if severity >= LoadSeverity::Critical {
            error!(path = %ctx.path.display(), ?severity, %error, "sheet load failed");
        } else {
            warn!(path = %ctx.path.display(), ?severity, %error, "sheet load failed");
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &HpiError) {
        error!(path = %ctx.path.display(), ?severity, %error, alert = true, "sheet load alert");
    }
}

/// Appends one line per outcome to a log file.
///
/// Writes are best-effort; a log file that cannot be opened or written is ignored.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: fmt::Arguments<'_>) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {line}", unix_ts());
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.append_line(format_args!("ok {ctx} {stats}"));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &HpiError) {
        self.append_line(format_args!("fail severity={severity:?} {ctx} err={error}"));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &HpiError) {
        self.append_line(format_args!("ALERT severity={severity:?} {ctx} err={error}"));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
