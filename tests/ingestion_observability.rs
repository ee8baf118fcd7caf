use std::sync::{Arc, Mutex};

use house_price_index::geo::GeoClass;
use house_price_index::ingestion::{
    load_from_path, CompositeObserver, FileObserver, LoadContext, LoadObserver, LoadOptions, LoadSeverity, LoadStats,
    SourceFormat,
};
use house_price_index::HpiError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<LoadStats>>,
    failures: Mutex<Vec<LoadSeverity>>,
    alerts: Mutex<Vec<LoadSeverity>>,
}

impl LoadObserver for RecordingObserver {
    fn on_success(&self, _ctx: &LoadContext, stats: LoadStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &HpiError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &HpiError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn options(obs: Arc<RecordingObserver>, alert_at_or_above: LoadSeverity) -> LoadOptions {
    LoadOptions {
        format: Some(SourceFormat::Csv),
        observer: Some(obs),
        alert_at_or_above,
        ..Default::default()
    }
}

#[test]
fn observer_receives_stats_on_success() {
    let obs = Arc::new(RecordingObserver::default());
    load_from_path("tests/fixtures/hpi_at_metro.csv", &options(obs.clone(), LoadSeverity::Critical)).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![LoadStats {
            geo_class: GeoClass::Metro,
            series: 2,
            observations: 93 + 90,
            skipped_rows: 3,
        }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());

    // Missing file -> Io error -> Critical
    let _ = load_from_path(
        "tests/fixtures/does_not_exist.csv",
        &options(obs.clone(), LoadSeverity::Critical),
    )
    .unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![LoadSeverity::Critical]);
    assert_eq!(alerts, vec![LoadSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let path = std::env::temp_dir().join(format!(
        "house-price-index-untitled-{}.csv",
        std::process::id()
    ));
    std::fs::write(&path, "Quarterly extract\nState,Year,Quarter,Index\nVT,2025,1,412.50\n").unwrap();

    // Unrecognized title -> Error, below the Critical alert threshold
    let err = load_from_path(&path, &options(obs.clone(), LoadSeverity::Critical)).unwrap_err();
    assert!(matches!(err, HpiError::UnrecognizedGeographyClass { .. }));

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![LoadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn composite_fans_out_and_file_observer_appends() {
    let recording = Arc::new(RecordingObserver::default());
    let log_path = std::env::temp_dir().join(format!(
        "house-price-index-observer-{}.log",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&log_path);

    let composite = CompositeObserver::new(vec![recording.clone(), Arc::new(FileObserver::new(&log_path))]);
    let opts = LoadOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };
    load_from_path("tests/fixtures/hpi_at_pr.csv", &opts).unwrap();

    assert_eq!(recording.successes.lock().unwrap().len(), 1);
    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains(" ok format=Csv"));
    assert!(log.contains("class=pr"));

    let _ = std::fs::remove_file(&log_path);
}
