use house_price_index::geo::GeoClass;
use house_price_index::ingestion::csv::{read_csv_grid, read_csv_grid_from_reader, reader_builder};
use house_price_index::ingestion::{ingest_grid, load_from_path, LoadOptions};
use house_price_index::quarter::to_year_quarter;
use house_price_index::HpiError;

use chrono::NaiveDate;

#[test]
fn metro_sheet_point_lookup() {
    let ds = load_from_path("tests/fixtures/hpi_at_metro.csv", &LoadOptions::default()).unwrap();

    assert_eq!(ds.geo_class(), GeoClass::Metro);
    assert_eq!(ds.geos(), vec!["10180", "14260"]);

    let dt = to_year_quarter(NaiveDate::from_ymd_opt(2003, 7, 17).unwrap());
    assert_eq!(dt, 20033);
    assert_eq!(ds.index("10180", dt).unwrap(), 128.06);
    assert_eq!(ds.geo("10180").unwrap().name(), "Abilene, TX");
}

#[test]
fn metro_sheet_change_is_ratio_of_lookups() {
    let ds = load_from_path("tests/fixtures/hpi_at_metro.csv", &LoadOptions::default()).unwrap();

    let c = ds.change("10180", 20201, 20222).unwrap();
    let expected = ds.index("10180", 20222).unwrap() / ds.index("10180", 20201).unwrap();
    assert_eq!(c, expected);
    assert!((c - 1.328).abs() < 0.001, "{c}");

    let start = NaiveDate::from_ymd_opt(2020, 3, 31).unwrap();
    let end = NaiveDate::from_ymd_opt(2022, 5, 1).unwrap();
    assert_eq!(ds.change_dates("10180", start, end).unwrap(), c);
}

#[test]
fn leading_missing_values_start_series_later() {
    let ds = load_from_path("tests/fixtures/hpi_at_metro.csv", &LoadOptions::default()).unwrap();
    let boise = ds.geo("14260").unwrap();

    assert_eq!(boise.first_date(), Some(20024));
    let err = ds.index("14260", 20023).unwrap_err();
    assert!(matches!(err, HpiError::DateOutOfRange { date: 20023, first: 20024, .. }));
}

#[test]
fn lookup_boundaries_on_loaded_series() {
    let ds = load_from_path("tests/fixtures/hpi_at_state.csv", &LoadOptions::default()).unwrap();
    let ca = ds.geo("CA").unwrap();
    let (first, last) = (ca.first_date().unwrap(), ca.last_date().unwrap());

    assert_eq!((first, last), (20021, 20251));
    assert!(matches!(ca.index(20014).unwrap_err(), HpiError::DateOutOfRange { .. }));
    assert_eq!(ca.index(last).unwrap(), *ca.values().last().unwrap());
    assert_eq!(ca.index(20033).unwrap(), 176.88);
}

#[test]
fn state_sheet_change() {
    let ds = load_from_path("tests/fixtures/hpi_at_state.csv", &LoadOptions::default()).unwrap();
    assert_eq!(ds.geo_class(), GeoClass::State);
    assert!((ds.change("AR", 20201, 20222).unwrap() - 1.35).abs() < 1e-12);
}

#[test]
fn territory_gap_carries_forward() {
    let ds = load_from_path("tests/fixtures/hpi_at_pr.csv", &LoadOptions::default()).unwrap();
    assert_eq!(ds.geo_class(), GeoClass::Pr);
    assert_eq!(ds.index("PR", 20033).unwrap(), 180.56);
    assert_eq!(ds.index("PR", 20153).unwrap(), ds.index("PR", 20152).unwrap());
}

#[test]
fn zip3_sheet_keeps_leading_zero_keys() {
    let ds = load_from_path("tests/fixtures/hpi_at_3zip.csv", &LoadOptions::default()).unwrap();
    assert_eq!(ds.geo_class(), GeoClass::Zip3);
    assert_eq!(ds.geos(), vec!["010", "837"]);
    assert!(ds.geo("10").is_err());

    assert_eq!(ds.index("010", 20033).unwrap(), 159.23);
    assert!((ds.change("010", 20201, 20222).unwrap() - 335.83 / 307.06).abs() < 1e-12);
    // 2010-Q2 is blank for 837
    assert_eq!(ds.index("837", 20102).unwrap(), 209.34);
    assert_eq!(ds.index("837", 20103).unwrap(), 215.67);
    assert_eq!(ds.geo("837").unwrap().last(), Some((20251, 511.47)));
}

#[test]
fn us_and_census_sheet_lookup() {
    let ds = load_from_path("tests/fixtures/hpi_at_us_and_census.csv", &LoadOptions::default()).unwrap();
    assert_eq!(ds.geo_class(), GeoClass::Us);
    assert_eq!(ds.geos(), vec!["USA", "DV_PAC"]);
    assert_eq!(ds.index("USA", 20033).unwrap(), 214.84);
    assert_eq!(ds.index("DV_PAC", 20251).unwrap(), 790.52);
    assert!(!ds.has_area_names());
}

#[test]
fn manufactured_homes_sheet_lookup() {
    let ds = load_from_path("tests/fixtures/hpi_at_mh.csv", &LoadOptions::default()).unwrap();
    assert_eq!(ds.geo_class(), GeoClass::Mh);
    assert_eq!(ds.len(), 1);
    assert_eq!(ds.index("USA", 20033).unwrap(), 106.78);
    assert_eq!(ds.last("USA").unwrap(), (20251, 273.59));
    assert!(matches!(ds.index("USA", 20252).unwrap_err(), HpiError::DateOutOfRange { .. }));
}

#[test]
fn geo_class_is_detected_per_sheet() {
    let cases = [
        ("tests/fixtures/hpi_at_metro.csv", GeoClass::Metro),
        ("tests/fixtures/hpi_at_nonmetro.csv", GeoClass::NonMetro),
        ("tests/fixtures/hpi_at_state.csv", GeoClass::State),
        ("tests/fixtures/hpi_at_pr.csv", GeoClass::Pr),
        ("tests/fixtures/hpi_at_3zip.csv", GeoClass::Zip3),
        ("tests/fixtures/hpi_at_us_and_census.csv", GeoClass::Us),
        ("tests/fixtures/hpi_at_mh.csv", GeoClass::Mh),
    ];
    for (path, expected) in cases {
        let grid = read_csv_grid(path).unwrap();
        assert_eq!(ingest_grid(&grid).unwrap().geo_class(), expected, "{path}");
    }
}

#[test]
fn class_override_skips_detection() {
    let input = "Quarterly index extract\nState,Year,Quarter,Index\nVT,2024,4,410.00\nVT,2025,1,412.50\n";
    let mut rdr = reader_builder().from_reader(input.as_bytes());
    let grid = read_csv_grid_from_reader(&mut rdr).unwrap();

    let err = ingest_grid(&grid).unwrap_err();
    assert!(matches!(err, HpiError::UnrecognizedGeographyClass { .. }));

    let ds = house_price_index::ingestion::ingest_grid_as(&grid, GeoClass::State).unwrap();
    assert_eq!(ds.index("VT", 20251).unwrap(), 412.5);
}
