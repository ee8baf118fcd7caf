//! Core data model: per-geography [`Series`] and the per-class [`Dataset`].
//!
//! A [`Series`] is one geography's index history, stored as parallel ascending date/value arrays.
//! A [`Dataset`] holds every series parsed from one sheet, keyed by geography code and kept in the
//! order the keys were first encountered.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{HpiError, HpiResult};
use crate::geo::GeoClass;
use crate::quarter::{self, YearQuarter};

/// Index history for a single geography (e.g. state `CA`, ZIP3 `837`, metro `10180`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesRecord", into = "SeriesRecord")]
pub struct Series {
    key: String,
    name: Option<String>,
    dates: Vec<YearQuarter>,
    values: Vec<f64>,
    anchor: Option<(YearQuarter, f64)>,
}

impl Series {
    /// Create a series from validated history.
    ///
    /// `dates` must be non-empty, the same length as `values`, and advance one quarter at a time.
    /// The final pair becomes the series' anchor (see [`Series::last`]).
    pub fn new(
        key: impl Into<String>,
        name: Option<String>,
        dates: Vec<YearQuarter>,
        values: Vec<f64>,
    ) -> HpiResult<Self> {
        let key = key.into();
        if dates.is_empty() || dates.len() != values.len() {
            return Err(HpiError::invalid_arguments(format!(
                "series '{key}': {} dates and {} values",
                dates.len(),
                values.len()
            )));
        }
        if !quarter::quarters_monotonic(&dates) {
            return Err(HpiError::invalid_arguments(format!(
                "series '{key}': dates don't increment by quarter"
            )));
        }

        let anchor = dates.last().copied().zip(values.last().copied());
        Ok(Self {
            key,
            name,
            dates,
            values,
            anchor,
        })
    }

    /// Create an empty series that ingestion fills row by row.
    pub(crate) fn empty(key: impl Into<String>, name: Option<String>) -> Self {
        Self {
            key: key.into(),
            name,
            dates: Vec::new(),
            values: Vec::new(),
            anchor: None,
        }
    }

    /// Add one ingested observation. Dates must strictly increase; gaps from skipped cells are
    /// allowed. Moves the anchor along with the data.
    pub(crate) fn push(&mut self, date: YearQuarter, value: f64) -> HpiResult<()> {
        if let Some(&last) = self.dates.last() {
            if date <= last {
                return Err(HpiError::DiscontinuousAppend {
                    geo: self.key.clone(),
                    message: format!("row date {date} does not follow {last}"),
                });
            }
        }
        self.dates.push(date);
        self.values.push(value);
        self.anchor = Some((date, value));
        Ok(())
    }

    /// Geography lookup key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display name, falling back to the key when the sheet has no area-name column.
    ///
    /// Only metro sheets carry names distinct from their codes.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }

    /// Area name from the sheet, if one was present.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn dates(&self) -> &[YearQuarter] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<YearQuarter> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<YearQuarter> {
        self.dates.last().copied()
    }

    /// Current final `(date, value)`, including appended data.
    pub fn latest(&self) -> Option<(YearQuarter, f64)> {
        self.dates.last().copied().zip(self.values.last().copied())
    }

    /// The `(date, value)` pair that was last on load. [`Series::append`] does not move it, so
    /// projections can always be measured against observed history.
    pub fn last(&self) -> Option<(YearQuarter, f64)> {
        self.anchor
    }

    /// Iterate `(date, value)` pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (YearQuarter, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Position of `date`, or of the latest earlier date when `date` falls in a gap.
    fn position(&self, date: YearQuarter) -> HpiResult<usize> {
        let (first, last) = match (self.dates.first(), self.dates.last()) {
            (Some(&f), Some(&l)) => (f, l),
            _ => {
                return Err(HpiError::invalid_arguments(format!(
                    "series '{}' has no observations",
                    self.key
                )));
            }
        };
        if date < first || date > last {
            return Err(HpiError::DateOutOfRange { date, first, last });
        }

        Ok(match self.dates.binary_search(&date) {
            Ok(i) => i,
            // `date > first`, so the insertion point is at least 1.
            Err(i) => i - 1,
        })
    }

    /// Index value at `date`.
    ///
    /// A date inside the stored range that has no observation returns the value at the nearest
    /// earlier date. Dates outside the range fail with [`HpiError::DateOutOfRange`].
    pub fn index(&self, date: YearQuarter) -> HpiResult<f64> {
        let i = self.position(date)?;
        Ok(self.values[i])
    }

    /// Ratio `index(end) / index(start)`; `1.328` means 32.8% cumulative appreciation.
    pub fn change(&self, start: YearQuarter, end: YearQuarter) -> HpiResult<f64> {
        let from = self.index(start)?;
        let to = self.index(end)?;
        Ok(to / from)
    }

    /// [`Series::change`] with calendar dates mapped to their quarters.
    pub fn change_dates(&self, start: NaiveDate, end: NaiveDate) -> HpiResult<f64> {
        self.change(quarter::to_year_quarter(start), quarter::to_year_quarter(end))
    }

    /// Append `dates`/`values` after the current last date.
    ///
    /// `dates[0]` must be exactly one quarter after the current last date (appended data included)
    /// and `dates` must itself advance a quarter at a time. On failure the series is unchanged.
    /// The anchor returned by [`Series::last`] is never moved.
    pub fn append(&mut self, dates: &[YearQuarter], values: &[f64]) -> HpiResult<()> {
        if dates.is_empty() || dates.len() != values.len() {
            return Err(HpiError::invalid_arguments(format!(
                "append to '{}': {} dates and {} values",
                self.key,
                dates.len(),
                values.len()
            )));
        }
        self.check_continues(dates)?;

        self.dates.extend_from_slice(dates);
        self.values.extend_from_slice(values);
        Ok(())
    }

    fn check_continues(&self, dates: &[YearQuarter]) -> HpiResult<()> {
        let discontinuous = |message: String| HpiError::DiscontinuousAppend {
            geo: self.key.clone(),
            message,
        };

        if let Some(last) = self.last_date() {
            if !quarter::follows(last, dates[0]) {
                return Err(discontinuous(format!(
                    "first appended date {} does not follow {last}",
                    dates[0]
                )));
            }
        }
        if !quarter::quarters_monotonic(dates) {
            return Err(discontinuous("appended dates don't increment by quarter".to_string()));
        }
        Ok(())
    }
}

/// Serialized form of a [`Series`]; converting back re-validates the invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SeriesRecord {
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    dates: Vec<YearQuarter>,
    values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anchor: Option<(YearQuarter, f64)>,
}

impl From<Series> for SeriesRecord {
    fn from(s: Series) -> Self {
        Self {
            key: s.key,
            name: s.name,
            dates: s.dates,
            values: s.values,
            anchor: s.anchor,
        }
    }
}

impl TryFrom<SeriesRecord> for Series {
    type Error = HpiError;

    fn try_from(r: SeriesRecord) -> Result<Self, Self::Error> {
        if r.dates.is_empty() || r.dates.len() != r.values.len() {
            return Err(HpiError::invalid_arguments(format!(
                "series '{}': {} dates and {} values",
                r.key,
                r.dates.len(),
                r.values.len()
            )));
        }
        if r.dates.windows(2).any(|w| w[1] <= w[0]) {
            return Err(HpiError::invalid_arguments(format!(
                "series '{}': dates are not strictly increasing",
                r.key
            )));
        }
        let anchor = match r.anchor {
            Some((date, value)) => {
                if !r.dates.contains(&date) {
                    return Err(HpiError::invalid_arguments(format!(
                        "series '{}': anchor date {date} is not a stored date",
                        r.key
                    )));
                }
                Some((date, value))
            }
            None => r.dates.last().copied().zip(r.values.last().copied()),
        };

        Ok(Self {
            key: r.key,
            name: r.name,
            dates: r.dates,
            values: r.values,
            anchor,
        })
    }
}

/// Every [`Series`] for one geography class.
///
/// Keys are unique. [`Dataset::geos`] returns them in first-encounter order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetRecord", into = "DatasetRecord")]
pub struct Dataset {
    geo_class: GeoClass,
    series: Vec<Series>,
    by_key: HashMap<String, usize>,
}

impl Dataset {
    /// Create a dataset from a supported class and series with unique keys.
    pub fn new(geo_class: GeoClass, series: Vec<Series>) -> HpiResult<Self> {
        let mut ds = Self::empty(geo_class)?;
        for s in series {
            if ds.by_key.contains_key(s.key()) {
                return Err(HpiError::invalid_arguments(format!(
                    "duplicate geo '{}' in {geo_class} dataset",
                    s.key()
                )));
            }
            ds.insert(s);
        }
        Ok(ds)
    }

    /// Create a dataset with no series.
    pub fn empty(geo_class: GeoClass) -> HpiResult<Self> {
        if !geo_class.is_supported() {
            return Err(HpiError::UnrecognizedGeographyClass {
                label: geo_class.label().to_string(),
            });
        }
        Ok(Self {
            geo_class,
            series: Vec::new(),
            by_key: HashMap::new(),
        })
    }

    fn insert(&mut self, series: Series) {
        self.by_key.insert(series.key().to_string(), self.series.len());
        self.series.push(series);
    }

    /// Ingestion: get the series for `key`, opening a new one on first sight.
    pub(crate) fn open_series(&mut self, key: &str, name: Option<&str>) -> &mut Series {
        let idx = match self.by_key.get(key) {
            Some(&idx) => idx,
            None => {
                self.insert(Series::empty(key, name.map(str::to_string)));
                self.series.len() - 1
            }
        };
        &mut self.series[idx]
    }

    /// Geography class shared by every series.
    pub fn geo_class(&self) -> GeoClass {
        self.geo_class
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total stored observations across all series.
    pub fn observation_count(&self) -> usize {
        self.series.iter().map(Series::len).sum()
    }

    /// Geography keys in first-encounter order.
    pub fn geos(&self) -> Vec<&str> {
        self.series.iter().map(Series::key).collect()
    }

    /// Iterate series in first-encounter order.
    pub fn series(&self) -> impl Iterator<Item = &Series> + '_ {
        self.series.iter()
    }

    /// `true` if any series carries an area name separate from its key.
    pub fn has_area_names(&self) -> bool {
        self.series.iter().any(|s| s.display_name().is_some())
    }

    /// Series stored under `geo` (e.g. `TX`).
    pub fn geo(&self, geo: &str) -> HpiResult<&Series> {
        self.by_key
            .get(geo)
            .map(|&i| &self.series[i])
            .ok_or_else(|| self.not_found(geo))
    }

    /// Mutable access, e.g. to append a forecast to one geography.
    pub fn geo_mut(&mut self, geo: &str) -> HpiResult<&mut Series> {
        match self.by_key.get(geo) {
            Some(&i) => Ok(&mut self.series[i]),
            None => Err(self.not_found(geo)),
        }
    }

    fn not_found(&self, geo: &str) -> HpiError {
        HpiError::GeoNotFound {
            geo: geo.to_string(),
            geo_class: self.geo_class.label().to_string(),
        }
    }

    /// Index for `geo` at `date`.
    pub fn index(&self, geo: &str, date: YearQuarter) -> HpiResult<f64> {
        self.geo(geo)?.index(date)
    }

    /// Ratio of the index for `geo` at `end` to `start`.
    pub fn change(&self, geo: &str, start: YearQuarter, end: YearQuarter) -> HpiResult<f64> {
        self.geo(geo)?.change(start, end)
    }

    /// [`Dataset::change`] with calendar dates.
    pub fn change_dates(&self, geo: &str, start: NaiveDate, end: NaiveDate) -> HpiResult<f64> {
        self.geo(geo)?.change_dates(start, end)
    }

    /// Anchor `(date, value)` for `geo`; unaffected by appends.
    pub fn last(&self, geo: &str) -> HpiResult<(YearQuarter, f64)> {
        let series = self.geo(geo)?;
        series.last().ok_or_else(|| self.not_found(geo))
    }

    /// Append `other`'s data to every series in `self`.
    ///
    /// Both datasets must share a class, and `other` must hold every key of `self` with dates that
    /// continue the corresponding series. All keys are checked before any series is touched, so a
    /// failure leaves `self` unchanged. Keys only present in `other` are ignored.
    pub fn append(&mut self, other: &Dataset) -> HpiResult<()> {
        if self.geo_class != other.geo_class {
            return Err(HpiError::invalid_arguments(format!(
                "cannot append {} data to {} data",
                other.geo_class, self.geo_class
            )));
        }

        let mut pending = Vec::with_capacity(self.series.len());
        for (i, s) in self.series.iter().enumerate() {
            let extra = other.geo(s.key())?;
            if extra.is_empty() {
                continue;
            }
            s.check_continues(extra.dates())?;
            pending.push((i, extra));
        }

        for (i, extra) in pending {
            let series = &mut self.series[i];
            series.dates.extend_from_slice(extra.dates());
            series.values.extend_from_slice(extra.values());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DatasetRecord {
    geo_class: GeoClass,
    series: Vec<Series>,
}

impl From<Dataset> for DatasetRecord {
    fn from(d: Dataset) -> Self {
        Self {
            geo_class: d.geo_class,
            series: d.series,
        }
    }
}

impl TryFrom<DatasetRecord> for Dataset {
    type Error = HpiError;

    fn try_from(r: DatasetRecord) -> Result<Self, Self::Error> {
        Dataset::new(r.geo_class, r.series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_series(key: &str) -> Series {
        Series::new(
            key,
            None,
            vec![20194, 20201, 20202, 20203, 20204],
            vec![100.0, 102.0, 104.0, 106.0, 110.0],
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_mismatched_or_empty_input() {
        let err = Series::new("CA", None, vec![20201, 20202], vec![1.0]).unwrap_err();
        assert!(matches!(err, HpiError::InvalidArguments { .. }));
        assert!(Series::new("CA", None, vec![], vec![]).is_err());
    }

    #[test]
    fn new_rejects_non_quarterly_dates() {
        let err = Series::new("CA", None, vec![20201, 20203], vec![1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("don't increment by quarter"));
    }

    #[test]
    fn index_exact_and_boundaries() {
        let s = state_series("CA");
        assert_eq!(s.index(20194).unwrap(), 100.0);
        assert_eq!(s.index(20204).unwrap(), 110.0);

        let err = s.index(20193).unwrap_err();
        assert!(matches!(
            err,
            HpiError::DateOutOfRange { date: 20193, first: 20194, last: 20204 }
        ));
        assert!(matches!(s.index(20211).unwrap_err(), HpiError::DateOutOfRange { .. }));
    }

    #[test]
    fn index_is_repeatable() {
        let s = state_series("CA");
        let a = s.index(20202).unwrap();
        let b = s.index(20202).unwrap();
        assert_eq!(a, b);
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn index_carries_forward_across_gaps() {
        let mut s = Series::empty("837", None);
        s.push(20201, 100.0).unwrap();
        s.push(20204, 120.0).unwrap();
        assert_eq!(s.index(20202).unwrap(), 100.0);
        assert_eq!(s.index(20203).unwrap(), 100.0);
        assert_eq!(s.index(20204).unwrap(), 120.0);
    }

    #[test]
    fn push_rejects_non_increasing_dates() {
        let mut s = Series::empty("837", None);
        s.push(20201, 100.0).unwrap();
        let err = s.push(20201, 101.0).unwrap_err();
        assert!(matches!(err, HpiError::DiscontinuousAppend { .. }));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn change_is_ratio_and_propagates_range_errors() {
        let s = state_series("CA");
        assert!((s.change(20201, 20204).unwrap() - 110.0 / 102.0).abs() < 1e-12);
        assert!(s.change(20191, 20204).is_err());
        assert!(s.change(20201, 20221).is_err());

        let start = NaiveDate::from_ymd_opt(2020, 2, 14).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        assert!((s.change_dates(start, end).unwrap() - 110.0 / 102.0).abs() < 1e-12);
    }

    #[test]
    fn append_extends_without_moving_anchor() {
        let mut s = state_series("CA");
        s.append(&[20211, 20212], &[111.0, 112.0]).unwrap();

        assert_eq!(s.index(20212).unwrap(), 112.0);
        assert_eq!(s.last(), Some((20204, 110.0)));
        assert_eq!(s.latest(), Some((20212, 112.0)));

        // continuity is checked against the appended tail, not the anchor
        s.append(&[20213], &[113.0]).unwrap();
        let err = s.append(&[20211], &[1.0]).unwrap_err();
        assert!(matches!(err, HpiError::DiscontinuousAppend { .. }));
    }

    #[test]
    fn failed_append_leaves_series_unchanged() {
        let mut s = state_series("CA");
        let before = s.clone();

        let err = s.append(&[20212, 20213], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, HpiError::DiscontinuousAppend { .. }));
        // one quarter *before* the last date must not pass either
        assert!(s.append(&[20203], &[1.0]).is_err());
        assert!(s.append(&[20211, 20213], &[1.0, 2.0]).is_err());
        assert!(matches!(
            s.append(&[20211], &[1.0, 2.0]).unwrap_err(),
            HpiError::InvalidArguments { .. }
        ));
        assert_eq!(s, before);
    }

    #[test]
    fn clone_is_independent() {
        let original = state_series("CA");
        let mut branch = original.clone();
        branch.append(&[20211], &[150.0]).unwrap();
        assert_eq!(original.len(), 5);
        assert!(original.index(20211).is_err());
        assert_eq!(branch.index(20211).unwrap(), 150.0);
    }

    #[test]
    fn dataset_rejects_unknown_class_and_duplicates() {
        let err = Dataset::new(GeoClass::Unknown, vec![]).unwrap_err();
        assert!(matches!(err, HpiError::UnrecognizedGeographyClass { .. }));

        let err = Dataset::new(GeoClass::State, vec![state_series("CA"), state_series("CA")]).unwrap_err();
        assert!(matches!(err, HpiError::InvalidArguments { .. }));
    }

    #[test]
    fn dataset_delegates_to_series() {
        let ds = Dataset::new(GeoClass::State, vec![state_series("TX"), state_series("AK")]).unwrap();
        assert_eq!(ds.geos(), vec!["TX", "AK"]);
        assert_eq!(ds.index("AK", 20202).unwrap(), 104.0);
        assert_eq!(ds.last("TX").unwrap(), (20204, 110.0));
        assert_eq!(ds.observation_count(), 10);
        assert!(!ds.has_area_names());

        let err = ds.index("ZZ", 20202).unwrap_err();
        assert!(matches!(err, HpiError::GeoNotFound { ref geo, .. } if geo == "ZZ"));
    }

    #[test]
    fn dataset_append_requires_matching_class_and_keys() {
        let mut ds = Dataset::new(GeoClass::State, vec![state_series("TX"), state_series("AK")]).unwrap();
        let extra_tx = Series::new("TX", None, vec![20211], vec![111.0]).unwrap();
        let extra_ak = Series::new("AK", None, vec![20211], vec![99.0]).unwrap();

        let wrong_class = Dataset::new(GeoClass::Pr, vec![extra_tx.clone(), extra_ak.clone()]).unwrap();
        assert!(ds.append(&wrong_class).is_err());

        let missing = Dataset::new(GeoClass::State, vec![extra_tx.clone()]).unwrap();
        let before = ds.clone();
        let err = ds.append(&missing).unwrap_err();
        assert!(matches!(err, HpiError::GeoNotFound { ref geo, .. } if geo == "AK"));
        assert_eq!(ds, before);

        let ok = Dataset::new(GeoClass::State, vec![extra_ak, extra_tx]).unwrap();
        ds.append(&ok).unwrap();
        assert_eq!(ds.index("TX", 20211).unwrap(), 111.0);
        assert_eq!(ds.index("AK", 20211).unwrap(), 99.0);
        assert_eq!(ds.last("AK").unwrap(), (20204, 110.0));
    }

    #[test]
    fn dataset_append_is_all_or_nothing_on_discontinuity() {
        let mut ds = Dataset::new(GeoClass::State, vec![state_series("TX"), state_series("AK")]).unwrap();
        let other = Dataset::new(
            GeoClass::State,
            vec![
                Series::new("TX", None, vec![20211], vec![111.0]).unwrap(),
                Series::new("AK", None, vec![20212], vec![99.0]).unwrap(),
            ],
        )
        .unwrap();
        let before = ds.clone();
        assert!(matches!(ds.append(&other).unwrap_err(), HpiError::DiscontinuousAppend { .. }));
        assert_eq!(ds, before);
    }
}
