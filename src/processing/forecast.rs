//! Growth projections appended after the observed history.

use crate::error::{HpiError, HpiResult};
use crate::quarter::{self, YearQuarter};
use crate::types::{Dataset, Series};

/// Project `quarters` values past the series' anchor at a constant annual growth rate.
///
/// Each quarter compounds by `(1 + annual_growth)^(1/4)`, so four quarters at `0.05` end 5% above
/// the anchor value. Returns empty vectors when `quarters == 0`. Fails with
/// [`HpiError::InvalidArguments`] if the projection would run past the last quarter of
/// [`quarter::MAX_YEAR`].
pub fn project(series: &Series, quarters: usize, annual_growth: f64) -> HpiResult<(Vec<YearQuarter>, Vec<f64>)> {
    let (mut date, mut value) = series.last().ok_or_else(|| {
        HpiError::invalid_arguments(format!("series '{}' has no observations", series.key()))
    })?;
    if !quarter::is_valid(date) {
        return Err(HpiError::InvalidDate { code: date });
    }
    let horizon = quarter::from_parts(quarter::MAX_YEAR, 4);
    let room = quarter::quarter_difference(date, horizon) as usize;
    if quarters > room {
        return Err(HpiError::invalid_arguments(format!(
            "cannot project {quarters} quarters past {date}: at most {room} fit before {horizon}"
        )));
    }
    let factor = (1.0 + annual_growth).powf(0.25);

    let mut dates = Vec::with_capacity(quarters);
    let mut values = Vec::with_capacity(quarters);
    for _ in 0..quarters {
        date = quarter::next_quarter(date);
        value *= factor;
        dates.push(date);
        values.push(value);
    }
    Ok((dates, values))
}

/// Append a [`project`]ion to every series in `dataset`.
///
/// Fails with [`HpiError::DiscontinuousAppend`] if a series has already been extended past its
/// anchor. Series are extended in order; a failure stops at the offending series.
pub fn extend(dataset: &mut Dataset, quarters: usize, annual_growth: f64) -> HpiResult<()> {
    if quarters == 0 {
        return Ok(());
    }
    let geos: Vec<String> = dataset.geos().into_iter().map(str::to_string).collect();
    for geo in geos {
        let series = dataset.geo_mut(&geo)?;
        let (dates, values) = project(series, quarters, annual_growth)?;
        series.append(&dates, &values)?;
    }
    Ok(())
}
