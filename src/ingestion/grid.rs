//! Row classification and normalization for one extracted sheet.
//!
//! A sheet arrives as a ragged grid of strings. Row 0 holds the title text used to detect the
//! [`GeoClass`]. Somewhere below it a header row names the `Year` column; every row after that is
//! data laid out as:
//!
//! ```text
//! key,  year, quarter, index, ...          (most classes)
//! name, key,  year,    quarter, index, ... (metro: area name + numeric code)
//! ```
//!
//! Rows must be grouped per geography and in date order within a group. The normalizer does not
//! sort; geographies keep their encounter order.

use tracing::debug;

use crate::error::{HpiError, HpiResult};
use crate::geo::{detect_geo_class, GeoClass};
use crate::quarter::{self, YearQuarter};
use crate::types::Dataset;

/// Rows shorter than this are never data.
const MIN_CELLS: usize = 4;

/// Where the data starts and whether an area-name column leads each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    /// 0-based index of the header row (data starts on the next row).
    pub header_row: usize,
    /// `true` when column 0 is an area name and column 1 the geography code.
    pub has_area_name: bool,
}

impl SheetLayout {
    fn offset(self) -> usize {
        usize::from(self.has_area_name)
    }
}

/// One normalized data row.
#[derive(Debug, Clone, PartialEq)]
pub struct HpiRow {
    /// Geography lookup key.
    pub key: String,
    /// Area name, present only when the sheet has a separate name column.
    pub name: Option<String>,
    pub date: YearQuarter,
    pub value: f64,
}

/// Output of [`normalize_rows`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedRows {
    /// `None` when no header row was found.
    pub layout: Option<SheetLayout>,
    /// Data rows in encounter order.
    pub rows: Vec<HpiRow>,
    /// Data rows dropped for a missing or malformed year, quarter or index cell.
    pub skipped: usize,
}

/// Find the header row: the first row of at least four cells whose column 1 or 2 reads `year`.
pub fn detect_layout<R, S>(grid: &[R]) -> Option<SheetLayout>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    grid.iter().enumerate().find_map(|(idx, row)| {
        let row = row.as_ref();
        if row.len() < MIN_CELLS {
            return None;
        }
        let is_year = |c: &S| c.as_ref().trim().eq_ignore_ascii_case("year");
        if is_year(&row[1]) {
            Some(SheetLayout {
                header_row: idx,
                has_area_name: false,
            })
        } else if is_year(&row[2]) {
            Some(SheetLayout {
                header_row: idx,
                has_area_name: true,
            })
        } else {
            None
        }
    })
}

/// Convert every data row after the header into an [`HpiRow`].
///
/// Rows with fewer than four cells are ignored. Rows whose index cell is missing or
/// non-numeric are counted in [`NormalizedRows::skipped`]: they are known gaps in the published
/// series. The same applies to rows whose year or quarter cell does not parse or is out of range
/// (footnotes below the table).
pub fn normalize_rows<R, S>(grid: &[R]) -> NormalizedRows
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let Some(layout) = detect_layout(grid) else {
        debug!(rows = grid.len(), "no header row found");
        return NormalizedRows::default();
    };
    debug!(header_row = layout.header_row, has_area_name = layout.has_area_name, "sheet layout");

    let mut out = NormalizedRows {
        layout: Some(layout),
        ..Default::default()
    };
    for (idx0, row) in grid.iter().enumerate().skip(layout.header_row + 1) {
        let row = row.as_ref();
        if row.len() < MIN_CELLS {
            continue;
        }
        match parse_row(row, layout) {
            Some(r) => out.rows.push(r),
            None => {
                debug!(row = idx0 + 1, "skipping row without a usable index value");
                out.skipped += 1;
            }
        }
    }
    out
}

fn parse_row<S: AsRef<str>>(row: &[S], layout: SheetLayout) -> Option<HpiRow> {
    let offset = layout.offset();
    let cell = |i: usize| row.get(i).map(|c| c.as_ref().trim());

    let key = cell(offset).filter(|k| !k.is_empty())?;
    let year = cell(1 + offset)?.parse::<i32>().ok()?;
    let qtr = cell(2 + offset)?.parse::<i32>().ok()?;
    let date = quarter::checked_from_parts(year, qtr)?;
    let value = cell(3 + offset)?.parse::<f64>().ok().filter(|v| v.is_finite())?;

    let name = if layout.has_area_name {
        cell(0).map(str::to_string)
    } else {
        None
    };
    Some(HpiRow {
        key: key.to_string(),
        name,
        date,
        value,
    })
}

/// Fold normalized rows into a [`Dataset`] of class `geo_class`.
///
/// A change of key opens that key's series (re-opening it if the key was seen before). Dates must
/// strictly increase within a key; otherwise [`HpiError::DiscontinuousAppend`] is returned.
pub fn build_dataset(geo_class: GeoClass, rows: &[HpiRow]) -> HpiResult<Dataset> {
    let mut ds = Dataset::empty(geo_class)?;
    for row in rows {
        ds.open_series(&row.key, row.name.as_deref()).push(row.date, row.value)?;
    }
    Ok(ds)
}

/// Title text used for class detection: the non-empty cells of row 0, space-joined.
pub fn title_text<R, S>(grid: &[R]) -> String
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    grid.first()
        .map(|row| {
            row.as_ref()
                .iter()
                .map(|c| c.as_ref().trim())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Detect the class from the title row, then normalize and build.
///
/// Fails with [`HpiError::UnrecognizedGeographyClass`] if the title matches no class.
pub fn ingest_grid<R, S>(grid: &[R]) -> HpiResult<Dataset>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    ingest_counting(grid, None).map(|(ds, _)| ds)
}

/// Normalize and build with an explicit class, bypassing title detection.
pub fn ingest_grid_as<R, S>(grid: &[R], geo_class: GeoClass) -> HpiResult<Dataset>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    ingest_counting(grid, Some(geo_class)).map(|(ds, _)| ds)
}

/// Shared by the public entry points and the loader; also returns the skipped-row count.
pub(crate) fn ingest_counting<R, S>(grid: &[R], geo_class: Option<GeoClass>) -> HpiResult<(Dataset, usize)>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let geo_class = match geo_class {
        Some(c) => c,
        None => {
            let title = title_text(grid);
            let detected = detect_geo_class(&title);
            if !detected.is_supported() {
                return Err(HpiError::UnrecognizedGeographyClass { label: title });
            }
            detected
        }
    };

    let normalized = normalize_rows(grid);
    let ds = build_dataset(geo_class, &normalized.rows)?;
    debug!(
        geo_class = %geo_class,
        series = ds.len(),
        observations = ds.observation_count(),
        skipped = normalized.skipped,
        "sheet ingested"
    );
    Ok((ds, normalized.skipped))
}
