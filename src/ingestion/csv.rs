//! Read a CSV rendering of a sheet into a string grid.

use std::path::Path;

use crate::error::HpiResult;

/// Read a CSV file into a ragged grid of trimmed strings.
///
/// Rules:
///
/// - No header handling: the title row, notes and the table header are all plain rows.
/// - Rows may differ in width.
pub fn read_csv_grid(path: impl AsRef<Path>) -> HpiResult<Vec<Vec<String>>> {
    let mut rdr = reader_builder().from_path(path)?;
    read_csv_grid_from_reader(&mut rdr)
}

/// Read a grid from an existing CSV reader.
///
/// Build the reader with `has_headers(false)` and `flexible(true)`, or the first row is consumed
/// and ragged rows fail.
pub fn read_csv_grid_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> HpiResult<Vec<Vec<String>>> {
    let mut grid = Vec::new();
    for result in rdr.records() {
        let record = result?;
        grid.push(record.iter().map(|c| c.trim().to_owned()).collect());
    }
    Ok(grid)
}

/// Builder configured for sheet-shaped CSV.
pub fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).flexible(true);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_ragged_rows_including_title() {
        let input = "\"House Price Index, States and the District of Columbia\"\n\nState,Year,Quarter,Index\nCA,2020,1, 300.10 \n";
        let mut rdr = reader_builder().from_reader(input.as_bytes());
        let grid = read_csv_grid_from_reader(&mut rdr).unwrap();

        assert_eq!(grid[0], vec!["House Price Index, States and the District of Columbia"]);
        assert_eq!(grid.last().unwrap(), &vec!["CA", "2020", "1", "300.10"]);
    }
}
