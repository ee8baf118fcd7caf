#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{HpiError, HpiResult};

/// Read one worksheet (`.xlsx`, `.xls`, `.ods`, etc.) into a grid of strings.
///
/// Behavior:
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Keeps every row, including the title and notes above the table
/// - Renders integer-valued numbers without a fractional part so year/quarter cells parse as
///   integers
/// - Drops trailing empty cells so short rows stay short
pub fn read_excel_grid(path: impl AsRef<Path>, sheet_name: Option<&str>) -> HpiResult<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| HpiError::unreadable("workbook has no sheets"))?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    Ok(range_to_grid(&range))
}

fn range_to_grid(range: &calamine::Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(cell_to_string).collect();
            while cells.last().is_some_and(|c| c.is_empty()) {
                cells.pop();
            }
            cells
        })
        .collect()
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        // `#N/A` and friends mark missing index values; treat them as empty.
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}
