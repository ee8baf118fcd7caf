//! Flatten a [`Dataset`] for external consumption.
//!
//! - CSV: one line per (geography, date), header `geo,date,index`, or `geo,code,date,index` when
//!   the dataset carries area names (the name is then quoted). Index values have two decimals.
//! - JSON: a lossless snapshot (class, keys, names, dates, values, anchors) that re-validates on
//!   load.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::HpiResult;
use crate::types::Dataset;

/// Write `dataset` as CSV, geographies sorted by key.
pub fn write_csv<W: Write>(dataset: &Dataset, mut writer: W) -> HpiResult<()> {
    let has_code = dataset.has_area_names();
    let (header, style) = if has_code {
        ("geo,code,date,index\n", csv::QuoteStyle::NonNumeric)
    } else {
        ("geo,date,index\n", csv::QuoteStyle::Necessary)
    };
    // Written raw so `NonNumeric` quoting does not apply to the header.
    writer.write_all(header.as_bytes())?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(style)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let mut series: Vec<_> = dataset.series().collect();
    series.sort_by(|a, b| a.key().cmp(b.key()));

    for s in series {
        for (date, value) in s.iter() {
            let date = date.to_string();
            let value = format!("{value:.2}");
            if has_code {
                wtr.write_record([s.name(), s.key(), date.as_str(), value.as_str()])?;
            } else {
                wtr.write_record([s.name(), date.as_str(), value.as_str()])?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

/// [`write_csv`] to a new file at `path`.
pub fn save_csv(dataset: &Dataset, path: impl AsRef<Path>) -> HpiResult<()> {
    let file = File::create(path)?;
    write_csv(dataset, BufWriter::new(file))
}

/// Write a JSON snapshot of `dataset`.
pub fn write_json<W: Write>(dataset: &Dataset, writer: W) -> HpiResult<()> {
    serde_json::to_writer(writer, dataset)?;
    Ok(())
}

/// [`write_json`] to a new file at `path`.
pub fn save_json(dataset: &Dataset, path: impl AsRef<Path>) -> HpiResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_json(dataset, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Read a snapshot written by [`write_json`]. Invalid class labels, duplicate keys and unordered
/// dates are rejected.
pub fn read_json<R: Read>(reader: R) -> HpiResult<Dataset> {
    Ok(serde_json::from_reader(reader)?)
}

/// [`read_json`] from the file at `path`.
pub fn load_json(path: impl AsRef<Path>) -> HpiResult<Dataset> {
    let file = File::open(path)?;
    read_json(BufReader::new(file))
}
