#![cfg(feature = "fetch")]
//! Download the published workbooks.

use std::fs;
use std::path::Path;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{HpiError, HpiResult};
use crate::geo::GeoClass;

/// Fetch the raw workbook bytes for `geo_class`.
pub fn fetch_bytes(geo_class: GeoClass) -> HpiResult<Vec<u8>> {
    let url = geo_class.source_url().ok_or_else(|| HpiError::UnrecognizedGeographyClass {
        label: geo_class.label().to_string(),
    })?;
    debug!(%url, "fetching workbook");

    let resp = Client::new().get(&url).send()?.error_for_status()?;
    Ok(resp.bytes()?.to_vec())
}

/// Download the workbook for `geo_class` to `dest`.
///
/// Load the result with [`super::load_from_path`] (requires the `excel` feature).
pub fn download(geo_class: GeoClass, dest: impl AsRef<Path>) -> HpiResult<()> {
    let bytes = fetch_bytes(geo_class)?;
    fs::write(dest.as_ref(), &bytes)?;
    debug!(path = %dest.as_ref().display(), bytes = bytes.len(), "workbook saved");
    Ok(())
}
