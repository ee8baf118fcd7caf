//! Geography classes and the header-text detector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HpiError;

/// Aggregation level of a published sheet.
///
/// `Unknown` is the detector's "no match" sentinel. It is never accepted as a dataset class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoClass {
    /// Three-digit ZIP code areas.
    Zip3,
    /// Metropolitan statistical areas and divisions.
    Metro,
    /// State remainders outside metropolitan areas.
    NonMetro,
    /// States and the District of Columbia.
    State,
    /// National and census-division series.
    Us,
    /// Puerto Rico.
    Pr,
    /// Manufactured homes.
    Mh,
    /// No keyword matched.
    Unknown,
}

/// Header keywords checked in order against the lower-cased title text.
const HEADER_KEYWORDS: &[(&str, GeoClass)] = &[
    ("three-digit zip", GeoClass::Zip3),
    ("metropolitan areas", GeoClass::Metro),
    ("not in metropolitan statistical areas", GeoClass::NonMetro),
    ("states and the district of columbia", GeoClass::State),
    ("census divisions", GeoClass::Us),
    ("puerto rico", GeoClass::Pr),
    ("manufactured homes", GeoClass::Mh),
];

const DOWNLOAD_BASE: &str = "https://www.fhfa.gov/hpi/download/quarterly_datasets";

const SOURCE_FILES: &[(GeoClass, &str)] = &[
    (GeoClass::Zip3, "hpi_at_3zip.xlsx"),
    (GeoClass::Metro, "hpi_at_metro.xlsx"),
    (GeoClass::NonMetro, "hpi_at_nonmetro.xlsx"),
    (GeoClass::State, "hpi_at_state.xlsx"),
    (GeoClass::Us, "hpi_at_us_and_census.xlsx"),
    (GeoClass::Pr, "hpi_at_pr.xlsx"),
    (GeoClass::Mh, "hpi_at_mh.xlsx"),
];

impl GeoClass {
    /// The seven supported classes.
    pub const ALL: [GeoClass; 7] = [
        GeoClass::Zip3,
        GeoClass::Metro,
        GeoClass::NonMetro,
        GeoClass::State,
        GeoClass::Us,
        GeoClass::Pr,
        GeoClass::Mh,
    ];

    /// Lowercase tag (`zip3`, `metro`, `nonmetro`, `state`, `us`, `pr`, `mh`, `unknown`).
    pub fn label(self) -> &'static str {
        match self {
            GeoClass::Zip3 => "zip3",
            GeoClass::Metro => "metro",
            GeoClass::NonMetro => "nonmetro",
            GeoClass::State => "state",
            GeoClass::Us => "us",
            GeoClass::Pr => "pr",
            GeoClass::Mh => "mh",
            GeoClass::Unknown => "unknown",
        }
    }

    /// `false` only for [`GeoClass::Unknown`].
    pub fn is_supported(self) -> bool {
        self != GeoClass::Unknown
    }

    /// Parse one of the seven labels (case-insensitive).
    pub fn parse(label: &str) -> Result<Self, HpiError> {
        let wanted = label.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == wanted)
            .ok_or_else(|| HpiError::UnrecognizedGeographyClass {
                label: label.to_string(),
            })
    }

    /// URL of the published non-seasonally-adjusted workbook for this class.
    pub fn source_url(self) -> Option<String> {
        SOURCE_FILES
            .iter()
            .find(|(c, _)| *c == self)
            .map(|(_, file)| format!("{DOWNLOAD_BASE}/{file}"))
    }
}

impl fmt::Display for GeoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GeoClass {
    type Err = HpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Classify a sheet by its descriptive title text.
///
/// Returns [`GeoClass::Unknown`] when no keyword matches; callers must check for it.
pub fn detect_geo_class(header: &str) -> GeoClass {
    let header = header.to_lowercase();
    HEADER_KEYWORDS
        .iter()
        .find(|(needle, _)| header.contains(needle))
        .map(|(_, class)| *class)
        .unwrap_or(GeoClass::Unknown)
}
