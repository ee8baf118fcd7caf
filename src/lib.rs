//! `house-price-index` turns published quarterly house price index sheets into an in-memory,
//! queryable per-geography time-series store.
//!
//! One sheet covers one geography class ([`geo::GeoClass`]): three-digit ZIP, metro, non-metro,
//! state, US/census division, Puerto Rico or manufactured homes. Loading a sheet produces a
//! [`types::Dataset`] holding one [`types::Series`] per geography key (state postal code, ZIP3,
//! metro code, ...).
//!
//! Every date is a plain integer `10 * year + quarter`, so 2003-Q3 is `20033` (see [`quarter`]).
//!
//! ## Loading
//!
//! - **CSV** renderings of a sheet: `.csv`, `.txt`
//! - **Workbooks** (requires the Cargo feature `excel`): `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`
//! - **Already-extracted cells**: [`ingestion::ingest_grid`] takes any grid of strings
//! - **Downloads** (requires the Cargo feature `fetch`): `ingestion::fetch::download`
//!
//! ```no_run
//! use house_price_index::ingestion::{load_from_path, LoadOptions};
//!
//! # fn main() -> Result<(), house_price_index::HpiError> {
//! // The class is detected from the sheet title.
//! let metro = load_from_path("hpi_at_metro.csv", &LoadOptions::default())?;
//! let growth = metro.change("10180", 20201, 20222)?;
//! println!("Abilene, TX: {:.1}% since 2020-Q1", 100.0 * (growth - 1.0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Querying
//!
//! ```rust
//! use house_price_index::geo::GeoClass;
//! use house_price_index::ingestion::ingest_grid;
//!
//! let grid = vec![
//!     vec!["House Price Index for States and the District of Columbia"],
//!     vec!["State", "Year", "Quarter", "Index (NSA)"],
//!     vec!["CA", "2020", "1", "300.00"],
//!     vec!["CA", "2020", "2", "306.00"],
//!     vec!["CA", "2020", "3", ""],
//!     vec!["CA", "2020", "4", "318.00"],
//! ];
//! let ds = ingest_grid(&grid).unwrap();
//!
//! assert_eq!(ds.geo_class(), GeoClass::State);
//! assert_eq!(ds.index("CA", 20202).unwrap(), 306.0);
//! // 2020-Q3 is missing in the sheet: the previous quarter's value carries forward.
//! assert_eq!(ds.index("CA", 20203).unwrap(), 306.0);
//! assert_eq!(ds.change("CA", 20201, 20204).unwrap(), 1.06);
//! assert!(ds.index("CA", 20194).is_err());
//! ```
//!
//! ## Modules
//!
//! - [`quarter`]: year-quarter codes and calendar conversion
//! - [`geo`]: geography classes and title-text detection
//! - [`types`]: [`types::Series`] and [`types::Dataset`]
//! - [`ingestion`]: sheet readers, row normalization and the unified loader
//! - [`processing`]: best-match lookup across datasets and growth projections
//! - [`export`]: CSV and JSON output
//! - [`error`]: the crate error type

pub mod error;
pub mod export;
pub mod geo;
pub mod ingestion;
pub mod processing;
pub mod quarter;
pub mod types;

pub use error::{HpiError, HpiResult};
pub use quarter::YearQuarter;
