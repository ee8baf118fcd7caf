//! Queries that span series or datasets.
//!
//! Currently implemented:
//!
//! - [`best()`]: first available value across datasets ordered by geography preference
//! - [`forecast::project`] / [`forecast::extend`]: constant-growth extensions past the observed
//!   history
//!
//! ## Example: preference cascade
//!
//! ```rust
//! use house_price_index::geo::GeoClass;
//! use house_price_index::processing::{best, IndexProvider};
//! use house_price_index::types::{Dataset, Series};
//!
//! let metro = Dataset::new(
//!     GeoClass::Metro,
//!     vec![Series::new("14260", Some("Boise City, ID".into()), vec![20244, 20251], vec![401.0, 410.2]).unwrap()],
//! )
//! .unwrap();
//! let nonmetro = Dataset::new(
//!     GeoClass::NonMetro,
//!     vec![Series::new("ID", None, vec![20244, 20251], vec![390.5, 398.1]).unwrap()],
//! )
//! .unwrap();
//!
//! // Urban first, then rural.
//! let cascade: [&dyn IndexProvider; 2] = [&metro, &nonmetro];
//! let hit = best(20251, &["XXXXX", "ID"], &cascade).unwrap();
//! assert_eq!(hit.geo_class, GeoClass::NonMetro);
//! assert_eq!(hit.value, 398.1);
//! ```

pub mod best;
pub mod forecast;

pub use best::{best, BestMatch, IndexProvider};
