//! Best-available-geography lookup across datasets ordered by preference.

use crate::error::{HpiError, HpiResult};
use crate::geo::GeoClass;
use crate::quarter::YearQuarter;
use crate::types::Dataset;

/// Anything that can resolve an index value for a geography key and date.
pub trait IndexProvider {
    /// Index at `date` for `key`, or the reason there is none.
    fn resolve(&self, key: &str, date: YearQuarter) -> HpiResult<f64>;

    /// Class reported when this provider supplies the match.
    fn geo_class(&self) -> GeoClass;
}

impl IndexProvider for Dataset {
    fn resolve(&self, key: &str, date: YearQuarter) -> HpiResult<f64> {
        self.index(key, date)
    }

    fn geo_class(&self) -> GeoClass {
        Dataset::geo_class(self)
    }
}

/// Value found by [`best`] and the class of the provider that supplied it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    pub value: f64,
    pub geo_class: GeoClass,
}

/// Return the first successful lookup of `keys[i]` in `sources[i]`, in order.
///
/// `keys` and `sources` are paired by position and must have the same non-zero length. The order
/// is the caller's preference, e.g. metro, then non-metro, then state:
///
/// ```
/// use house_price_index::geo::GeoClass;
/// use house_price_index::processing::{best, IndexProvider};
/// use house_price_index::types::{Dataset, Series};
///
/// # fn main() -> Result<(), house_price_index::HpiError> {
/// let metro = Dataset::new(GeoClass::Metro, vec![Series::new("14260", None, vec![20251], vec![410.2])?])?;
/// let state = Dataset::new(GeoClass::State, vec![Series::new("ID", None, vec![20251], vec![520.9])?])?;
/// let sources: [&dyn IndexProvider; 2] = [&metro, &state];
///
/// assert_eq!(best(20251, &["14260", "ID"], &sources)?.geo_class, GeoClass::Metro);
/// assert_eq!(best(20251, &["XXXXX", "ID"], &sources)?.geo_class, GeoClass::State);
/// # Ok(())
/// # }
/// ```
pub fn best(date: YearQuarter, keys: &[&str], sources: &[&dyn IndexProvider]) -> HpiResult<BestMatch> {
    if keys.is_empty() || keys.len() != sources.len() {
        return Err(HpiError::invalid_arguments(format!(
            "best: {} keys for {} datasets",
            keys.len(),
            sources.len()
        )));
    }

    keys.iter()
        .zip(sources)
        .find_map(|(key, source)| {
            source.resolve(key, date).ok().map(|value| BestMatch {
                value,
                geo_class: source.geo_class(),
            })
        })
        .ok_or_else(|| HpiError::NoMatch {
            date,
            keys: keys.iter().map(|k| k.to_string()).collect(),
        })
}
