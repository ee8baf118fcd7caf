//! Year-quarter date codes.
//!
//! Every date at the crate boundary is a plain integer `10 * year + quarter`, so 2003-Q3 is
//! `20033`. Calendar conversions are offered as conveniences on top of [`chrono::NaiveDate`].

use chrono::{Datelike, NaiveDate};

use crate::error::{HpiError, HpiResult};

/// Integer date code `10 * year + quarter`, quarter in `1..=4`.
pub type YearQuarter = i32;

/// Earliest year accepted by [`to_calendar_date`] and [`next_quarter`].
pub const MIN_YEAR: i32 = 1960;
/// Latest year accepted by [`to_calendar_date`].
pub const MAX_YEAR: i32 = 2060;

/// Split a code into `(year, quarter)` without validating either part.
pub fn split(code: YearQuarter) -> (i32, i32) {
    let year = code / 10;
    (year, code - 10 * year)
}

/// Build a code from a year and a quarter without validating either part.
pub fn from_parts(year: i32, quarter: i32) -> YearQuarter {
    10 * year + quarter
}

/// Build a code only if `year` is in `MIN_YEAR..=MAX_YEAR` and `quarter` in `1..=4`.
///
/// Use this for untrusted input: [`from_parts`] overflows on out-of-range years.
pub fn checked_from_parts(year: i32, quarter: i32) -> Option<YearQuarter> {
    ((MIN_YEAR..=MAX_YEAR).contains(&year) && (1..=4).contains(&quarter)).then(|| from_parts(year, quarter))
}

/// Returns `true` if `code` has a year in `MIN_YEAR..=MAX_YEAR` and a quarter in `1..=4`.
pub fn is_valid(code: YearQuarter) -> bool {
    let (year, quarter) = split(code);
    (MIN_YEAR..=MAX_YEAR).contains(&year) && (1..=4).contains(&quarter)
}

/// Quarter code containing `date`.
pub fn to_year_quarter(date: NaiveDate) -> YearQuarter {
    let quarter = 1 + (date.month() as i32 - 1) / 3;
    from_parts(date.year(), quarter)
}

/// First day of the first month of the quarter (January, April, July or October).
pub fn to_calendar_date(code: YearQuarter) -> HpiResult<NaiveDate> {
    if !is_valid(code) {
        return Err(HpiError::InvalidDate { code });
    }
    let (year, quarter) = split(code);
    let month = (1 + 3 * (quarter - 1)) as u32;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(HpiError::InvalidDate { code })
}

/// Number of quarters between `a` and `b`.
///
/// The result is never negative: the smaller code is always treated as the start, so
/// `quarter_difference(20222, 20221) == quarter_difference(20221, 20222) == 1`. Callers that need a
/// signed displacement must track direction themselves.
pub fn quarter_difference(a: YearQuarter, b: YearQuarter) -> i32 {
    let (start, end) = if b < a { (b, a) } else { (a, b) };
    let (y0, q0) = split(start);
    let (y1, q1) = split(end);
    4 * (y1 - y0) + q1 - q0
}

/// The quarter after `code`, rolling Q4 into Q1 of the following year.
///
/// # Panics
///
/// Panics if `code` has a year before [`MIN_YEAR`] or a quarter outside `1..=4`. Reaching that
/// state means a validation step was skipped upstream, so it is not reported as an `HpiError`.
pub fn next_quarter(code: YearQuarter) -> YearQuarter {
    let (year, quarter) = split(code);
    assert!(
        year >= MIN_YEAR && (1..=4).contains(&quarter),
        "illegal year-quarter code: {code}"
    );

    if quarter == 4 {
        from_parts(year + 1, 1)
    } else {
        from_parts(year, quarter + 1)
    }
}

/// Returns `true` if every adjacent pair advances by exactly one quarter.
///
/// Unlike [`quarter_difference`] this is direction-aware: duplicates and reversals fail. Codes with
/// an invalid quarter also fail rather than panicking.
pub fn quarters_monotonic(codes: &[YearQuarter]) -> bool {
    codes.windows(2).all(|w| follows(w[0], w[1]))
}

/// `true` if `next` is exactly one quarter after `prev`.
pub(crate) fn follows(prev: YearQuarter, next: YearQuarter) -> bool {
    let (year, quarter) = split(prev);
    if !(1..=4).contains(&quarter) {
        return false;
    }
    let expected = if quarter == 4 {
        from_parts(year + 1, 1)
    } else {
        from_parts(year, quarter + 1)
    };
    next == expected
}
