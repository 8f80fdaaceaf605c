//! Day-of-week convention helpers
//!
//! Classes store `day_of_week` as an integer where 0 = Sunday, 1 = Monday,
//! ..., 6 = Saturday.

use chrono::{Datelike, NaiveDate, Weekday};

/// Highest valid `day_of_week` value (Saturday)
pub const MAX_DAY_OF_WEEK: i32 = 6;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Check that a stored day value lies in `0..=6`
pub fn is_valid_day_of_week(day: i32) -> bool {
    (0..=MAX_DAY_OF_WEEK).contains(&day)
}

/// Convert a chrono weekday to the stored convention
///
/// # Examples
///
/// ```
/// use chrono::Weekday;
/// use minilms_common::day_of_week;
///
/// assert_eq!(day_of_week(Weekday::Sun), 0);
/// assert_eq!(day_of_week(Weekday::Mon), 1);
/// assert_eq!(day_of_week(Weekday::Sat), 6);
/// ```
pub fn day_of_week(weekday: Weekday) -> i32 {
    weekday.num_days_from_sunday() as i32
}

/// Stored day value for a calendar date
pub fn day_of_week_for(date: NaiveDate) -> i32 {
    day_of_week(date.weekday())
}

/// English name for a stored day value, `None` if out of range
pub fn day_name(day: i32) -> Option<&'static str> {
    usize::try_from(day).ok().and_then(|d| DAY_NAMES.get(d).copied())
}
