//! Season classification: maps a calendar date to one of five season
//! buckets and renders the chapter label, including the two winter buckets
//! that straddle a calendar-year boundary.

use chrono::{Datelike, NaiveDate};

/// The five season buckets. Winter appears twice because it spans the year
/// boundary: the January–March stretch belongs to the winter that began
/// the previous December.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    /// Jan 1 – Mar 20: the closing half of the previous year's winter.
    WinterClosing = 0,
    /// Mar 21 – Jun 20.
    Spring = 1,
    /// Jun 21 – Sep 22.
    Summer = 2,
    /// Sep 23 – Dec 20.
    Autumn = 3,
    /// Dec 21 – Dec 31: the opening days of the winter that runs into the
    /// next year.
    WinterOpening = 4,
}

impl Season {
    /// Numeric id (0–4).
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// Inclusive (month, day) ranges, in calendar order. The reference
/// implementation projected dates onto a dummy leap year before comparing;
/// month/day tuples give the same ordering (Feb 29 included) without the
/// projection step.
const SEASON_RANGES: [(Season, (u32, u32), (u32, u32)); 5] = [
    (Season::WinterClosing, (1, 1), (3, 20)),
    (Season::Spring, (3, 21), (6, 20)),
    (Season::Summer, (6, 21), (9, 22)),
    (Season::Autumn, (9, 23), (12, 20)),
    (Season::WinterOpening, (12, 21), (12, 31)),
];

/// Classify a date into its season bucket.
///
/// Total over valid dates: the ranges tile the whole calendar, so every
/// date (Feb 29 included) lands in exactly one bucket.
pub fn season_of(date: NaiveDate) -> Season {
    let key = (date.month(), date.day());
    SEASON_RANGES
        .iter()
        .find(|(_, start, end)| *start <= key && key <= *end)
        .map(|(season, _, _)| *season)
        // The tail entry ends at Dec 31, so this arm never fires.
        .unwrap_or(Season::WinterOpening)
}

/// Render the chapter label for a date, e.g. `"Spring '23"` or
/// `"Winter '22 - '23"`.
pub fn chapter_label(date: NaiveDate) -> String {
    match season_of(date) {
        Season::WinterClosing => format!(
            "Winter '{} - '{}",
            short_year(sub_year(date)),
            short_year(date)
        ),
        Season::Spring => format!("Spring '{}", short_year(date)),
        Season::Summer => format!("Summer '{}", short_year(date)),
        Season::Autumn => format!("Autumn '{}", short_year(date)),
        Season::WinterOpening => format!(
            "Winter '{} - '{}",
            short_year(date),
            short_year(add_year(date))
        ),
    }
}

/// Two-digit year for labels; full years stay in the arithmetic below.
fn short_year(date: NaiveDate) -> String {
    date.format("%y").to_string()
}

/// The same date one year later.
///
/// Feb 29 has no counterpart in a non-leap year; in that case shift by the
/// actual day count between the two New Years (landing on Mar 1), as the
/// reference implementation does.
pub fn add_year(date: NaiveDate) -> NaiveDate {
    match date.with_year(date.year() + 1) {
        Some(shifted) => shifted,
        None => date + (jan1(date.year() + 1) - jan1(date.year())),
    }
}

/// The same date one year earlier, with the same Feb 29 handling.
pub fn sub_year(date: NaiveDate) -> NaiveDate {
    match date.with_year(date.year() - 1) {
        Some(shifted) => shifted,
        None => date + (jan1(date.year() - 1) - jan1(date.year())),
    }
}

fn jan1(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).expect("Jan 1 exists in every year")
}
