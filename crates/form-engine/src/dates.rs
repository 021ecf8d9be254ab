//! Calendar helpers for ISO `YYYY-MM-DD` answers and relative-date conditions.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::util::days_in_year_month;
use time::{Date, Duration, Month};

use crate::spec::condition::{Direction, TimeUnit};

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const LONG_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[day padding:none] [month repr:long] [year]");

/// Parses a strict ISO calendar date (`2024-01-31`).
pub fn parse_iso_date(text: &str) -> Option<Date> {
    Date::parse(text.trim(), ISO_DATE).ok()
}

pub fn format_iso_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

/// Long form used in answer summaries, e.g. `31 January 2024`.
pub fn format_long_date(date: Date) -> String {
    date.format(LONG_DATE).unwrap_or_else(|_| date.to_string())
}

/// Resolves `period unit direction` against `today`.
pub fn relative_date(today: Date, period: u32, unit: TimeUnit, direction: Direction) -> Option<Date> {
    let signed = match direction {
        Direction::Past => -i64::from(period),
        Direction::Future => i64::from(period),
    };
    shift(today, signed, unit)
}

/// Moves `date` by a signed amount. Month and year steps clamp to the last
/// day of the target month (31 March minus one month is 29 February on
/// leap years).
pub fn shift(date: Date, amount: i64, unit: TimeUnit) -> Option<Date> {
    match unit {
        TimeUnit::Days => date.checked_add(Duration::days(amount)),
        TimeUnit::Weeks => date.checked_add(Duration::weeks(amount)),
        TimeUnit::Months => add_months(date, amount),
        TimeUnit::Years => add_months(date, amount.checked_mul(12)?),
    }
}

fn add_months(date: Date, months: i64) -> Option<Date> {
    let index = i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1 + months;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = Month::try_from(u8::try_from(index.rem_euclid(12) + 1).ok()?).ok()?;
    let day = date.day().min(days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(text: &str) -> Date {
        parse_iso_date(text).expect("valid test date")
    }

    #[test]
    fn parses_only_strict_iso_dates() {
        assert!(parse_iso_date("2024-02-29").is_some());
        assert!(parse_iso_date("2023-02-29").is_none());
        assert!(parse_iso_date("2024-2-9").is_none());
        assert!(parse_iso_date("2024-01-31T00:00").is_none());
        assert!(parse_iso_date(" 2024-01-31 ").is_some());
        assert!(parse_iso_date("yesterday").is_none());
    }

    #[test]
    fn formats_round_trip_and_long_form() {
        let value = date("2024-01-05");
        assert_eq!(format_iso_date(value), "2024-01-05");
        assert_eq!(format_long_date(value), "5 January 2024");
    }

    #[test]
    fn month_steps_clamp_to_month_end() {
        assert_eq!(
            shift(date("2024-03-31"), -1, TimeUnit::Months).map(format_iso_date),
            Some("2024-02-29".to_string())
        );
        assert_eq!(
            shift(date("2024-02-29"), 1, TimeUnit::Years).map(format_iso_date),
            Some("2025-02-28".to_string())
        );
        assert_eq!(
            shift(date("2024-01-15"), -13, TimeUnit::Months).map(format_iso_date),
            Some("2022-12-15".to_string())
        );
    }

    #[test]
    fn relative_dates_follow_direction() {
        let today = date("2024-06-10");
        assert_eq!(
            relative_date(today, 2, TimeUnit::Weeks, Direction::Past).map(format_iso_date),
            Some("2024-05-27".to_string())
        );
        assert_eq!(
            relative_date(today, 3, TimeUnit::Days, Direction::Future).map(format_iso_date),
            Some("2024-06-13".to_string())
        );
    }
}
