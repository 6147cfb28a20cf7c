use crate::utils::error::{AppError, Result};
use chrono::{Datelike, NaiveDate};

/// Normalizes a stored date string into a `NaiveDate`.
///
/// The register historically carried two conventions: the canonical ISO
/// `YYYY-MM-DD` column format and an older `DD/MM/YYYY` text format. Both are
/// accepted here, and only here; everything past this boundary works with
/// `NaiveDate`.
pub fn parse_birth_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    let parsed = if trimmed.contains('/') {
        NaiveDate::parse_from_str(trimmed, "%d/%m/%Y")
    } else {
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
    };

    parsed.map_err(|_| AppError::InvalidDateFormat {
        value: value.to_string(),
    })
}

/// Renders a birth date the way the birthday cards do: `DD/MM/YYYY`.
pub fn format_birth_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// The day the birthday is celebrated in `year`. A February 29 birth date
/// falls back to February 28 in non-leap years, so every birthday occurs
/// exactly once per year.
fn celebration_date(birth: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, birth.month(), birth.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
        .expect("February 28 exists in every year")
}

/// Age in whole years as of `today`. Increments on the celebration day, which
/// for leap-day birthdays means February 28 in non-leap years.
pub fn age(birth: NaiveDate, today: NaiveDate) -> i32 {
    let anniversary = celebration_date(birth, today.year());
    let mut years = today.year() - birth.year();
    if today < anniversary {
        years -= 1;
    }
    years
}

/// True iff `today` is the celebration day of `birth`; the birth year is
/// irrelevant.
pub fn is_birthday(birth: NaiveDate, today: NaiveDate) -> bool {
    today == celebration_date(birth, today.year())
}
