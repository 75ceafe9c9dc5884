//! Shared constants, unit conversion, and month arithmetic.

use chrono::{Datelike, Duration, NaiveDate};

/// Months a purchased disk stays usable after its order date.
pub const EXPIRY_MONTHS: i32 = 12;

/// Fixed binary factor between gigabytes and terabytes.
pub const GB_PER_TB: f64 = 1024.0;

/// Converts gigabytes to terabytes.
pub fn gb_to_tb(gb: f64) -> f64 {
    gb / GB_PER_TB
}

/// Converts terabytes to gigabytes.
pub fn tb_to_gb(tb: f64) -> f64 {
    tb * GB_PER_TB
}

/// Converts terabytes to whole gigabytes, truncating toward zero.
///
/// Negative and non-finite inputs map to zero.
pub fn tb_to_whole_gb(tb: f64) -> u64 {
    let gb = tb_to_gb(tb);
    if gb.is_finite() && gb > 0.0 {
        gb.trunc() as u64
    } else {
        0
    }
}

/// Returns the first day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Shifts `date` by `months`, clamping the day to the end of the target month.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// Date on which a purchase made on `order_date` stops counting as capacity.
pub fn expiry_date(order_date: NaiveDate) -> NaiveDate {
    add_months(order_date, EXPIRY_MONTHS)
}

/// Encodes the year and month of `date` as `YYYYMM`.
pub fn year_month_key(date: NaiveDate) -> u32 {
    date.year().max(0) as u32 * 100 + date.month()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|first_next| (first_next - Duration::days(1)).day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(add_months(date(2023, 1, 31), 1), date(2023, 2, 28));
        assert_eq!(add_months(date(2024, 3, 15), -3), date(2023, 12, 15));
    }

    #[test]
    fn expiry_is_twelve_months_later() {
        assert_eq!(expiry_date(date(2024, 1, 1)), date(2025, 1, 1));
        assert_eq!(expiry_date(date(2024, 2, 29)), date(2025, 2, 28));
    }

    #[test]
    fn whole_gb_truncates_and_clamps() {
        assert_eq!(tb_to_whole_gb(1.0), 1024);
        assert_eq!(tb_to_whole_gb(0.5859), 599);
        assert_eq!(tb_to_whole_gb(-0.3), 0);
        assert_eq!(tb_to_whole_gb(f64::NAN), 0);
    }

    #[test]
    fn year_month_key_encodes_calendar_month() {
        assert_eq!(year_month_key(date(2025, 7, 19)), 202507);
        assert_eq!(first_of_month(date(2025, 7, 19)), date(2025, 7, 1));
    }
}
