//! Daewoon day differences
//!
//! Given a birth date, measures the distance in days to the surrounding
//! solar-term boundaries and scales it by three (three days per year of
//! daewoon).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::solar_terms::SolarTermTable;
use crate::error::CalendarError;

/// Days of distance that correspond to one unit of daewoon
pub const DAYS_PER_UNIT: i64 = 3;

/// Scaled distances to the surrounding solar terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaewoonDiff {
    /// Scaled days until the next term strictly after the date
    pub asc_diff_days: Option<i64>,

    /// Scaled days since the latest term on or before the date
    pub desc_diff_days: Option<i64>,
}

/// Parse an 8-digit `YYYYMMDD` date
pub fn parse_yyyymmdd(input: &str) -> Result<NaiveDate, CalendarError> {
    let invalid = || CalendarError::InvalidDate {
        input: input.to_string(),
    };

    if input.len() != 8 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let year: i32 = input[0..4].parse().map_err(|_| invalid())?;
    let month: u32 = input[4..6].parse().map_err(|_| invalid())?;
    let day: u32 = input[6..8].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// `days / 3` rounded to the nearest integer, halves rounding up.
///
/// An integer divided by three never lands exactly on a half, so this agrees
/// with banker's rounding as well.
pub fn scaled_days(days: i64) -> i64 {
    (days + 1).div_euclid(DAYS_PER_UNIT)
}

/// Distances from `date` to its neighbouring solar terms
///
/// A side with no boundary in the table is `None`.
pub fn calc_daewoon(table: &SolarTermTable, date: NaiveDate) -> DaewoonDiff {
    let asc_diff_days = table
        .after(date)
        .map(|next| scaled_days((next.date - date).num_days()));

    let desc_diff_days = table
        .at_or_before(date)
        .map(|prev| scaled_days((date - prev.date).num_days()));

    DaewoonDiff {
        asc_diff_days,
        desc_diff_days,
    }
}
