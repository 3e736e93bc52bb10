//! Calendar reconstruction from cyclic hour-of-year encodings.
//!
//! Station exports number the hours of a year 1..=8760 and carry the hour of
//! day in a separate field. This module turns such a pair into a timestamp
//! anchored to a fixed reference year.
//!
//! # Wraparound
//!
//! Hour indices past the end of the year wrap modulo the year length instead
//! of failing. Multi-year exports therefore alias every year onto the same
//! calendar slot; callers that concatenate years must disambiguate upstream.
//! No leap-year correction is inferred: a source that really has 8784-hour
//! years must say so through [`CalendarConfig::hours_in_year`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VarError};

pub const HOURS_PER_DAY: u32 = 24;
pub const HOURS_IN_YEAR: u32 = 8760;
pub const HOURS_IN_LEAP_YEAR: u32 = 8784;
pub const DEFAULT_REFERENCE_YEAR: i32 = 2023;

const MONTH_DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Reference-year anchoring for reconstructed timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Year every reconstructed timestamp is placed in.
    pub reference_year: i32,
    /// Length of the encoded year in hours, 8760 or 8784.
    pub hours_in_year: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
            hours_in_year: HOURS_IN_YEAR,
        }
    }
}

impl CalendarConfig {
    pub fn validate(&self) -> Result<()> {
        match self.hours_in_year {
            HOURS_IN_YEAR => Ok(()),
            HOURS_IN_LEAP_YEAR if is_leap_year(self.reference_year) => Ok(()),
            HOURS_IN_LEAP_YEAR => Err(VarError::InvalidParameter {
                param: "reference_year".into(),
                value: self.reference_year.to_string(),
                reason: "an 8784-hour encoding needs a leap reference year".into(),
            }),
            other => Err(VarError::InvalidParameter {
                param: "hours_in_year".into(),
                value: other.to_string(),
                reason: format!("must be {} or {}", HOURS_IN_YEAR, HOURS_IN_LEAP_YEAR),
            }),
        }
    }

    fn month_lengths(&self) -> [u32; 12] {
        let mut days = MONTH_DAYS;
        if self.hours_in_year == HOURS_IN_LEAP_YEAR {
            days[1] = 29;
        }
        days
    }
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Map an (hour-of-year, hour-of-day) pair onto a calendar timestamp.
///
/// `hour_of_year` is 1-based; values beyond `hours_in_year` wrap.
pub fn reconstruct_timestamp(
    hour_of_year: u32,
    hour_of_day: u32,
    config: &CalendarConfig,
) -> Result<NaiveDateTime> {
    config.validate()?;
    if hour_of_year == 0 {
        return Err(VarError::InvalidInput(
            "hour-of-year index is 1-based, got 0".to_string(),
        ));
    }
    if hour_of_day >= HOURS_PER_DAY {
        return Err(VarError::InvalidInput(format!(
            "hour of day must be in 0..=23, got {}",
            hour_of_day
        )));
    }

    let remaining = (hour_of_year - 1) % config.hours_in_year;
    let (month, day) = month_and_day(remaining / HOURS_PER_DAY, &config.month_lengths());

    NaiveDate::from_ymd_opt(config.reference_year, month, day)
        .and_then(|date| date.and_hms_opt(hour_of_day, 0, 0))
        .ok_or_else(|| {
            VarError::InvalidInput(format!(
                "{}-{:02}-{:02} {:02}:00 is not a valid timestamp",
                config.reference_year, month, day, hour_of_day
            ))
        })
}

/// Walk the month table to turn a 0-based day of year into (month, day).
fn month_and_day(day_of_year: u32, lengths: &[u32; 12]) -> (u32, u32) {
    let mut remaining = day_of_year;
    for (idx, &len) in lengths.iter().enumerate() {
        if remaining < len {
            return (idx as u32 + 1, remaining + 1);
        }
        remaining -= len;
    }
    // day_of_year < hours_in_year / 24 always lands inside the table
    (12, lengths[11])
}

/// Re-derive the (hour-of-year, hour-of-day) pair of a reconstructed timestamp.
///
/// The year component is ignored; the result is always in `1..=hours_in_year`.
pub fn hour_of_year(timestamp: &NaiveDateTime, config: &CalendarConfig) -> Result<(u32, u32)> {
    let lengths = config.month_lengths();
    let month_idx = timestamp.month0() as usize;
    if timestamp.day() > lengths[month_idx] {
        return Err(VarError::InvalidInput(format!(
            "{} does not exist in a {}-hour year",
            timestamp.date(),
            config.hours_in_year
        )));
    }

    let day_index: u32 = lengths[..month_idx].iter().sum::<u32>() + timestamp.day0();
    let hour = timestamp.hour();
    Ok((day_index * HOURS_PER_DAY + hour + 1, hour))
}

/// Whether a reconstructed timestamp agrees with month/day fields carried by the source.
pub fn matches_encoded_date(timestamp: &NaiveDateTime, month: u32, day: u32) -> bool {
    timestamp.month() == month && timestamp.day() == day
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_and_last_hour_of_year() {
        let cfg = CalendarConfig::default();
        let first = reconstruct_timestamp(1, 0, &cfg).unwrap();
        assert_eq!(first.to_string(), "2023-01-01 00:00:00");

        let last = reconstruct_timestamp(8760, 23, &cfg).unwrap();
        assert_eq!(last.to_string(), "2023-12-31 23:00:00");
    }

    #[test]
    fn test_month_boundaries() {
        let cfg = CalendarConfig::default();
        // Day 31 (0-based) is Feb 1, day 59 is Mar 1 with a 28-day February
        let feb1 = reconstruct_timestamp(31 * 24 + 1, 6, &cfg).unwrap();
        assert_eq!((feb1.month(), feb1.day(), feb1.hour()), (2, 1, 6));

        let mar1 = reconstruct_timestamp(59 * 24 + 1, 0, &cfg).unwrap();
        assert_eq!((mar1.month(), mar1.day()), (3, 1));
    }

    #[test]
    fn test_every_hour_is_a_valid_non_leap_date() {
        let cfg = CalendarConfig::default();
        for n in 1..=HOURS_IN_YEAR {
            let h = (n - 1) % HOURS_PER_DAY;
            let ts = reconstruct_timestamp(n, h, &cfg).unwrap();
            assert_eq!(ts.year(), DEFAULT_REFERENCE_YEAR);
            assert!(!(ts.month() == 2 && ts.day() == 29));
        }
    }

    #[test]
    fn test_reconstruction_is_idempotent_under_rederivation() {
        let cfg = CalendarConfig::default();
        for n in (1..=HOURS_IN_YEAR).step_by(7) {
            for h in [0, 5, 12, 23] {
                let ts = reconstruct_timestamp(n, h, &cfg).unwrap();
                let (n2, h2) = hour_of_year(&ts, &cfg).unwrap();
                assert_eq!(h2, h);
                assert_eq!(reconstruct_timestamp(n2, h2, &cfg).unwrap(), ts);
            }
        }
    }

    #[test]
    fn test_wraparound_aliases_next_year() {
        let cfg = CalendarConfig::default();
        let a = reconstruct_timestamp(1, 0, &cfg).unwrap();
        let b = reconstruct_timestamp(HOURS_IN_YEAR + 1, 0, &cfg).unwrap();
        assert_eq!(a, b);

        let c = reconstruct_timestamp(2 * HOURS_IN_YEAR + 100, 3, &cfg).unwrap();
        let d = reconstruct_timestamp(100, 3, &cfg).unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn test_leap_structured_source() {
        let cfg = CalendarConfig {
            reference_year: 2024,
            hours_in_year: HOURS_IN_LEAP_YEAR,
        };
        cfg.validate().unwrap();
        let feb29 = reconstruct_timestamp(59 * 24 + 1, 0, &cfg).unwrap();
        assert_eq!((feb29.month(), feb29.day()), (2, 29));

        let last = reconstruct_timestamp(HOURS_IN_LEAP_YEAR, 23, &cfg).unwrap();
        assert_eq!(last.to_string(), "2024-12-31 23:00:00");
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let cfg = CalendarConfig {
            reference_year: 2023,
            hours_in_year: HOURS_IN_LEAP_YEAR,
        };
        assert!(cfg.validate().is_err());

        let cfg = CalendarConfig {
            reference_year: 2023,
            hours_in_year: 8000,
        };
        assert!(matches!(
            cfg.validate(),
            Err(VarError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let cfg = CalendarConfig::default();
        assert!(matches!(
            reconstruct_timestamp(0, 0, &cfg),
            Err(VarError::InvalidInput(_))
        ));
        assert!(matches!(
            reconstruct_timestamp(10, 24, &cfg),
            Err(VarError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_feb29_has_no_hour_index_in_common_year() {
        let cfg = CalendarConfig {
            reference_year: 2024,
            hours_in_year: HOURS_IN_YEAR,
        };
        let ts = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(hour_of_year(&ts, &cfg).is_err());
    }

    #[test]
    fn test_matches_encoded_date() {
        let cfg = CalendarConfig::default();
        let ts = reconstruct_timestamp(24 * 40 + 1, 0, &cfg).unwrap();
        assert!(matches_encoded_date(&ts, 2, 10));
        assert!(!matches_encoded_date(&ts, 2, 11));
    }
}
