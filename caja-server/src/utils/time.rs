//! Time helpers - business timezone conversion
//!
//! All date-to-timestamp conversion happens at the API handler layer;
//! the repository layer only sees `i64` Unix millis and frozen
//! `YYYY-MM-DD` business dates.

use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse a time-of-day string (HH:MM or HH:MM:SS)
pub fn parse_time(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| AppError::validation(format!("Invalid time format: {}", time)))
}

/// Validate a date is not in the future (business timezone)
pub fn validate_not_future(date: NaiveDate, tz: Tz) -> AppResult<()> {
    let today = chrono::Utc::now().with_timezone(&tz).date_naive();
    if date > today {
        return Err(AppError::validation(format!(
            "Date {} is in the future (today is {})",
            date, today
        )));
    }
    Ok(())
}

/// Date + time of day -> Unix millis (business timezone)
///
/// DST gap fallback: if the local time does not exist, fall back to UTC.
pub fn date_time_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Parse a cutoff time string (HH:MM); falls back to 00:00
pub fn parse_cutoff(cutoff: &str) -> NaiveTime {
    NaiveTime::parse_from_str(cutoff, "%H:%M").unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse business_day_cutoff '{}': {}, falling back to 00:00",
            cutoff,
            e
        );
        NaiveTime::MIN
    })
}

/// Business date for a given instant (business timezone)
///
/// Times before the cutoff still belong to the previous business date.
pub fn business_date_at(millis: i64, cutoff: NaiveTime, tz: Tz) -> NaiveDate {
    let local = chrono::DateTime::from_timestamp_millis(millis)
        .unwrap_or_else(chrono::Utc::now)
        .with_timezone(&tz);
    if local.time() < cutoff {
        (local - chrono::Duration::days(1)).date_naive()
    } else {
        local.date_naive()
    }
}

/// Current business date (business timezone)
pub fn current_business_date(cutoff: NaiveTime, tz: Tz) -> NaiveDate {
    business_date_at(shared::util::now_millis(), cutoff, tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Madrid;

    #[test]
    fn parse_date_accepts_iso_and_rejects_garbage() {
        assert!(parse_date("2026-03-15").is_ok());
        assert!(parse_date("15/03/2026").is_err());
    }

    #[test]
    fn parse_time_accepts_both_precisions() {
        assert!(parse_time("08:30").is_ok());
        assert!(parse_time("08:30:15").is_ok());
        assert!(parse_time("8h30").is_err());
    }

    #[test]
    fn cutoff_shifts_early_morning_to_previous_date() {
        let cutoff = parse_cutoff("02:00");
        // 2026-03-15 01:30 Madrid (CET, +01:00) -> still business date 2026-03-14
        let millis = date_time_to_millis(
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            NaiveTime::from_hms_opt(1, 30, 0).unwrap(),
            Madrid,
        );
        assert_eq!(
            business_date_at(millis, cutoff, Madrid),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
        );
        // 03:00 the same morning already belongs to the 15th
        let millis = date_time_to_millis(
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            NaiveTime::from_hms_opt(3, 0, 0).unwrap(),
            Madrid,
        );
        assert_eq!(
            business_date_at(millis, cutoff, Madrid),
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
        );
    }

    #[test]
    fn midnight_cutoff_matches_local_date() {
        let cutoff = parse_cutoff("00:00");
        let millis = date_time_to_millis(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveTime::from_hms_opt(0, 0, 1).unwrap(),
            Madrid,
        );
        assert_eq!(
            business_date_at(millis, cutoff, Madrid),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }
}
