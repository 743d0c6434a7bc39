//! Identifier Generator - Daily Stamped Document IDs
//!
//! `<prefix>-YYYY-MM-DD`, where the date is the local calendar date in the
//! configured zone, not UTC. Recompute per render; never cache across days.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),
}

pub fn parse_time_zone(name: &str) -> Result<Tz, IdentifierError> {
    name.parse::<Tz>()
        .map_err(|_| IdentifierError::UnknownTimeZone(name.to_string()))
}

/// Calendar date of `now` in `time_zone`, zero padded.
pub fn local_date(now: DateTime<Utc>, time_zone: &str) -> Result<String, IdentifierError> {
    let tz = parse_time_zone(time_zone)?;
    Ok(now.with_timezone(&tz).format("%Y-%m-%d").to_string())
}

pub fn current_identifier(
    prefix: &str,
    now: DateTime<Utc>,
    time_zone: &str,
) -> Result<String, IdentifierError> {
    Ok(format!("{}-{}", prefix, local_date(now, time_zone)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PREFIX: &str = "DRR-TRUSTBOT-ALPHA-CEC1-SENTINEL-FCPS1.0";

    #[test]
    fn test_date_rolls_back_behind_utc() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 4, 0, 0).unwrap();
        let id = current_identifier(PREFIX, now, "America/New_York").unwrap();
        assert_eq!(id, "DRR-TRUSTBOT-ALPHA-CEC1-SENTINEL-FCPS1.0-2024-03-04");
    }

    #[test]
    fn test_same_day_after_local_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
        assert_eq!(local_date(now, "America/New_York").unwrap(), "2024-03-05");
    }

    #[test]
    fn test_daylight_saving_offset_applied() {
        // EDT is UTC-4: 03:30Z on 1 July is still 30 June in New York.
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 3, 30, 0).unwrap();
        assert_eq!(local_date(now, "America/New_York").unwrap(), "2024-06-30");
    }

    #[test]
    fn test_zone_ahead_of_utc() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 20, 0, 0).unwrap();
        assert_eq!(local_date(now, "Asia/Tokyo").unwrap(), "2025-01-01");
    }

    #[test]
    fn test_unknown_zone() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 4, 0, 0).unwrap();
        let err = current_identifier(PREFIX, now, "Nowhere/Special").unwrap_err();
        assert_eq!(err, IdentifierError::UnknownTimeZone("Nowhere/Special".to_string()));
    }
}
