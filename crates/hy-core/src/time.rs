//! Epoch seconds to the calendar fields used by HYSPLIT text inputs.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::{HyError, HyResult};

/// Release/sampling time meaning "relative to model start".
pub const ZERO_STAMP: &str = "00 00 00 00 00";

pub const SECONDS_PER_HOUR: i64 = 3600;

/// UTC calendar fields of an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl CalendarTime {
    pub fn from_epoch(epoch: i64) -> HyResult<Self> {
        let t: DateTime<Utc> =
            DateTime::from_timestamp(epoch, 0).ok_or(HyError::EpochOutOfRange { epoch })?;
        Ok(Self {
            year: t.year(),
            month: t.month(),
            day: t.day(),
            hour: t.hour(),
            minute: t.minute(),
        })
    }

    /// `YY MM DD HH mm` as used on CONTROL time lines.
    pub fn control_stamp(&self) -> String {
        format!(
            "{:02} {:02} {:02} {:02} {:02}",
            self.year.rem_euclid(100),
            self.month,
            self.day,
            self.hour,
            self.minute
        )
    }

    /// `YYYY MM DD HH` as used on EMITIMES cycle headers.
    pub fn emitimes_hour_stamp(&self) -> String {
        format!(
            "{:04} {:02} {:02} {:02}",
            self.year, self.month, self.day, self.hour
        )
    }

    /// `YYYY MM DD HH mm` as used on EMITIMES records.
    pub fn emitimes_minute_stamp(&self) -> String {
        format!("{} {:02}", self.emitimes_hour_stamp(), self.minute)
    }
}

pub fn control_stamp(epoch: i64) -> HyResult<String> {
    Ok(CalendarTime::from_epoch(epoch)?.control_stamp())
}

/// Whole run hours between two epochs, rounded to nearest, signed by `sign`.
pub fn signed_run_hours(start_epoch: i64, end_epoch: i64, sign: i64) -> i64 {
    let secs = (end_epoch - start_epoch).abs();
    let hours = (secs + SECONDS_PER_HOUR / 2) / SECONDS_PER_HOUR;
    hours * sign.signum()
}

/// Duration in `hhmm` (zero padded, hours may exceed two digits).
pub fn duration_hhmm(seconds: i64) -> String {
    let minutes = seconds.max(0) / 60;
    format!("{:02}{:02}", minutes / 60, minutes % 60)
}

/// Duration in whole hours, rounded up.
pub fn duration_hours_ceil(seconds: i64) -> i64 {
    let seconds = seconds.max(0);
    (seconds + SECONDS_PER_HOUR - 1) / SECONDS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn control_stamp_of_payload_start() {
        // 2025-12-01 00:00:00 UTC
        assert_eq!(control_stamp(1_764_547_200).unwrap(), "25 12 01 00 00");
    }

    #[test]
    fn emitimes_stamps() {
        // 2025-04-07 02:30:00 UTC
        let t = CalendarTime::from_epoch(1_743_993_000).unwrap();
        assert_eq!(t.emitimes_hour_stamp(), "2025 04 07 02");
        assert_eq!(t.emitimes_minute_stamp(), "2025 04 07 02 30");
    }

    #[test]
    fn out_of_range_epoch_is_error() {
        assert_eq!(
            CalendarTime::from_epoch(i64::MAX),
            Err(HyError::EpochOutOfRange { epoch: i64::MAX })
        );
    }

    #[test]
    fn run_hours_sign_follows_direction() {
        assert_eq!(signed_run_hours(0, 72_000, 1), 20);
        assert_eq!(signed_run_hours(72_000, 0, -1), -20);
        assert_eq!(signed_run_hours(0, 5_400, 1), 2);
    }

    #[test]
    fn hhmm_formatting() {
        assert_eq!(duration_hhmm(1_200), "0020");
        assert_eq!(duration_hhmm(3_600 * 3 + 60 * 5), "0305");
        assert_eq!(duration_hhmm(3_600 * 120), "12000");
    }

    #[test]
    fn ceil_hours() {
        assert_eq!(duration_hours_ceil(0), 0);
        assert_eq!(duration_hours_ceil(1), 1);
        assert_eq!(duration_hours_ceil(3_600), 1);
        assert_eq!(duration_hours_ceil(3_601), 2);
    }

    proptest! {
        #[test]
        fn run_hours_magnitude_is_direction_independent(a in 0_i64..2_000_000_000, b in 0_i64..2_000_000_000) {
            prop_assert_eq!(signed_run_hours(a, b, 1), -signed_run_hours(a, b, -1));
            prop_assert!(signed_run_hours(a, b, 1) >= 0);
        }
    }
}
