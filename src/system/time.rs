//! Time keeping module
//!
//! The watch has no battery-backed calendar, only a monotonic uptime counter.
//! Wall-clock time is a reference point (set at flashing or by a companion)
//! plus the uptime elapsed since.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike};

/// Wall-clock time paired with the uptime it was taken at
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeReference {
    /// Milliseconds since the Unix epoch, UTC
    epoch_millis: i64,
    /// Related system uptime
    uptime_millis: u64,
}

impl TimeReference {
    /// Create new time reference from a Unix timestamp
    pub const fn from_epoch_millis(epoch_millis: i64, uptime_millis: u64) -> Self {
        Self {
            epoch_millis,
            uptime_millis,
        }
    }

    /// Create new time reference from a UTC `NaiveDateTime`
    pub fn from_datetime(time: NaiveDateTime, uptime_millis: u64) -> Self {
        Self::from_epoch_millis(time.and_utc().timestamp_millis(), uptime_millis)
    }

    /// Wall-clock milliseconds at the given uptime
    pub fn wall_millis(&self, uptime_millis: u64) -> i64 {
        let elapsed = uptime_millis.saturating_sub(self.uptime_millis);
        self.epoch_millis.saturating_add(elapsed as i64)
    }
}

/// Wall clock of the watch
pub struct TimeManager {
    reference: TimeReference,
    /// Offset of local time from UTC
    utc_offset_secs: i32,
}

impl TimeManager {
    /// Initialize time measurement on boot
    pub const fn init(reference: TimeReference, utc_offset_secs: i32) -> Self {
        Self {
            reference,
            utc_offset_secs,
        }
    }

    /// Current time in UTC milliseconds
    pub fn now_millis(&self, uptime_millis: u64) -> i64 {
        self.reference.wall_millis(uptime_millis)
    }

    pub fn utc_offset_secs(&self) -> i32 {
        self.utc_offset_secs
    }
}

/// Local date and time for a UTC timestamp.
///
/// Returns `None` for timestamps or offsets chrono cannot represent.
pub fn local_datetime(epoch_millis: i64, utc_offset_secs: i32) -> Option<NaiveDateTime> {
    let offset = FixedOffset::east_opt(utc_offset_secs)?;
    DateTime::from_timestamp_millis(epoch_millis)
        .map(|utc| utc.with_timezone(&offset).naive_local())
}

/// Hour and minute as shown on a 12-hour dial
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockReading {
    /// 1-12, noon and midnight read 12
    pub hour: u32,
    /// 0-59
    pub minute: u32,
}

impl ClockReading {
    pub fn from_datetime(time: &NaiveDateTime) -> Self {
        let (_pm, hour) = time.hour12();
        Self {
            hour,
            minute: time.minute(),
        }
    }
}
