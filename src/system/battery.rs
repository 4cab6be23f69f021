//! Battery level conversions
//!
//! Voltage curve based upon https://github.com/dbrgn/pinetime-rtic/blob/master/pinetime-rtic/src/battery.rs
//! and https://wiki.pine64.org/wiki/PineTime.

use core::fmt;

/// Battery percentage from a `level` out of `scale` reading.
///
/// Unreadable readings (negative level, non-positive scale) give `None`,
/// levels above the scale read as 100.
pub fn percent_from_level(level: i32, scale: i32) -> Option<u8> {
    if level < 0 || scale <= 0 {
        return None;
    }
    let percent = (level as i64 * 100 / scale as i64).min(100);
    Some(percent as u8)
}

/// Estimated capacity in percent for a battery voltage in millivolts.
pub fn percent_from_voltage(millivolts: u16) -> u8 {
    // Use fixed data points and linear interpolation in between
    (match millivolts {
        0..=3449 => 0,
        3450..=3699 => (millivolts - 3450) / 5,
        3700..=4199 => 50 + (millivolts - 3700) / 10,
        _ => 100,
    }) as u8
}

/// Convert a 12 bit SAADC sample of the battery divider into millivolts.
pub fn millivolts_from_adc(raw_measurement: i16) -> Result<u16, Error> {
    match raw_measurement {
        0..=4095 => {
            // Use u32 during calculation to prevent overflow
            let adc_val = raw_measurement as u32;
            // Multiply by 2 * 1000 for mV and divide by (2 ^ 12 / 3.3V reference)
            Ok((adc_val * 2000 / 1241) as u16)
        }
        _ => Err(Error::InvalidMeasurement),
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    InvalidMeasurement,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidMeasurement => f.write_str("ADC sample out of range"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_and_scale() {
        assert_eq!(percent_from_level(50, 100), Some(50));
        assert_eq!(percent_from_level(1, 3), Some(33));
        assert_eq!(percent_from_level(255, 255), Some(100));
        assert_eq!(percent_from_level(-1, -1), None);
        assert_eq!(percent_from_level(10, 0), None);
    }

    #[test]
    fn level_above_scale_reads_full() {
        assert_eq!(percent_from_level(150, 100), Some(100));
        assert_eq!(percent_from_level(i32::MAX, 1), Some(100));
    }

    #[test]
    fn voltage_curve() {
        assert_eq!(percent_from_voltage(3300), 0);
        assert_eq!(percent_from_voltage(3450), 0);
        assert_eq!(percent_from_voltage(3700), 50);
        assert_eq!(percent_from_voltage(3950), 75);
        assert_eq!(percent_from_voltage(4300), 100);
    }

    #[test]
    fn adc_conversion() {
        assert_eq!(millivolts_from_adc(0), Ok(0));
        assert_eq!(millivolts_from_adc(2482), Ok(4000));
        assert_eq!(millivolts_from_adc(-3), Err(Error::InvalidMeasurement));
    }
}
