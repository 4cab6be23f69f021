//! Battery status check
//!
//! Implementation based upon https://github.com/dbrgn/pinetime-rtic/blob/master/pinetime-rtic/src/battery.rs
//! and https://wiki.pine64.org/wiki/PineTime.

use embassy_nrf::{
    gpio::{AnyPin, Input},
    saadc::Saadc,
};

use crate::system::battery::{millivolts_from_adc, percent_from_voltage, Error};

/// Snapshot of the battery
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct BatteryInfo {
    pub charging: bool,
    pub millivolts: u16,
    /// Estimated capacity, 0–100
    pub percent: u8,
}

pub struct Battery {
    /// Pin P0.12: High = battery, Low = charging
    pin_charge_indication: Input<'static, AnyPin>,
    /// ADC sampling the halved battery voltage on P0.31
    saadc: Saadc<'static, 1>,
    info: Option<BatteryInfo>,
}

impl Battery {
    /// Configure battery settings on boot
    pub fn init(pin_charge_indication: Input<'static, AnyPin>, saadc: Saadc<'static, 1>) -> Self {
        Self {
            pin_charge_indication,
            saadc,
            info: None,
        }
    }

    /// Last reading, `None` before the first successful `update()`
    pub fn info(&self) -> Option<BatteryInfo> {
        self.info
    }

    /// Sample the hardware. Returns whether the reading changed.
    pub async fn update(&mut self) -> Result<bool, Error> {
        let mut buf = [0; 1];
        self.saadc.sample(&mut buf).await;
        let millivolts = millivolts_from_adc(buf[0])?;

        let info = BatteryInfo {
            charging: self.pin_charge_indication.is_low(),
            millivolts,
            percent: percent_from_voltage(millivolts),
        };
        let changed = self.info.map_or(true, |old| {
            old.charging != info.charging || old.percent != info.percent
        });
        self.info = Some(info);
        Ok(changed)
    }
}
