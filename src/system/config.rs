//! Board configuration of the watch

use embassy_nrf::{
    config::{Config, Debug, HfclkSource, LfclkSource},
    interrupt::Priority,
};

/// Settings that are fixed when the firmware is flashed
#[derive(Clone, Copy, Debug, defmt::Format)]
pub struct SystemConfig {
    /// Offset of local time from UTC in seconds
    pub timezone: i32,
    /// Inactivity after which the watch face drops into ambient mode
    pub ambient_timeout_ms: u64,
    /// Backlight level while interactive, 0–7
    pub brightness_active: u8,
    /// Backlight level in ambient mode, 0–7
    pub brightness_ambient: u8,
    /// Keep the SWD port open for probe-rs/RTT
    pub debug_probe: bool,
}

impl SystemConfig {
    pub const fn new() -> Self {
        Self {
            timezone: 1 * 3_600,
            ambient_timeout_ms: 15_000,
            brightness_active: 5,
            brightness_ambient: 1,
            debug_probe: true,
        }
    }

    /// Peripheral setup for `embassy_nrf::init`
    pub fn nrf(&self) -> Config {
        // Config is `non_exhaustive`, start from the defaults
        let mut config = Config::default();

        // Set high-frequency and low-frequency clock sources to external
        config.hfclk_source = HfclkSource::ExternalXtal;
        config.lfclk_source = LfclkSource::ExternalXtal;

        // Enable DC/DC regulator to massively reduce runtime current consumption
        config.dcdc.reg1 = true;

        // GPIOTE (touch, button) and the RTC time driver share one level
        config.gpiote_interrupt_priority = Priority::P2;
        config.time_interrupt_priority = Priority::P2;

        config.debug = if self.debug_probe {
            Debug::Allowed
        } else {
            Debug::Disallowed
        };

        config
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self::new()
    }
}
