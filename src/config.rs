//! Watch face configuration

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

/// Colours used by the watch face
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb565,
    /// Filler words and the date digits
    pub text: Rgb565,
    /// Hour names and the weekday
    pub hour: Rgb565,
    /// Digital time and battery line
    pub misc: Rgb565,
}

impl Palette {
    /// Two-colour variant for displays in low-bit ambient mode.
    pub const fn low_bit(self) -> Self {
        Self {
            background: Rgb565::BLACK,
            text: self.text,
            hour: self.text,
            misc: self.text,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb565::BLACK,
            text: Rgb565::WHITE,
            hour: Rgb565::RED,
            misc: Rgb565::WHITE,
        }
    }
}

/// Layout and timing settings of the watch face
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchFaceConfig {
    /// Height of a phrase line in pixels, also used as line spacing
    pub text_size: i32,
    /// Distance of the misc line baseline below `text_size`
    pub misc_offset: i32,
    /// Gap between the complication and the bottom edge
    pub complication_margin: i32,
    /// Tick period in interactive mode
    pub update_rate_ms: i64,
    /// How long a tap keeps the date on screen
    pub date_duration_ms: i64,
    /// Offset of local time from UTC
    pub utc_offset_secs: i32,
    pub palette: Palette,
}

impl WatchFaceConfig {
    pub const fn with_utc_offset(mut self, secs: i32) -> Self {
        self.utc_offset_secs = secs;
        self
    }

    pub const fn with_text_size(mut self, text_size: i32) -> Self {
        self.text_size = text_size;
        self
    }

    pub const fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }
}

impl Default for WatchFaceConfig {
    fn default() -> Self {
        Self {
            text_size: 20,
            misc_offset: 10,
            complication_margin: 15,
            update_rate_ms: 1_000,
            date_duration_ms: 3_000,
            utc_offset_secs: 0,
            palette: Palette::default(),
        }
    }
}
