//! PineTime hardware drivers used by the firmware

pub mod backlight;
pub mod battery;
pub mod button;
pub mod display;
pub mod touch;
