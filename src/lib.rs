//! Word clock watch face for the PineTime.
//!
//! The library holds everything that does not touch hardware: the German
//! phrase table, the text layout, the watch face engine with its timers and
//! the complication plumbing. The firmware binary (feature `firmware`) binds
//! it to the display, touch panel, button and battery.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod complication;
pub mod config;
pub mod engine;
pub mod phrase;
pub mod system;
pub mod ui;

#[cfg(feature = "firmware")]
pub mod peripherals;
