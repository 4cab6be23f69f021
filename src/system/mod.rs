//! Clock, battery and board configuration

pub mod battery;
pub mod time;

#[cfg(feature = "firmware")]
pub mod config;
