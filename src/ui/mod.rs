//! UI definitions module
//! Based on: https://github.com/lupyuen/pinetime-watchface/blob/master/src/lib.rs

use chrono::NaiveDateTime;
use embedded_graphics::{geometry::Point, primitives::Rectangle};

use crate::{
    complication::{ComplicationBridge, ComplicationData, ComplicationType, IconId},
    config::Palette,
};

pub mod canvas;
pub mod layout;
pub mod text_watchface;

pub use canvas::Canvas;
pub use text_watchface::TextWatchFace;

/// Paint a piece of text is drawn with
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ink {
    /// Filler words and date digits
    Text,
    /// Hour names and the weekday
    Hour,
    /// Digital time and battery
    Misc,
}

/// What to show inside a complication's bounding box
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComplicationVisual<'a> {
    /// No provider chosen yet
    AddPlaceholder,
    /// Nothing to show this frame
    Blank,
    ShortText {
        text: &'a str,
        title: Option<&'a str>,
    },
    RangedValue {
        value: i32,
        min: i32,
        max: i32,
        text: Option<&'a str>,
    },
    Icon(IconId),
    NoPermission,
}

impl<'a> ComplicationVisual<'a> {
    pub fn for_data(data: Option<&'a ComplicationData>, now_millis: i64) -> Self {
        let Some(data) = data else {
            return Self::AddPlaceholder;
        };
        if !data.is_active(now_millis) {
            return Self::Blank;
        }
        match data.kind() {
            ComplicationType::NotConfigured => Self::AddPlaceholder,
            ComplicationType::NoData | ComplicationType::Empty => Self::Blank,
            ComplicationType::NoPermission => Self::NoPermission,
            ComplicationType::ShortText => Self::ShortText {
                text: data.text().unwrap_or(""),
                title: data.title(),
            },
            ComplicationType::RangedValue => {
                let (value, min, max) = data.range();
                Self::RangedValue {
                    value,
                    min,
                    max,
                    text: data.text(),
                }
            }
            ComplicationType::Icon | ComplicationType::SmallImage => match data.icon_id() {
                Some(icon) => Self::Icon(icon),
                None => Self::Blank,
            },
        }
    }
}

/// Drawing surface the watch face renders onto
pub trait Surface {
    type Error;

    /// Fill the background and switch to the palette for this frame
    fn clear(&mut self, palette: &Palette) -> Result<(), Self::Error>;

    /// Advance width of `text` in pixels
    fn text_width(&self, text: &str, ink: Ink) -> i32;

    /// Draw `text` with its baseline starting at `position`
    fn draw_text(&mut self, text: &str, position: Point, ink: Ink) -> Result<(), Self::Error>;

    fn draw_complication(
        &mut self,
        bounds: Rectangle,
        visual: ComplicationVisual<'_>,
        ambient: bool,
    ) -> Result<(), Self::Error>;
}

pub trait WatchFace {
    /// Draw one frame of the watch face
    fn draw<S: Surface>(
        &self,
        surface: &mut S,
        state: &WatchFaceState<'_>,
    ) -> Result<(), S::Error>;
}

/// State for the watch face
pub struct WatchFaceState<'a> {
    /// Local time
    pub time: NaiveDateTime,
    /// UTC milliseconds, for complication validity
    pub now_millis: i64,
    pub percent: Option<u8>,
    pub show_date: bool,
    pub ambient: bool,
    pub center: Point,
    pub palette: Palette,
    pub complications: &'a ComplicationBridge,
}
