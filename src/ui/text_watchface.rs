//! Word clock watchface

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use embedded_graphics::geometry::Point;

use super::{layout::layout, ComplicationVisual, Ink, Surface, WatchFace, WatchFaceState};
use crate::{
    config::WatchFaceConfig,
    phrase::{phrase_for, Role},
    system::time::ClockReading,
};

const BUF_LEN: usize = 32;

/// Spaces between the digital time and the battery level
const MISC_GAP: &str = "         ";

/// Time as German words, with a date view and a misc line
pub struct TextWatchFace {
    config: WatchFaceConfig,
}

impl TextWatchFace {
    pub fn new(config: WatchFaceConfig) -> Self {
        Self { config }
    }

    /// Phrase for the current time, centred on the screen
    fn draw_phrase<S: Surface>(
        &self,
        surface: &mut S,
        time: &NaiveDateTime,
        center: Point,
    ) -> Result<(), S::Error> {
        let reading = ClockReading::from_datetime(time);
        let phrase = phrase_for(reading.hour, reading.minute);

        let spans = match layout(phrase.tokens(), center, self.config.text_size, |text| {
            surface.text_width(text, Ink::Text)
        }) {
            Ok(spans) => spans,
            Err(e) => {
                error!("Could not lay out phrase: {:?}", e);
                return Ok(());
            }
        };

        for span in spans.iter() {
            let ink = match span.role {
                Role::HourWord => Ink::Hour,
                Role::FillerWord => Ink::Text,
            };
            surface.draw_text(&span.text, span.position, ink)?;
        }
        Ok(())
    }

    /// Weekday above the centre, date below
    fn draw_date<S: Surface>(
        &self,
        surface: &mut S,
        time: &NaiveDateTime,
        center: Point,
    ) -> Result<(), S::Error> {
        let text_size = self.config.text_size;

        let weekday = weekday_name(time.weekday());
        let width = surface.text_width(weekday, Ink::Text);
        surface.draw_text(
            weekday,
            Point::new(center.x - width / 2, center.y - text_size),
            Ink::Hour,
        )?;

        let mut buf = [0u8; BUF_LEN];
        let Ok(date) = format_no_std::show(
            &mut buf,
            format_args!("{:02}.{:02}.{:04}", time.day(), time.month(), time.year()),
        ) else {
            return Ok(());
        };
        let width = surface.text_width(date, Ink::Text);
        surface.draw_text(
            date,
            Point::new(center.x - width / 2, center.y + text_size),
            Ink::Text,
        )
    }

    /// Digital time and battery level along the top edge
    fn draw_misc<S: Surface>(
        &self,
        surface: &mut S,
        time: &NaiveDateTime,
        percent: Option<u8>,
        center: Point,
    ) -> Result<(), S::Error> {
        let mut buf = [0u8; BUF_LEN];
        let Ok(text) = format_no_std::show(
            &mut buf,
            format_args!(
                "{:02}:{:02}{}{}%",
                time.hour(),
                time.minute(),
                MISC_GAP,
                percent.unwrap_or(0)
            ),
        ) else {
            return Ok(());
        };
        let width = surface.text_width(text, Ink::Misc);
        surface.draw_text(
            text,
            Point::new(
                center.x - width / 2,
                self.config.text_size + self.config.misc_offset,
            ),
            Ink::Misc,
        )
    }

    fn draw_complications<S: Surface>(
        &self,
        surface: &mut S,
        state: &WatchFaceState<'_>,
    ) -> Result<(), S::Error> {
        for slot in state.complications.slots() {
            let visual = ComplicationVisual::for_data(slot.data.as_ref(), state.now_millis);
            surface.draw_complication(slot.bounds, visual, state.ambient)?;
        }
        Ok(())
    }
}

impl WatchFace for TextWatchFace {
    fn draw<S: Surface>(
        &self,
        surface: &mut S,
        state: &WatchFaceState<'_>,
    ) -> Result<(), S::Error> {
        surface.clear(&state.palette)?;
        if state.show_date {
            self.draw_date(surface, &state.time, state.center)?;
        } else {
            self.draw_phrase(surface, &state.time, state.center)?;
        }
        self.draw_misc(surface, &state.time, state.percent, state.center)?;
        self.draw_complications(surface, state)
    }
}

/// German name of a weekday
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Montag",
        Weekday::Tue => "Dienstag",
        Weekday::Wed => "Mittwoch",
        Weekday::Thu => "Donnerstag",
        Weekday::Fri => "Freitag",
        Weekday::Sat => "Samstag",
        Weekday::Sun => "Sonntag",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        complication::{ComplicationBridge, ComplicationData, COMPLICATION_ID},
        config::Palette,
        ui::tests::{Op, RecordingSurface},
    };
    use chrono::NaiveDate;

    fn time(h: u32, m: u32) -> NaiveDateTime {
        // A Sunday
        NaiveDate::from_ymd_opt(2024, 3, 3)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn draw(state: &WatchFaceState<'_>) -> RecordingSurface {
        let face = TextWatchFace::new(WatchFaceConfig::default());
        let mut surface = RecordingSurface::default();
        face.draw(&mut surface, state).unwrap();
        surface
    }

    fn state(
        bridge: &ComplicationBridge,
        time: NaiveDateTime,
        show_date: bool,
    ) -> WatchFaceState<'_> {
        WatchFaceState {
            time,
            now_millis: 0,
            percent: Some(87),
            show_date,
            ambient: false,
            center: Point::new(120, 120),
            palette: Palette::default(),
            complications: bridge,
        }
    }

    #[test]
    fn frame_draws_phrase_misc_and_complication() {
        let mut bridge = ComplicationBridge::default();
        bridge.on_surface_changed(240, 240, 15);
        let surface = draw(&state(&bridge, time(22, 5), false));
        let misc = format!("22:05{}87%", MISC_GAP);

        assert_eq!(surface.ops[0], Op::Clear(Palette::default()));
        assert_eq!(
            surface.texts(),
            [
                ("fünf nach", Point::new(75, 110), Ink::Text),
                ("zehn", Point::new(100, 140), Ink::Hour),
                // 17 characters at 5 px
                (misc.as_str(), Point::new(78, 30), Ink::Misc),
            ]
        );
        let slot = bridge.slot(COMPLICATION_ID).unwrap();
        assert_eq!(
            surface.ops.last(),
            Some(&Op::Complication(slot.bounds, "AddPlaceholder".into(), false))
        );
    }

    #[test]
    fn date_view_replaces_phrase() {
        let bridge = ComplicationBridge::default();
        let surface = draw(&state(&bridge, time(9, 41), true));
        let texts = surface.texts();
        assert_eq!(texts[0], ("Sonntag", Point::new(85, 100), Ink::Hour));
        assert_eq!(texts[1], ("03.03.2024", Point::new(70, 140), Ink::Text));
        assert_eq!(texts[2].0, format!("09:41{}87%", MISC_GAP));
    }

    #[test]
    fn unknown_battery_reads_zero() {
        let bridge = ComplicationBridge::default();
        let mut state = state(&bridge, time(12, 0), false);
        state.percent = None;
        let surface = draw(&state);
        assert_eq!(surface.texts()[2].0, format!("12:00{}0%", MISC_GAP));
    }

    #[test]
    fn complication_data_is_forwarded() {
        let mut bridge = ComplicationBridge::default();
        bridge.on_complication_data_update(COMPLICATION_ID, ComplicationData::short_text("5k"));
        let mut state = state(&bridge, time(12, 0), false);
        state.ambient = true;
        let surface = draw(&state);
        assert!(matches!(
            surface.ops.last(),
            Some(Op::Complication(_, visual, true)) if visual.starts_with("ShortText")
        ));
    }
}
