//! Watch face surface on top of embedded-graphics

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{AngleUnit, Point},
    mono_font::{ascii::FONT_6X10, iso_8859_1::FONT_10X20, MonoFont, MonoTextStyle},
    pixelcolor::Rgb565,
    primitives::{Arc, Circle, Line, Primitive, PrimitiveStyle, Rectangle},
    text::{renderer::TextRenderer, Alignment, Baseline, Text, TextStyleBuilder},
    Drawable,
};
use profont::PROFONT_12_POINT;

use super::{ComplicationVisual, Ink, Surface};
use crate::config::Palette;

/// Stroke width of complication outlines
const STROKE: u32 = 2;

/// Draws the watch face onto any RGB565 display or framebuffer
pub struct Canvas<D> {
    target: D,
    palette: Palette,
}

impl<D> Canvas<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub fn new(target: D) -> Self {
        Self {
            target,
            palette: Palette::default(),
        }
    }

    pub fn release(self) -> D {
        self.target
    }

    fn font(ink: Ink) -> &'static MonoFont<'static> {
        match ink {
            // Phrases need umlauts
            Ink::Text | Ink::Hour => &FONT_10X20,
            Ink::Misc => &PROFONT_12_POINT,
        }
    }

    fn color(&self, ink: Ink) -> Rgb565 {
        match ink {
            Ink::Text => self.palette.text,
            Ink::Hour => self.palette.hour,
            Ink::Misc => self.palette.misc,
        }
    }

    fn centered_text(
        &mut self,
        text: &str,
        center: Point,
        font: &MonoFont<'_>,
    ) -> Result<(), D::Error> {
        let style = MonoTextStyle::new(font, self.palette.text);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();
        Text::with_text_style(text, center, style, text_style).draw(&mut self.target)?;
        Ok(())
    }

    fn outline(&mut self, bounds: Rectangle, filled: bool) -> Result<Circle, D::Error> {
        let diameter = bounds.size.width.min(bounds.size.height);
        let circle = Circle::with_center(bounds.center(), diameter);
        let style = if filled {
            PrimitiveStyle::with_fill(self.palette.hour)
        } else {
            PrimitiveStyle::with_stroke(self.palette.text, STROKE)
        };
        circle.into_styled(style).draw(&mut self.target)?;
        Ok(circle)
    }
}

impl<D> Surface for Canvas<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    type Error = D::Error;

    fn clear(&mut self, palette: &Palette) -> Result<(), Self::Error> {
        self.palette = *palette;
        self.target.clear(palette.background)
    }

    fn text_width(&self, text: &str, ink: Ink) -> i32 {
        let style = MonoTextStyle::new(Self::font(ink), self.color(ink));
        style
            .measure_string(text, Point::zero(), Baseline::Alphabetic)
            .next_position
            .x
    }

    fn draw_text(&mut self, text: &str, position: Point, ink: Ink) -> Result<(), Self::Error> {
        let style = MonoTextStyle::new(Self::font(ink), self.color(ink));
        Text::with_baseline(text, position, style, Baseline::Alphabetic).draw(&mut self.target)?;
        Ok(())
    }

    fn draw_complication(
        &mut self,
        bounds: Rectangle,
        visual: ComplicationVisual<'_>,
        ambient: bool,
    ) -> Result<(), Self::Error> {
        if bounds.size.width == 0 || bounds.size.height == 0 {
            return Ok(());
        }
        let center = bounds.center();

        match visual {
            ComplicationVisual::Blank => {}
            ComplicationVisual::AddPlaceholder => {
                let circle = self.outline(bounds, false)?;
                let arm = circle.diameter as i32 / 4;
                let style = PrimitiveStyle::with_stroke(self.palette.text, STROKE);
                Line::new(center - Point::new(arm, 0), center + Point::new(arm, 0))
                    .into_styled(style)
                    .draw(&mut self.target)?;
                Line::new(center - Point::new(0, arm), center + Point::new(0, arm))
                    .into_styled(style)
                    .draw(&mut self.target)?;
            }
            ComplicationVisual::ShortText { text, title } => {
                self.outline(bounds, false)?;
                match title {
                    Some(title) => {
                        self.centered_text(text, center - Point::new(0, 6), &FONT_6X10)?;
                        self.centered_text(title, center + Point::new(0, 6), &FONT_6X10)?;
                    }
                    None => self.centered_text(text, center, &FONT_6X10)?,
                }
            }
            ComplicationVisual::RangedValue {
                value,
                min,
                max,
                text,
            } => {
                let circle = self.outline(bounds, false)?;
                let span = (max - min).max(1) as f32;
                let fraction = ((value - min) as f32 / span).clamp(0.0, 1.0);
                Arc::with_center(
                    center,
                    circle.diameter,
                    (-90.0f32).deg(),
                    (360.0 * fraction).deg(),
                )
                .into_styled(PrimitiveStyle::with_stroke(self.palette.hour, STROKE + 1))
                .draw(&mut self.target)?;
                if let Some(text) = text {
                    self.centered_text(text, center, &FONT_6X10)?;
                }
            }
            ComplicationVisual::Icon(_) => {
                // Icons are provider resources the watch can not load, show a dot
                self.outline(bounds, !ambient)?;
            }
            ComplicationVisual::NoPermission => {
                self.outline(bounds, false)?;
                self.centered_text("?", center, &FONT_10X20)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        complication::{ComplicationBridge, ComplicationData, COMPLICATION_ID},
        config::WatchFaceConfig,
        ui::{TextWatchFace, WatchFace, WatchFaceState},
    };
    use chrono::NaiveDate;
    use embedded_graphics::{
        mock_display::MockDisplay,
        pixelcolor::RgbColor,
    };

    fn canvas() -> Canvas<MockDisplay<Rgb565>> {
        let mut display = MockDisplay::new();
        display.set_allow_out_of_bounds_drawing(true);
        display.set_allow_overdraw(true);
        Canvas::new(display)
    }

    #[test]
    fn measures_with_the_phrase_font() {
        let canvas = canvas();
        assert_eq!(canvas.text_width("zwölf", Ink::Text), 50);
        assert_eq!(canvas.text_width("zwölf", Ink::Hour), 50);
        assert_eq!(canvas.text_width("", Ink::Text), 0);
    }

    #[test]
    fn hour_words_use_hour_colour() {
        let mut canvas = canvas();
        canvas.clear(&Palette::default()).unwrap();
        canvas
            .draw_text("elf", Point::new(0, 16), Ink::Hour)
            .unwrap();
        let display = canvas.release();
        let mut colors = (0..30)
            .flat_map(|x| (0..20).map(move |y| Point::new(x, y)))
            .filter_map(|p| display.get_pixel(p));
        assert!(colors.any(|c| c == Rgb565::RED));
    }

    #[test]
    fn full_frame_renders() {
        let mut bridge = ComplicationBridge::default();
        bridge.on_surface_changed(64, 64, 2);
        bridge.on_complication_data_update(
            COMPLICATION_ID,
            ComplicationData::ranged_value(40, 0, 100).with_text("40"),
        );
        let state = WatchFaceState {
            time: NaiveDate::from_ymd_opt(2024, 3, 3)
                .unwrap()
                .and_hms_opt(10, 25, 0)
                .unwrap(),
            now_millis: 0,
            percent: Some(40),
            show_date: false,
            ambient: false,
            center: Point::new(32, 32),
            palette: Palette::default(),
            complications: &bridge,
        };
        let mut canvas = canvas();
        TextWatchFace::new(WatchFaceConfig::default())
            .draw(&mut canvas, &state)
            .unwrap();
        let display = canvas.release();
        assert_eq!(display.get_pixel(Point::new(0, 63)), Some(Rgb565::BLACK));
    }
}
