//! Touch controller module for PineTime

use cst816s::{TouchGesture, CST816S};
use embassy_nrf::{
    gpio::{AnyPin, Input, Output},
    twim::{self, Twim},
};
use embassy_time::Delay;

use crate::engine::TapType;

/// Touch reported to the watch face
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct Touch {
    pub kind: TapType,
    pub x: i32,
    pub y: i32,
}

pub struct TouchController<TWI>
where
    TWI: twim::Instance,
{
    touchpad: CST816S<Twim<'static, TWI>, Input<'static, AnyPin>, Output<'static, AnyPin>>,
}

impl<TWI> TouchController<TWI>
where
    TWI: twim::Instance,
{
    /// Configure the touch controller on boot
    pub fn init(
        twi: Twim<'static, TWI>,
        interrupt_pin: Input<'static, AnyPin>,
        reset_pin: Output<'static, AnyPin>,
    ) -> Self {
        let mut touchpad = CST816S::new(twi, interrupt_pin, reset_pin);
        if touchpad.setup(&mut Delay).is_err() {
            warn!("Touch controller setup failed");
        }
        Self { touchpad }
    }

    /// Check for a new touch event
    pub fn try_event_detected(&mut self) -> Option<Touch> {
        let event = self.touchpad.read_one_touch_event(true)?;
        let kind = match event.gesture {
            TouchGesture::SingleClick => TapType::Tap,
            // Finger went down without completing a gesture yet
            TouchGesture::None => TapType::Touch,
            _ => TapType::TouchCancel,
        };
        Some(Touch {
            kind,
            x: event.x,
            y: event.y,
        })
    }
}
