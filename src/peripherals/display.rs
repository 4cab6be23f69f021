//! ST7789 LCD of the PineTime

use display_interface_spi::SPIInterface;
use embassy_nrf::{
    gpio::{AnyPin, Output},
    peripherals::SPI2,
    spim::Spim,
};
use embassy_time::Delay;
use mipidsi::{models::ST7789, Builder, Orientation};

pub const LCD_W: u16 = 240;
pub const LCD_H: u16 = 240;

/// The panel as an `embedded_graphics` draw target
pub type Lcd = mipidsi::Display<
    SPIInterface<Spim<'static, SPI2>, Output<'static, AnyPin>, Output<'static, AnyPin>>,
    ST7789,
    Output<'static, AnyPin>,
>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Error {
    /// The controller did not accept the init sequence
    Init,
}

/// Initialize the display controller
pub fn init(
    spim: Spim<'static, SPI2>,
    cs: Output<'static, AnyPin>,
    dc: Output<'static, AnyPin>,
    rst: Output<'static, AnyPin>,
) -> Result<Lcd, Error> {
    Builder::st7789(SPIInterface::new(spim, dc, cs))
        .with_display_size(LCD_W, LCD_H)
        .with_orientation(Orientation::Portrait(false))
        .init(&mut Delay, Some(rst))
        .map_err(|_| Error::Init)
}
