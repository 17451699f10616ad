//! SSD1306 128x32 OLED as a [`Panel`].
//!
//! Drawing goes to the driver's frame buffer; [`Panel::flush`] pushes it
//! over I²C. Text is drawn with an opaque background so a frame can be
//! written over the previous one without clearing first.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::{FONT_5X8, FONT_8X13};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use crate::config::{PANEL_ROWS, PANEL_WIDTH};
use crate::error::Error;
use crate::io::{Bitmap, Panel, TextSize};

/// Concrete driver type, generic over the HAL's I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x32, BufferedGraphicsMode<DisplaySize128x32>>;

const PAGE_HEIGHT: u32 = 8;

pub struct OledPanel<I2C> {
    display: Display<I2C>,
    /// Last contrast written, so repeated requests stay off the bus.
    low_brightness: Option<bool>,
}

impl<I2C> OledPanel<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initialise the controller and blank the glass.
    pub fn new(i2c: I2C) -> Result<Self, Error> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display.init().map_err(|_| Error::Display)?;
        display.clear_buffer();
        display.flush().map_err(|_| Error::Display)?;
        Ok(Self {
            display,
            low_brightness: None,
        })
    }

    fn font(size: TextSize) -> &'static MonoFont<'static> {
        match size {
            TextSize::Small => &FONT_5X8,
            TextSize::Large => &FONT_8X13,
        }
    }
}

impl<I2C> Panel for OledPanel<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn clear(&mut self) -> Result<(), Error> {
        self.display.clear_buffer();
        Ok(())
    }

    fn clear_region(&mut self, x0: u8, row0: u8, x1: u8, row1: u8) -> Result<(), Error> {
        let x1 = x1.min(PANEL_WIDTH);
        let row1 = row1.min(PANEL_ROWS);
        if x1 <= x0 || row1 <= row0 {
            return Ok(());
        }
        Rectangle::new(
            Point::new(i32::from(x0), i32::from(row0) * PAGE_HEIGHT as i32),
            Size::new(u32::from(x1 - x0), u32::from(row1 - row0) * PAGE_HEIGHT),
        )
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
        .draw(&mut self.display)
        .map_err(|_| Error::Display)
    }

    fn print_text(&mut self, x: u8, row: u8, text: &str, size: TextSize) -> Result<(), Error> {
        let style = MonoTextStyleBuilder::new()
            .font(Self::font(size))
            .text_color(BinaryColor::On)
            .background_color(BinaryColor::Off)
            .build();
        Text::with_baseline(
            text,
            Point::new(i32::from(x), i32::from(row) * PAGE_HEIGHT as i32),
            style,
            Baseline::Top,
        )
        .draw(&mut self.display)
        .map(|_| ())
        .map_err(|_| Error::Display)
    }

    fn print_image(&mut self, x: u8, row: u8, image: &Bitmap) -> Result<(), Error> {
        let width = usize::from(image.width);
        for page in 0..usize::from(image.pages) {
            for col in 0..width {
                let Some(&column) = image.data.get(page * width + col) else {
                    return Err(Error::BufferOverflow);
                };
                for bit in 0..8u32 {
                    let px = u32::from(x) + col as u32;
                    let py = (u32::from(row) + page as u32) * PAGE_HEIGHT + bit;
                    self.display.set_pixel(px, py, column & (1 << bit) != 0);
                }
            }
        }
        Ok(())
    }

    fn print_number(&mut self, x: u8, row: u8, value: u32, width: u8) -> Result<(), Error> {
        let mut digits: heapless::String<12> = heapless::String::new();
        write!(digits, "{:>1$}", value, usize::from(width)).map_err(|_| Error::BufferOverflow)?;
        self.print_text(x, row, &digits, TextSize::Small)
    }

    fn set_power(&mut self, on: bool) -> Result<(), Error> {
        self.display.set_display_on(on).map_err(|_| Error::Display)
    }

    fn set_low_brightness(&mut self, on: bool) -> Result<(), Error> {
        if self.low_brightness == Some(on) {
            return Ok(());
        }
        let level = if on {
            Brightness::DIMMEST
        } else {
            Brightness::NORMAL
        };
        self.display.set_brightness(level).map_err(|_| Error::Display)?;
        self.low_brightness = Some(on);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.display.flush().map_err(|_| Error::Display)
    }
}
