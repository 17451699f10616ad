//! Hardware boundaries the control core drives.
//!
//! The core never touches a peripheral directly. The embedded shell
//! implements these traits on top of the SoftDevice, the SSD1306 and the
//! SAADC; host tests implement them with recording fakes.

use crate::error::Error;
use crate::hid::KeyboardReport;
use crate::input::Key;

/// BLE HID link to the host.
pub trait Transport {
    fn is_connected(&self) -> bool;

    /// Fire-and-forget: delivery is not confirmed.
    fn send_report(&mut self, report: &KeyboardReport);

    fn set_battery_level(&mut self, percent: u8);
}

/// Glyph height class for [`Panel::print_text`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextSize {
    /// One 8-pixel page tall.
    Small,
    /// Two pages tall.
    Large,
}

/// Monochrome bitmap in page layout: each byte is one column of 8 pixels,
/// LSB at the top, `width` bytes per page row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u8,
    pub pages: u8,
    pub data: &'static [u8],
}

/// Character-cell style access to a small monochrome panel.
///
/// `x` is a pixel column, `row` an 8-pixel page. Region bounds are
/// half-open: `clear_region(0, 2, 128, 4)` wipes pages 2 and 3.
pub trait Panel {
    fn clear(&mut self) -> Result<(), Error>;
    fn clear_region(&mut self, x0: u8, row0: u8, x1: u8, row1: u8) -> Result<(), Error>;
    fn print_text(&mut self, x: u8, row: u8, text: &str, size: TextSize) -> Result<(), Error>;
    fn print_image(&mut self, x: u8, row: u8, image: &Bitmap) -> Result<(), Error>;
    /// Right-aligned decimal in a field `width` characters wide.
    fn print_number(&mut self, x: u8, row: u8, value: u32, width: u8) -> Result<(), Error>;
    fn set_power(&mut self, on: bool) -> Result<(), Error>;
    fn set_low_brightness(&mut self, on: bool) -> Result<(), Error>;

    /// Push buffered drawing to the glass. Unbuffered panels need not
    /// override this.
    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// Battery sense channel.
pub trait AnalogInput {
    /// One raw conversion code at the configured reference and resolution.
    fn read_raw(&mut self) -> Result<u16, Error>;
}

/// Raw key levels.
pub trait DigitalInput {
    /// Electrical level of `key` (`true` = high).
    fn read_level(&mut self, key: Key) -> bool;
}

/// Status LED and buzzer.
pub trait Indicator {
    fn set_status_led(&mut self, on: bool);

    /// Start a tone; it stops on its own after `duration_ms`.
    fn tone(&mut self, freq_hz: u16, duration_ms: u16);
}
