//! HID report types sent over the BLE transport.

pub mod keyboard;

#[cfg(test)]
mod tests;

pub use keyboard::{KeyboardReport, KEYBOARD_REPORT_MAP, KEYBOARD_REPORT_SIZE};
