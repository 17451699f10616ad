//! Unified error type for keybrick.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the firmware.
///
/// None of these are fatal: every caller has a fallback state (keep the
/// previous preset, keep the last voltage, skip the frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Boundaries
    /// The BLE link rejected a notification.
    Transport,

    /// I²C transaction to the display failed.
    Display,

    /// Flash read/write/erase failed.
    Storage,

    /// The battery ADC channel could not be sampled.
    Adc,

    // Configuration
    /// Breakpoint table is empty, unsorted, or does not span 100%..0%.
    InvalidBreakpointTable,

    /// Preset index at or beyond the catalog bound.
    PresetOutOfRange,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}
