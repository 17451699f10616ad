//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and calibration
//! constants live here so they can be tuned in one place.

// Input sampling

/// Period of the fast sampling tick (ms). 10 ms = 100 Hz.
pub const POLL_PERIOD_MS: u64 = 10;

/// A raw-active level must persist this long before a press is declared (ms).
pub const DEBOUNCE_CONFIRM_MS: u64 = 5;

/// Hold duration that fires the one-shot long-press gesture (ms).
pub const LONG_PRESS_MS: u64 = 1500;

// Battery

/// Period between battery voltage samples in the main loop (ms).
pub const BATTERY_SAMPLE_PERIOD_MS: u64 = 10_000;

/// Period of the slow tick that pushes the level to the BLE Battery Service (ms).
pub const BATTERY_REPORT_PERIOD_MS: u64 = 60_000;

/// ADC reference voltage (V), calibrated against a bench supply.
pub const ADC_REFERENCE_VOLTS: f32 = 2.877_979;

/// ADC full-scale code (12-bit).
pub const ADC_FULL_SCALE: u16 = 4096;

/// Resistive divider ratio between the cell and the ADC pin.
pub const BATTERY_DIVIDER_RATIO: f32 = 0.6357;

/// Below this cell voltage the low-battery flag is raised (V).
pub const LOW_BATTERY_VOLTS: f32 = 3.40;

// Display

/// Idle time before the panel drops to low brightness (ms).
pub const SCREEN_ALMOST_TIMEOUT_MS: u64 = 5_000;

/// Idle time before the panel is powered off (ms).
pub const SCREEN_OFF_TIMEOUT_MS: u64 = 10_000;

/// How often the idle timeouts are evaluated (ms).
pub const SCREEN_TIMEOUT_CHECK_MS: u64 = 1_000;

/// Dwell time of each carousel entry (ms).
pub const CAROUSEL_DWELL_MS: u64 = 2_000;

/// Minimum spacing between two frames pushed over I²C (ms).
pub const RENDER_PERIOD_MS: u64 = 100;

/// Panel geometry: 128 columns × 4 pages of 8 pixel rows.
pub const PANEL_WIDTH: u8 = 128;
pub const PANEL_ROWS: u8 = 4;

// Indicators

/// Half period of the "advertising" status LED blink (ms). 500 ms = 1 Hz.
pub const STATUS_LED_BLINK_MS: u64 = 500;

/// Beep played when a preset is applied.
pub const PRESET_BEEP_HZ: u16 = 1_000;
pub const PRESET_BEEP_MS: u16 = 100;

/// Alarm played when the countdown timer expires.
pub const TIMER_ALARM_HZ: u16 = 2_000;
pub const TIMER_ALARM_MS: u16 = 500;

/// Metronome click tones (accented downbeat / other beats).
pub const METRONOME_ACCENT_HZ: u16 = 1_760;
pub const METRONOME_BEAT_HZ: u16 = 880;
pub const METRONOME_CLICK_MS: u16 = 30;

/// How long the LED stays lit after a metronome beat (ms).
pub const METRONOME_FLASH_MS: u64 = 60;

// BLE

/// Advertised device name.
pub const BLE_DEVICE_NAME: &str = "Keybrick";

/// Battery level reported before the first sample lands.
pub const BLE_INITIAL_BATTERY_LEVEL: u8 = 100;

// GPIO pin assignments (custom nRF52840 board)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your PCB.
//
//   Key 1..5       → P0.02, P0.03, P0.28, P0.29, P0.30 (active-low, pull-up)
//   I²C SDA / SCL  → P0.26 / P0.27
//   Battery sense  → AIN7 (P0.31)
//   Status LED     → P0.06
//   Buzzer (PWM)   → P0.08

// Preset storage

/// Flash page index where preset storage starts (4 KB per page on nRF52840).
pub const STORAGE_FLASH_PAGE_START: u32 = 240;

/// Number of flash pages reserved for preset storage.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 2;
