//! nRF52840 board glue.
//!
//! Implements the [`crate::io`] boundaries on real peripherals and hosts
//! the periodic tasks that feed [`crate::input::SharedInput`].
//!
//! ## Components
//!
//! - **buttons**: five GPIO keys, the 10 ms sampling tick, the battery report tick
//! - **display**: SSD1306 128x32 over TWIM as a [`crate::io::Panel`]
//! - **battery_adc**: SAADC sampling task behind a [`crate::io::AnalogInput`]
//! - **indicator**: status LED and PWM buzzer
//! - **storage**: active preset index in internal flash

pub mod battery_adc;
pub mod buttons;
pub mod display;
pub mod indicator;
pub mod storage;
