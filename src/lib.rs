//! keybrick: five-key BLE macro pad for the nRF52840.
//!
//! The control core (debouncing, mode FSM, report dispatch, display
//! policy, battery gauge, timer and metronome) is plain `no_std` logic
//! driven through the traits in [`io`], so it is unit-tested on the host.
//! The `embedded` feature adds the board glue and the BLE peripheral that
//! implement those traits on real hardware.
//!
//! Usage: `cargo test` on the host, `cargo run --release --features embedded`
//! on the target.

#![cfg_attr(not(test), no_std)]

// Must come first: the logging macros are textually scoped.
#[macro_use]
mod fmt;

pub mod app;
pub mod battery;
pub mod config;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod hid;
pub mod input;
pub mod io;
pub mod mode;
pub mod preset;
pub mod system;

#[cfg(feature = "embedded")]
pub mod ble;
#[cfg(feature = "embedded")]
pub mod board;

pub use error::Error;
pub use input::{InputSnapshot, Key, KeyMask, SharedInput};
pub use mode::{Mode, Transition, Trigger, TriggerBindings};
pub use system::{Io, Keybrick, StepOutcome};
