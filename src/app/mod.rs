//! Device features that live alongside the key pad: the countdown timer,
//! the metronome and the status LED.

pub mod metronome;
pub mod status_led;
pub mod timer;

pub use metronome::{Beat, Metronome};
pub use status_led::StatusLed;
pub use timer::CountdownTimer;
