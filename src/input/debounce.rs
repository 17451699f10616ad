//! Per-key debouncing and long-press detection.
//!
//! Polled from the fast tick (every [`POLL_PERIOD_MS`]) with the raw level
//! of every key. A raw-active level must persist for the confirmation
//! window before the key reads as pressed; anything shorter is noise and
//! leaves the key released. Once pressed, a hold timer runs and fires the
//! long-press gesture when it reaches the threshold.
//!
//! The `long_press_fired` flag is sticky: the debouncer sets it, the
//! consumer clears it after acting (see [`Debouncer::take_long_press`]), so
//! the gesture is observed exactly once even if the consumer looks at it a
//! few polls later.
//!
//! [`POLL_PERIOD_MS`]: crate::config::POLL_PERIOD_MS

use super::{Key, KeyMask, BUTTON_COUNT};
use crate::config::{DEBOUNCE_CONFIRM_MS, LONG_PRESS_MS};
use crate::io::DigitalInput;

/// Electrical level that means "pressed".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    /// Pressed pulls the line low (pull-up wiring).
    Low,
    High,
}

/// What happens when a key stays held past the long-press threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LongPressPolicy {
    /// Fire once, then stay quiet until release and re-press.
    OneShot,
    /// Fire again every `interval_ms` while still held.
    Repeat { interval_ms: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceConfig {
    pub active_level: ActiveLevel,
    pub confirm_ms: u64,
    pub long_press_ms: u64,
    pub long_press_policy: LongPressPolicy,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            active_level: ActiveLevel::Low,
            confirm_ms: DEBOUNCE_CONFIRM_MS,
            long_press_ms: LONG_PRESS_MS,
            long_press_policy: LongPressPolicy::OneShot,
        }
    }
}

/// Debounced state of one key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState {
    /// Stable pressed level after debouncing.
    pub is_pressed: bool,
    /// Start of the running hold timer; `None` while released or after a
    /// one-shot long press has fired.
    pub press_start: Option<u64>,
    /// Long-press gesture pending for the consumer.
    pub long_press_fired: bool,
}

#[derive(Clone, Copy, Default)]
struct Channel {
    state: ButtonState,
    /// First poll in the current raw-active run.
    active_since: Option<u64>,
    /// One-shot already fired for this press.
    spent: bool,
}

pub struct Debouncer {
    config: DebounceConfig,
    channels: [Channel; BUTTON_COUNT],
}

impl Debouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            channels: [Channel::default(); BUTTON_COUNT],
        }
    }

    /// Sample every key once. `levels[i]` is the raw electrical level of
    /// the key with index `i` (`true` = high).
    ///
    /// Returns `true` if any key is currently pressed.
    pub fn poll(&mut self, now_ms: u64, levels: [bool; BUTTON_COUNT]) -> bool {
        let config = self.config;
        let mut any_pressed = false;

        for (channel, level) in self.channels.iter_mut().zip(levels) {
            let raw_active = match config.active_level {
                ActiveLevel::Low => !level,
                ActiveLevel::High => level,
            };

            // 1. Confirmation window.
            if raw_active {
                let since = *channel.active_since.get_or_insert(now_ms);
                if now_ms.saturating_sub(since) >= config.confirm_ms {
                    channel.state.is_pressed = true;
                }
            } else {
                channel.active_since = None;
                channel.state.is_pressed = false;
            }

            // 2. Hold timer.
            if channel.state.is_pressed {
                any_pressed = true;
                Self::track_hold(channel, now_ms, &config);
            } else {
                channel.state.press_start = None;
                channel.spent = false;
            }
        }

        any_pressed
    }

    /// Sample all keys straight from a digital input boundary.
    pub fn poll_input(&mut self, now_ms: u64, input: &mut impl DigitalInput) -> bool {
        let levels = Key::ALL.map(|key| input.read_level(key));
        self.poll(now_ms, levels)
    }

    fn track_hold(channel: &mut Channel, now_ms: u64, config: &DebounceConfig) {
        let state = &mut channel.state;
        match state.press_start {
            None if !channel.spent => state.press_start = Some(now_ms),
            Some(start) if now_ms.saturating_sub(start) >= config.long_press_ms => {
                state.long_press_fired = true;
                match config.long_press_policy {
                    LongPressPolicy::OneShot => {
                        state.press_start = None;
                        channel.spent = true;
                    }
                    LongPressPolicy::Repeat { interval_ms } => {
                        // Next fire lands `interval_ms` from now.
                        state.press_start =
                            Some((now_ms + interval_ms).saturating_sub(config.long_press_ms));
                    }
                }
            }
            _ => {}
        }
    }

    pub fn state(&self, key: Key) -> ButtonState {
        self.channels[key.index()].state
    }

    /// Keys currently reading as pressed.
    pub fn pressed(&self) -> KeyMask {
        let mut mask = KeyMask::NONE;
        for key in Key::ALL {
            if self.channels[key.index()].state.is_pressed {
                mask.insert(key);
            }
        }
        mask
    }

    /// Consume a pending long-press gesture.
    pub fn take_long_press(&mut self, key: Key) -> bool {
        let state = &mut self.channels[key.index()].state;
        core::mem::take(&mut state.long_press_fired)
    }

    pub fn clear_long_press(&mut self, key: Key) {
        self.channels[key.index()].state.long_press_fired = false;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}
