//! State shared between the periodic ticks and the main loop.
//!
//! The ticks run preemptively relative to the main loop, so everything
//! here is a single atomic word: last write wins, no locks. The main loop
//! never re-reads fields one by one while deciding something; it captures
//! an [`InputSnapshot`] once per iteration and works from that.
//!
//! Edge and gesture bits are latched with `fetch_or` by the tick and
//! drained with `swap` by the main loop, so each one is seen exactly once
//! even when it happens between two loop iterations.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use super::{Debouncer, Key, KeyMask};

pub struct SharedInput {
    pressed: AtomicU8,
    pressed_edges: AtomicU8,
    long_press: AtomicU8,
    battery_report: AtomicBool,
}

impl SharedInput {
    pub const fn new() -> Self {
        Self {
            pressed: AtomicU8::new(0),
            pressed_edges: AtomicU8::new(0),
            long_press: AtomicU8::new(0),
            battery_report: AtomicBool::new(false),
        }
    }

    /// Fast tick: publish the debouncer's view after a poll.
    ///
    /// Pending long-press gestures move out of the debouncer into the
    /// shared latch, which makes this the debouncer's consumer.
    pub fn publish(&self, debouncer: &mut Debouncer) {
        let pressed = debouncer.pressed();
        let previous = KeyMask::from_bits(self.pressed.swap(pressed.bits(), Ordering::AcqRel));

        let rising = pressed.difference(previous);
        if !rising.is_empty() {
            self.pressed_edges.fetch_or(rising.bits(), Ordering::AcqRel);
        }

        let mut fired = KeyMask::NONE;
        for key in Key::ALL {
            if debouncer.take_long_press(key) {
                fired.insert(key);
            }
        }
        if !fired.is_empty() {
            self.long_press.fetch_or(fired.bits(), Ordering::AcqRel);
        }
    }

    /// Slow tick: ask the main loop to push the battery level to the host.
    pub fn request_battery_report(&self) {
        self.battery_report.store(true, Ordering::Release);
    }

    /// Main loop: capture everything once and drain the latches.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            pressed: KeyMask::from_bits(self.pressed.load(Ordering::Acquire)),
            pressed_edges: KeyMask::from_bits(self.pressed_edges.swap(0, Ordering::AcqRel)),
            long_press: KeyMask::from_bits(self.long_press.swap(0, Ordering::AcqRel)),
            battery_report_due: self.battery_report.swap(false, Ordering::AcqRel),
        }
    }
}

impl Default for SharedInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Input as seen by one main-loop iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputSnapshot {
    /// Keys held at capture time.
    pub pressed: KeyMask,
    /// Keys that went down since the previous snapshot (even if already
    /// released again).
    pub pressed_edges: KeyMask,
    /// Long-press gestures fired since the previous snapshot.
    pub long_press: KeyMask,
    /// The slow tick asked for a battery level push.
    pub battery_report_due: bool,
}

impl InputSnapshot {
    /// Nothing held, nothing pending.
    pub const fn idle() -> Self {
        Self {
            pressed: KeyMask::NONE,
            pressed_edges: KeyMask::NONE,
            long_press: KeyMask::NONE,
            battery_report_due: false,
        }
    }

    /// Global activity signal: any key held.
    pub const fn is_active(&self) -> bool {
        !self.pressed.is_empty()
    }

    pub const fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(key)
    }

    pub const fn went_down(&self, key: Key) -> bool {
        self.pressed_edges.contains(key)
    }
}
