//! Countdown timer set from the TimerSet screen.
//!
//! Hours and minutes are edited in place; enabling arms a deadline and the
//! timer keeps running in the background after leaving the mode. Expiry is
//! checked once per second.

use crate::input::Key;

const CHECK_PERIOD_MS: u64 = 1_000;
const MAX_HOURS: u8 = 23;
const MAX_MINUTES: u8 = 59;

#[derive(Debug, Default)]
pub struct CountdownTimer {
    hours: u8,
    minutes: u8,
    deadline_ms: Option<u64>,
    last_check_ms: u64,
}

impl CountdownTimer {
    pub const fn new() -> Self {
        Self {
            hours: 0,
            minutes: 0,
            deadline_ms: None,
            last_check_ms: 0,
        }
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn bump_hours(&mut self) {
        self.hours = if self.hours >= MAX_HOURS { 0 } else { self.hours + 1 };
    }

    pub fn bump_minutes(&mut self) {
        self.minutes = if self.minutes >= MAX_MINUTES { 0 } else { self.minutes + 1 };
    }

    fn duration_ms(&self) -> u64 {
        (self.hours as u64 * 3_600 + self.minutes as u64 * 60) * 1_000
    }

    /// Arm or disarm. Returns whether the timer is armed afterwards; a
    /// zero duration is never armed.
    pub fn toggle(&mut self, now_ms: u64) -> bool {
        if self.deadline_ms.take().is_some() {
            info!("Timer: disarmed");
            return false;
        }
        let duration = self.duration_ms();
        if duration == 0 {
            warn!("Timer: refusing to arm 00:00");
            return false;
        }
        self.deadline_ms = Some(now_ms + duration);
        self.last_check_ms = now_ms;
        info!("Timer: armed for {=u8}:{=u8}", self.hours, self.minutes);
        true
    }

    /// Disarm and zero the setting.
    pub fn reset(&mut self) {
        self.deadline_ms = None;
        self.hours = 0;
        self.minutes = 0;
    }

    /// TimerSet screen keys: 1 hours, 2 minutes, 3 enable, 4 reset.
    pub fn handle_key(&mut self, key: Key, now_ms: u64) {
        match key {
            Key::One => self.bump_hours(),
            Key::Two => self.bump_minutes(),
            Key::Three => {
                self.toggle(now_ms);
            }
            Key::Four => self.reset(),
            Key::Five => {}
        }
    }

    /// Whole seconds left, or `None` when disarmed.
    pub fn remaining_secs(&self, now_ms: u64) -> Option<u64> {
        self.deadline_ms
            .map(|deadline| deadline.saturating_sub(now_ms) / 1_000)
    }

    /// Returns true exactly once, on the check that finds the deadline
    /// passed. The timer disarms itself at that point.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let Some(deadline) = self.deadline_ms else {
            return false;
        };
        if now_ms.saturating_sub(self.last_check_ms) < CHECK_PERIOD_MS {
            return false;
        }
        self.last_check_ms = now_ms;
        if now_ms >= deadline {
            self.deadline_ms = None;
            info!("Timer: expired");
            return true;
        }
        false
    }
}

/// Split seconds into the `HH:MM` pair shown on screen.
pub fn hours_minutes(secs: u64) -> (u64, u64) {
    (secs / 3_600, (secs % 3_600) / 60)
}
