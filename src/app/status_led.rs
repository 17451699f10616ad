//! Status LED: solid while a host is connected, 1 Hz blink while
//! advertising. Short flashes (metronome beat, timer alarm) take priority
//! until they run out.

use crate::config::STATUS_LED_BLINK_MS;
use crate::io::Indicator;

#[derive(Debug, Default)]
pub struct StatusLed {
    lit: bool,
    last_toggle_ms: u64,
    flash_until_ms: Option<u64>,
}

impl StatusLed {
    pub const fn new() -> Self {
        Self {
            lit: false,
            last_toggle_ms: 0,
            flash_until_ms: None,
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Light the LED for `duration_ms`, overriding the connection pattern.
    pub fn flash(&mut self, now_ms: u64, duration_ms: u64, indicator: &mut impl Indicator) {
        self.flash_until_ms = Some(now_ms + duration_ms);
        self.set(true, indicator);
    }

    /// End a flash that has run out. Returns true while one is still lit.
    pub fn update_flash(&mut self, now_ms: u64, indicator: &mut impl Indicator) -> bool {
        match self.flash_until_ms {
            Some(until) if now_ms >= until => {
                self.flash_until_ms = None;
                self.set(false, indicator);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Drive the connection pattern.
    pub fn update(&mut self, now_ms: u64, connected: bool, indicator: &mut impl Indicator) {
        if self.update_flash(now_ms, indicator) {
            return;
        }
        if connected {
            self.set(true, indicator);
        } else if now_ms.saturating_sub(self.last_toggle_ms) >= STATUS_LED_BLINK_MS {
            self.last_toggle_ms = now_ms;
            self.set(!self.lit, indicator);
        }
    }

    fn set(&mut self, on: bool, indicator: &mut impl Indicator) {
        if self.lit != on || self.flash_until_ms.is_some() {
            indicator.set_status_led(on);
        }
        self.lit = on;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Led {
        writes: heapless::Vec<bool, 64>,
    }

    impl Indicator for Led {
        fn set_status_led(&mut self, on: bool) {
            self.writes.push(on).unwrap();
        }

        fn tone(&mut self, _freq_hz: u16, _duration_ms: u16) {}
    }

    #[test]
    fn solid_when_connected() {
        let mut s = StatusLed::new();
        let mut led = Led::default();
        for now in (0..3_000).step_by(10) {
            s.update(now, true, &mut led);
        }
        assert_eq!(led.writes.as_slice(), &[true]);
    }

    #[test]
    fn blinks_at_one_hertz_when_disconnected() {
        let mut s = StatusLed::new();
        let mut led = Led::default();
        for now in (0..=2_000).step_by(10) {
            s.update(now, false, &mut led);
        }
        assert_eq!(led.writes.as_slice(), &[true, false, true, false]);
    }

    #[test]
    fn flash_overrides_pattern_then_expires() {
        let mut s = StatusLed::new();
        let mut led = Led::default();
        s.update(0, true, &mut led);
        s.flash(100, 60, &mut led);
        s.update(120, true, &mut led);
        assert!(s.is_lit());
        s.update(160, true, &mut led);
        s.update(170, true, &mut led);
        assert_eq!(led.writes.as_slice(), &[true, true, false, true]);
    }
}
