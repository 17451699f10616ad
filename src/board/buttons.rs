//! GPIO keys and the periodic ticks.
//!
//! Five active-low keys with internal pull-ups. Unlike edge-driven button
//! tasks, the keys are sampled on a fixed tick so the debouncer sees a
//! steady time base for its confirmation window and hold timer.

use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_time::{Duration, Instant, Ticker};

use crate::config::{BATTERY_REPORT_PERIOD_MS, POLL_PERIOD_MS};
use crate::input::{Debouncer, Key, SharedInput, BUTTON_COUNT};
use crate::io::DigitalInput;

pub struct KeyPins {
    pins: [Input<'static>; BUTTON_COUNT],
}

impl KeyPins {
    /// Pins in key order, Key1 first.
    pub fn new(pins: [AnyPin; BUTTON_COUNT]) -> Self {
        Self {
            pins: pins.map(|pin| Input::new(pin, Pull::Up)),
        }
    }
}

impl DigitalInput for KeyPins {
    fn read_level(&mut self, key: Key) -> bool {
        self.pins[key.index()].is_high()
    }
}

/// Fast tick: debounce every key and publish the result.
#[embassy_executor::task]
pub async fn sampler_task(mut pins: KeyPins, shared: &'static SharedInput) -> ! {
    let mut debouncer = Debouncer::default();
    let mut ticker = Ticker::every(Duration::from_millis(POLL_PERIOD_MS));
    info!("Keys: sampling every {=u64} ms", POLL_PERIOD_MS);

    loop {
        debouncer.poll_input(Instant::now().as_millis(), &mut pins);
        shared.publish(&mut debouncer);
        ticker.next().await;
    }
}

/// Slow tick: ask the main loop for a battery level push.
#[embassy_executor::task]
pub async fn battery_report_task(shared: &'static SharedInput) -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(BATTERY_REPORT_PERIOD_MS));
    loop {
        ticker.next().await;
        shared.request_battery_report();
    }
}
