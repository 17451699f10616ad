//! Status LED and piezo buzzer.
//!
//! The LED is a plain GPIO driven inline. Tones are handed to a buzzer
//! task through a signal, so a long beep never stalls the main loop; a
//! newer tone replaces one still playing.

use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::Output;
use embassy_nrf::pwm::SimplePwm;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};

use crate::io::Indicator;

#[derive(Clone, Copy)]
struct Tone {
    freq_hz: u16,
    duration_ms: u16,
}

static TONE: Signal<CriticalSectionRawMutex, Tone> = Signal::new();

pub struct BoardIndicator {
    led: Output<'static>,
}

impl BoardIndicator {
    pub fn new(led: Output<'static>) -> Self {
        Self { led }
    }
}

impl Indicator for BoardIndicator {
    fn set_status_led(&mut self, on: bool) {
        if on {
            self.led.set_high();
        } else {
            self.led.set_low();
        }
    }

    fn tone(&mut self, freq_hz: u16, duration_ms: u16) {
        TONE.signal(Tone {
            freq_hz,
            duration_ms,
        });
    }
}

#[embassy_executor::task]
pub async fn buzzer_task(mut pwm: SimplePwm<'static, embassy_nrf::peripherals::PWM0>) -> ! {
    pwm.set_duty(0, 0);
    let mut next = TONE.wait().await;
    loop {
        if next.freq_hz == 0 {
            next = TONE.wait().await;
            continue;
        }
        pwm.set_period(u32::from(next.freq_hz));
        pwm.set_duty(0, pwm.max_duty() / 2);

        let hold = Timer::after(Duration::from_millis(u64::from(next.duration_ms)));
        match select(hold, TONE.wait()).await {
            Either::First(()) => {
                pwm.set_duty(0, 0);
                next = TONE.wait().await;
            }
            Either::Second(replacement) => next = replacement,
        }
    }
}
