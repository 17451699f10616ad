//! Battery sense on the SAADC.
//!
//! SAADC conversions are async, the gauge reads synchronously: a task
//! samples the divider every [`BATTERY_SAMPLE_PERIOD_MS`] into an atomic
//! and [`LatestSample`] hands the gauge whatever landed last.

use core::sync::atomic::{AtomicU16, Ordering};

use embassy_nrf::saadc::Saadc;
use embassy_time::{Duration, Ticker};

use crate::config::BATTERY_SAMPLE_PERIOD_MS;
use crate::error::Error;
use crate::io::AnalogInput;

const NO_SAMPLE: u16 = u16::MAX;

static LATEST_RAW: AtomicU16 = AtomicU16::new(NO_SAMPLE);

/// One conversion; negative codes (offset below ground) read as zero.
pub async fn sample_once(saadc: &mut Saadc<'static, 1>) -> u16 {
    let mut buf = [0i16; 1];
    saadc.sample(&mut buf).await;
    let code = u16::try_from(buf[0]).unwrap_or(0);
    LATEST_RAW.store(code, Ordering::Release);
    code
}

#[embassy_executor::task]
pub async fn adc_task(mut saadc: Saadc<'static, 1>) -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(BATTERY_SAMPLE_PERIOD_MS));
    loop {
        ticker.next().await;
        let _code = sample_once(&mut saadc).await;
        trace!("Battery: raw {=u16}", _code);
    }
}

/// Gauge-side view of the sampling task.
#[derive(Default)]
pub struct LatestSample;

impl AnalogInput for LatestSample {
    fn read_raw(&mut self) -> Result<u16, Error> {
        match LATEST_RAW.load(Ordering::Acquire) {
            NO_SAMPLE => Err(Error::Adc),
            code => Ok(code),
        }
    }
}
