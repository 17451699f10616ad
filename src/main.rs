//! keybrick firmware entry point.
//!
//! Brings up the SoftDevice and the board, restores the stored preset,
//! spawns the periodic tasks and then runs the control core once per
//! sampling period. Flash writes requested by a pass are awaited here,
//! between passes.

#![no_std]
#![no_main]

use defmt::{info, unwrap, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output, OutputDrive, Pin};
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::pwm::SimplePwm;
use embassy_nrf::saadc::{self, ChannelConfig, Gain, Resolution, Saadc};
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_time::{Duration, Instant, Ticker};
use nrf_softdevice::{Flash, Softdevice};
use panic_probe as _;
use static_cell::StaticCell;

use keybrick::ble::{self, BleTransport, Server};
use keybrick::board::battery_adc::{self, LatestSample};
use keybrick::board::buttons::{self, KeyPins};
use keybrick::board::display::OledPanel;
use keybrick::board::indicator::{self, BoardIndicator};
use keybrick::board::storage;
use keybrick::config::POLL_PERIOD_MS;
use keybrick::{Io, Keybrick, SharedInput};

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

static SHARED: SharedInput = SharedInput::new();
static SERVER: StaticCell<Server> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("keybrick starting");

    // The SoftDevice owns priorities 0, 1 and 4.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);
    interrupt::SAADC.set_priority(Priority::P3);
    interrupt::SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0.set_priority(Priority::P3);

    // BLE
    let sd = Softdevice::enable(&ble::softdevice_config());
    let server: &'static Server = SERVER.init(unwrap!(Server::start(sd)));
    let sd: &'static Softdevice = sd;
    unwrap!(spawner.spawn(ble::softdevice_task(sd)));
    let mut flash = Flash::take(sd);

    // Battery sense: calibrate and take the first reading before boot.
    let mut adc_config = saadc::Config::default();
    adc_config.resolution = Resolution::_12BIT;
    let mut channel = ChannelConfig::single_ended(p.P0_31);
    channel.gain = Gain::GAIN1_5;
    let mut saadc = Saadc::new(p.SAADC, Irqs, adc_config, [channel]);
    saadc.calibrate().await;
    // The first conversion after calibration is a settling read.
    battery_adc::sample_once(&mut saadc).await;
    battery_adc::sample_once(&mut saadc).await;

    // Board
    let keys = KeyPins::new([
        p.P0_02.degrade(),
        p.P0_03.degrade(),
        p.P0_28.degrade(),
        p.P0_29.degrade(),
        p.P0_30.degrade(),
    ]);
    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let mut panel = unwrap!(OledPanel::new(i2c));
    let mut lights = BoardIndicator::new(Output::new(p.P0_06, Level::Low, OutputDrive::Standard));
    let buzzer = SimplePwm::new_1ch(p.PWM0, p.P0_08);

    // Control core
    let stored = storage::load_preset(&mut flash).await;
    let mut adc = LatestSample;
    let mut pad = Keybrick::default();
    pad.boot(stored, Instant::now().as_millis(), &mut adc);

    unwrap!(spawner.spawn(buttons::sampler_task(keys, &SHARED)));
    unwrap!(spawner.spawn(buttons::battery_report_task(&SHARED)));
    unwrap!(spawner.spawn(battery_adc::adc_task(saadc)));
    unwrap!(spawner.spawn(indicator::buzzer_task(buzzer)));
    unwrap!(spawner.spawn(ble::peripheral_task(sd, server)));

    let mut transport = BleTransport::new(server);
    let mut io = Io {
        transport: &mut transport,
        panel: &mut panel,
        adc: &mut adc,
        indicator: &mut lights,
    };

    let mut ticker = Ticker::every(Duration::from_millis(POLL_PERIOD_MS));
    loop {
        let input = SHARED.snapshot();
        let outcome = pad.step(Instant::now().as_millis(), &input, &mut io);

        if let Some(index) = outcome.store_preset {
            if storage::store_preset(&mut flash, index).await.is_err() {
                warn!("Preset {=u8} applied but not persisted", index);
            }
        }
        ticker.next().await;
    }
}
