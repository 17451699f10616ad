//! The control core: every component, stepped once per main-loop pass.
//!
//! The async shell owns the peripherals and the clock. Each pass it hands
//! [`Keybrick::step`] the time, one [`InputSnapshot`] and the boundary
//! implementations, then carries out the deferred effects in the returned
//! [`StepOutcome`] (flash writes are async and cannot run in here).

use crate::app::{CountdownTimer, Metronome, StatusLed};
use crate::battery::{BatteryEstimator, BatterySample};
use crate::config;
use crate::dispatch::ReportDispatcher;
use crate::display::{DisplayCoordinator, DisplayTimeouts, View};
use crate::error::Error;
use crate::input::{InputSnapshot, Key};
use crate::io::{AnalogInput, Indicator, Panel, Transport};
use crate::mode::{Mode, ModeCoordinator, Transition, TriggerBindings};
use crate::preset::{self, KeyPreset};

/// Boundary implementations for one pass.
pub struct Io<'a, T, P, A, I> {
    pub transport: &'a mut T,
    pub panel: &'a mut P,
    pub adc: &'a mut A,
    pub indicator: &'a mut I,
}

/// What a pass did that the shell has to know about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepOutcome {
    pub transition: Option<Transition>,
    /// Preset index confirmed on the config screen, to be persisted.
    pub store_preset: Option<u8>,
    /// HID reports handed to the transport.
    pub reports_sent: usize,
}

pub struct Keybrick {
    catalog: &'static [KeyPreset],
    /// Preset loaded into the dispatcher.
    active_preset: usize,
    /// Preset highlighted on the config screen.
    cursor: usize,
    modes: ModeCoordinator,
    dispatcher: ReportDispatcher,
    display: DisplayCoordinator,
    battery: BatteryEstimator,
    timer: CountdownTimer,
    metronome: Metronome,
    led: StatusLed,
}

impl Keybrick {
    pub fn new(
        catalog: &'static [KeyPreset],
        bindings: TriggerBindings,
        battery: BatteryEstimator,
        timeouts: DisplayTimeouts,
    ) -> Self {
        Self {
            catalog,
            active_preset: 0,
            cursor: 0,
            modes: ModeCoordinator::new(bindings),
            dispatcher: ReportDispatcher::new(),
            display: DisplayCoordinator::new(timeouts),
            battery,
            timer: CountdownTimer::new(),
            metronome: Metronome::new(),
            led: StatusLed::new(),
        }
    }

    /// Power-up: load the stored preset (falling back to the first one)
    /// and take the first battery reading.
    pub fn boot(&mut self, stored_preset: Option<u8>, now_ms: u64, adc: &mut impl AnalogInput) {
        let wanted = stored_preset.map(usize::from).unwrap_or(0);
        let index = if wanted < self.catalog.len() {
            wanted
        } else {
            warn!("Boot: stored preset {} out of range, using 0", wanted);
            0
        };
        if self.dispatcher.apply_preset(self.catalog, index).is_ok() {
            self.active_preset = index;
            self.cursor = index;
        }

        match self.battery.prime(adc, now_ms) {
            Ok(_sample) => info!("Boot: battery {} %", _sample.percent),
            Err(_e) => warn!("Boot: battery read failed: {:?}", _e),
        }
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn active_preset(&self) -> usize {
        self.active_preset
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn battery(&self) -> BatterySample {
        self.battery.sample()
    }

    pub fn display(&self) -> &DisplayCoordinator {
        &self.display
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn metronome(&self) -> &Metronome {
        &self.metronome
    }

    pub fn dispatcher(&self) -> &ReportDispatcher {
        &self.dispatcher
    }

    /// One main-loop pass.
    pub fn step<T, P, A, I>(
        &mut self,
        now_ms: u64,
        input: &InputSnapshot,
        io: &mut Io<'_, T, P, A, I>,
    ) -> StepOutcome
    where
        T: Transport,
        P: Panel,
        A: AnalogInput,
        I: Indicator,
    {
        let mut outcome = StepOutcome::default();

        if self.battery.is_low() {
            log_panel(self.display.force_low_brightness(io.panel));
        }

        if let Some(transition) = self.modes.evaluate(input) {
            self.on_transition(transition, now_ms, io);
            outcome.transition = Some(transition);
        }

        let armed = self.modes.in_mode_input_armed();
        if self.modes.mode() == Mode::Normal && armed {
            outcome.reports_sent = self.dispatcher.dispatch(input, io.transport);
        }

        if self.modes.mode() != Mode::Normal && armed {
            self.handle_mode_keys(now_ms, input, io, &mut outcome);
        }

        if self.timer.poll(now_ms) {
            io.indicator.tone(config::TIMER_ALARM_HZ, config::TIMER_ALARM_MS);
            self.led.flash(now_ms, config::TIMER_ALARM_MS as u64, io.indicator);
        }
        if let Some(beat) = self.metronome.poll(now_ms) {
            let freq = if beat.accent {
                config::METRONOME_ACCENT_HZ
            } else {
                config::METRONOME_BEAT_HZ
            };
            io.indicator.tone(freq, config::METRONOME_CLICK_MS);
            self.led.flash(now_ms, config::METRONOME_FLASH_MS, io.indicator);
        }

        self.battery.poll(now_ms, io.adc);
        if input.battery_report_due {
            self.battery.report(io.transport);
        }

        let connected = io.transport.is_connected();
        if self.modes.mode() == Mode::Metronome {
            self.led.update_flash(now_ms, io.indicator);
        } else {
            self.led.update(now_ms, connected, io.indicator);
        }

        if input.is_active() || !input.pressed_edges.is_empty() {
            log_panel(
                self.display
                    .record_activity(now_ms, self.battery.is_low(), io.panel),
            );
        }
        log_panel(self.display.check_timeout(now_ms, io.panel));

        let shown = if self.modes.mode() == Mode::KeyConfig {
            self.cursor
        } else {
            self.active_preset
        };
        if let Some(preset) = self.catalog.get(shown) {
            let view = View {
                mode: self.modes.mode(),
                connected,
                battery_percent: self.battery.percentage(),
                preset,
                preset_index: shown,
                preset_count: self.catalog.len(),
                timer: &self.timer,
                metronome: &self.metronome,
                now_ms,
            };
            log_panel(self.display.render(&view, io.panel));
        }

        outcome
    }

    fn on_transition<T, P, A, I>(
        &mut self,
        transition: Transition,
        now_ms: u64,
        io: &mut Io<'_, T, P, A, I>,
    ) where
        T: Transport,
        P: Panel,
        A: AnalogInput,
        I: Indicator,
    {
        self.dispatcher.force_release(io.transport);
        self.dispatcher.set_enabled(transition.to == Mode::Normal);
        log_panel(self.display.reset_for_transition(now_ms, io.panel));

        if transition.entered(Mode::KeyConfig) {
            self.cursor = self.active_preset;
        }
        if transition.left(Mode::Metronome) {
            self.metronome.stop();
        }
    }

    fn handle_mode_keys<T, P, A, I>(
        &mut self,
        now_ms: u64,
        input: &InputSnapshot,
        io: &mut Io<'_, T, P, A, I>,
        outcome: &mut StepOutcome,
    ) where
        T: Transport,
        P: Panel,
        A: AnalogInput,
        I: Indicator,
    {
        for key in input.pressed_edges.iter() {
            match self.modes.mode() {
                Mode::TimerSet => self.timer.handle_key(key, now_ms),
                Mode::Metronome => self.metronome.handle_key(key, now_ms),
                Mode::KeyConfig => {
                    if self.handle_config_key(key, now_ms, input, io, outcome) {
                        return;
                    }
                }
                Mode::Normal => return,
            }
        }
    }

    /// Config screen: 1 previous, 2 next, 3 confirm. Returns true once the
    /// screen has been left.
    fn handle_config_key<T, P, A, I>(
        &mut self,
        key: Key,
        now_ms: u64,
        input: &InputSnapshot,
        io: &mut Io<'_, T, P, A, I>,
        outcome: &mut StepOutcome,
    ) -> bool
    where
        T: Transport,
        P: Panel,
        A: AnalogInput,
        I: Indicator,
    {
        match key {
            Key::One => {
                self.cursor = preset::select_prev(self.cursor, self.catalog.len());
                self.display.preset_changed(now_ms);
                false
            }
            Key::Two => {
                self.cursor = preset::select_next(self.cursor, self.catalog.len());
                self.display.preset_changed(now_ms);
                false
            }
            Key::Three => {
                match self.dispatcher.apply_preset(self.catalog, self.cursor) {
                    Ok(()) => {
                        self.active_preset = self.cursor;
                        outcome.store_preset = u8::try_from(self.cursor).ok();
                        io.indicator.tone(config::PRESET_BEEP_HZ, config::PRESET_BEEP_MS);
                    }
                    Err(_e) => warn!("Config: preset {} rejected: {:?}", self.cursor, _e),
                }
                if let Some(transition) = self.modes.request(Mode::Normal, input) {
                    self.on_transition(transition, now_ms, io);
                    outcome.transition = Some(transition);
                }
                true
            }
            Key::Four | Key::Five => false,
        }
    }
}

impl Default for Keybrick {
    fn default() -> Self {
        Self::new(
            &preset::PRESETS,
            TriggerBindings::default(),
            BatteryEstimator::default(),
            DisplayTimeouts::default(),
        )
    }
}

/// Panel errors never stop the loop; the next frame redraws.
fn log_panel(result: Result<(), Error>) {
    if let Err(_e) = result {
        warn!("Display: {:?}", _e);
    }
}
