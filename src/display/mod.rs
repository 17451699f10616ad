//! Display/power coordinator.
//!
//! Owns the panel's power state (normal, low brightness, off), the idle
//! timer that drives it, and the carousel. Rendering is skipped entirely
//! while the panel is off.
//!
//! ## Components
//!
//! - **power**: pure idle-time -> power level policy
//! - **carousel**: 2 s dwell index over per-key descriptions
//! - **render**: per-mode layouts
//! - **icons**: status-row bitmaps

pub mod carousel;
pub mod icons;
pub mod power;
pub mod render;

pub use carousel::Carousel;
pub use power::{power_level, DisplayTimeouts, PowerLevel};
pub use render::View;

use crate::config::{CAROUSEL_DWELL_MS, RENDER_PERIOD_MS};
use crate::error::Error;
use crate::io::Panel;

/// Snapshot of the coordinator's state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayState {
    pub screen_on: bool,
    pub low_brightness: bool,
    pub last_activity_ms: u64,
    pub scroll_index: u8,
}

pub struct DisplayCoordinator {
    timeouts: DisplayTimeouts,
    screen_on: bool,
    low_brightness: bool,
    last_activity_ms: u64,
    last_check_ms: u64,
    last_render_ms: Option<u64>,
    carousel: Carousel,
    needs_clear: bool,
    name_dirty: bool,
}

impl DisplayCoordinator {
    pub const fn new(timeouts: DisplayTimeouts) -> Self {
        Self {
            timeouts,
            screen_on: true,
            low_brightness: false,
            last_activity_ms: 0,
            last_check_ms: 0,
            last_render_ms: None,
            carousel: Carousel::new(),
            needs_clear: true,
            name_dirty: false,
        }
    }

    pub fn state(&self) -> DisplayState {
        DisplayState {
            screen_on: self.screen_on,
            low_brightness: self.low_brightness,
            last_activity_ms: self.last_activity_ms,
            scroll_index: self.carousel.index(),
        }
    }

    /// Key activity: restart the idle timer, wake and brighten the panel.
    /// Brightness stays low while the battery is low.
    pub fn record_activity(
        &mut self,
        now_ms: u64,
        low_battery: bool,
        panel: &mut impl Panel,
    ) -> Result<(), Error> {
        self.last_activity_ms = now_ms;
        if !low_battery && self.low_brightness {
            panel.set_low_brightness(false)?;
            self.low_brightness = false;
        }
        if !self.screen_on {
            panel.set_power(true)?;
            self.screen_on = true;
            self.needs_clear = true;
            self.last_render_ms = None;
            debug!("Display: woke");
        }
        Ok(())
    }

    /// Low battery: hold the panel at low brightness. Called every pass
    /// while the flag is set.
    pub fn force_low_brightness(&mut self, panel: &mut impl Panel) -> Result<(), Error> {
        panel.set_low_brightness(true)?;
        self.low_brightness = true;
        Ok(())
    }

    /// Step the idle policy, at most once per check period.
    pub fn check_timeout(&mut self, now_ms: u64, panel: &mut impl Panel) -> Result<(), Error> {
        if now_ms.saturating_sub(self.last_check_ms) < self.timeouts.check_period_ms {
            return Ok(());
        }
        self.last_check_ms = now_ms;
        if !self.screen_on {
            return Ok(());
        }

        let idle = now_ms.saturating_sub(self.last_activity_ms);
        let level = power_level(idle, &self.timeouts);
        if level != PowerLevel::Normal && !self.low_brightness {
            panel.set_low_brightness(true)?;
            self.low_brightness = true;
            debug!("Display: dimmed after {=u64} ms idle", idle);
        }
        if level == PowerLevel::Off {
            panel.set_power(false)?;
            self.screen_on = false;
            debug!("Display: off after {=u64} ms idle", idle);
        }
        Ok(())
    }

    /// Mode boundary: wipe the panel and restart the carousel.
    pub fn reset_for_transition(&mut self, now_ms: u64, panel: &mut impl Panel) -> Result<(), Error> {
        self.carousel.reset(now_ms);
        self.name_dirty = false;
        self.last_render_ms = None;
        if self.screen_on {
            panel.clear()?;
            self.needs_clear = false;
        } else {
            self.needs_clear = true;
        }
        Ok(())
    }

    /// The selected preset changed on the config screen: restart the
    /// list and wipe the old name.
    pub fn preset_changed(&mut self, now_ms: u64) {
        self.carousel.reset(now_ms);
        self.name_dirty = true;
        self.last_render_ms = None;
    }

    /// Draw one frame for `view`. A no-op while the panel is off or
    /// within the render period of the previous frame.
    pub fn render(&mut self, view: &View<'_>, panel: &mut impl Panel) -> Result<(), Error> {
        if !self.screen_on {
            return Ok(());
        }
        let now_ms = view.now_ms;

        let len = render::carousel_len(view.mode);
        if self.carousel.tick(now_ms, CAROUSEL_DWELL_MS, len) {
            if let Some((x0, row0, x1, row1)) = render::carousel_region(view.mode) {
                panel.clear_region(x0, row0, x1, row1)?;
            }
            self.last_render_ms = None;
        }

        if let Some(last) = self.last_render_ms {
            if now_ms.saturating_sub(last) < RENDER_PERIOD_MS {
                return Ok(());
            }
        }

        if self.needs_clear {
            panel.clear()?;
            self.needs_clear = false;
        }
        if self.name_dirty {
            let (x0, row0, x1, row1) = render::PRESET_NAME_REGION;
            panel.clear_region(x0, row0, x1, row1)?;
            if let Some((x0, row0, x1, row1)) = render::carousel_region(view.mode) {
                panel.clear_region(x0, row0, x1, row1)?;
            }
            self.name_dirty = false;
        }

        render::draw(panel, view, self.carousel.index())?;
        panel.flush()?;
        self.last_render_ms = Some(now_ms);
        Ok(())
    }
}

impl Default for DisplayCoordinator {
    fn default() -> Self {
        Self::new(DisplayTimeouts::default())
    }
}

#[cfg(test)]
mod tests;
