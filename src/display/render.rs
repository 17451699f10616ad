//! Per-mode screen layouts for the 128x32 panel.
//!
//! Row numbers are 8-pixel pages. Every frame redraws its text over the
//! previous one, so only regions whose content can shrink are cleared.

use core::fmt::Write;

use heapless::String;

use super::icons;
use crate::app::timer::hours_minutes;
use crate::app::{CountdownTimer, Metronome};
use crate::config::PANEL_WIDTH;
use crate::error::Error;
use crate::input::{Key, BUTTON_COUNT};
use crate::io::{Panel, TextSize};
use crate::mode::Mode;
use crate::preset::KeyPreset;

/// Everything a frame shows, borrowed from the owning components.
pub struct View<'a> {
    pub mode: Mode,
    pub connected: bool,
    pub battery_percent: u8,
    pub preset: &'a KeyPreset,
    pub preset_index: usize,
    pub preset_count: usize,
    pub timer: &'a CountdownTimer,
    pub metronome: &'a Metronome,
    pub now_ms: u64,
}

/// Rows the key-config list shows at once.
const CONFIG_LIST_ROWS: u8 = 2;

/// Number of carousel positions for `mode`, 0 when it has none.
pub fn carousel_len(mode: Mode) -> u8 {
    match mode {
        Mode::Normal => BUTTON_COUNT as u8,
        Mode::KeyConfig => BUTTON_COUNT as u8 - (CONFIG_LIST_ROWS - 1),
        Mode::TimerSet | Mode::Metronome => 0,
    }
}

/// Region wiped when the carousel moves on, as `(x0, row0, x1, row1)`.
pub fn carousel_region(mode: Mode) -> Option<(u8, u8, u8, u8)> {
    match mode {
        Mode::Normal => Some((0, 2, PANEL_WIDTH, 3)),
        Mode::KeyConfig => Some((0, 2, PANEL_WIDTH, 2 + CONFIG_LIST_ROWS)),
        Mode::TimerSet | Mode::Metronome => None,
    }
}

/// Region holding the preset name on the config screen.
pub const PRESET_NAME_REGION: (u8, u8, u8, u8) = (30, 1, PANEL_WIDTH, 2);

pub fn draw(panel: &mut impl Panel, view: &View<'_>, scroll: u8) -> Result<(), Error> {
    match view.mode {
        Mode::Normal => draw_normal(panel, view, scroll),
        Mode::TimerSet => draw_timer_set(panel, view),
        Mode::Metronome => draw_metronome(panel, view.metronome),
        Mode::KeyConfig => draw_key_config(panel, view, scroll),
    }
}

fn small(panel: &mut impl Panel, x: u8, row: u8, text: &str) -> Result<(), Error> {
    panel.print_text(x, row, text, TextSize::Small)
}

fn fmt_line<const N: usize>(args: core::fmt::Arguments<'_>) -> Result<String<N>, Error> {
    let mut line = String::new();
    line.write_fmt(args).map_err(|_| Error::BufferOverflow)?;
    Ok(line)
}

fn draw_normal(panel: &mut impl Panel, view: &View<'_>, scroll: u8) -> Result<(), Error> {
    small(panel, 0, 0, "   BLE  Keybrick")?;
    panel.print_image(2, 1, &icons::BLUETOOTH)?;
    small(panel, 10, 1, if view.connected { "Connected  " } else { "Unconnected" })?;
    panel.print_image(90, 1, &icons::BATTERY)?;
    panel.print_number(100, 1, view.battery_percent as u32, 3)?;
    small(panel, 118, 1, "%")?;

    if let Some(key) = Key::ALL.get(scroll as usize) {
        let line: String<24> = fmt_line(format_args!(
            "Key{}: {}",
            key.number(),
            view.preset.description(*key)
        ))?;
        small(panel, 0, 2, &line)?;
    }

    match view.timer.remaining_secs(view.now_ms) {
        Some(secs) => {
            let (h, m) = hours_minutes(secs);
            let line: String<24> = fmt_line(format_args!("TIM remaining: {:02}:{:02}", h, m))?;
            small(panel, 0, 3, &line)
        }
        None => panel.clear_region(0, 3, PANEL_WIDTH, 4),
    }
}

fn draw_timer_set(panel: &mut impl Panel, view: &View<'_>) -> Result<(), Error> {
    let timer = view.timer;
    small(panel, 0, 0, "> Timer Settings")?;
    let setting: String<16> = fmt_line(format_args!(
        " <{:02}:{:02}>",
        timer.hours(),
        timer.minutes()
    ))?;
    panel.print_text(0, 1, &setting, TextSize::Large)?;

    match timer.remaining_secs(view.now_ms) {
        Some(secs) => {
            let (h, m) = hours_minutes(secs);
            let line: String<16> = fmt_line(format_args!("{:02}:{:02}[ON]", h, m))?;
            small(panel, 72, 1, &line)?;
        }
        None => panel.clear_region(72, 1, PANEL_WIDTH, 2)?,
    }
    small(panel, 72, 2, "Cnt Down")?;
    small(panel, 0, 3, "1|HH 2|MM 3|En 4|Rst")
}

fn draw_metronome(panel: &mut impl Panel, metronome: &Metronome) -> Result<(), Error> {
    small(panel, 0, 0, "> Metronome")?;
    let info: String<24> = fmt_line(format_args!(
        "BPM:{:03} SIG:{}/4",
        metronome.bpm(),
        metronome.signature()
    ))?;
    panel.print_text(0, 1, &info, TextSize::Large)?;
    small(panel, 0, 3, "1|- 2|+ 3|Sig 4|")?;
    small(panel, 96, 3, if metronome.is_running() { "[RUN]" } else { "[OFF]" })
}

fn draw_key_config(panel: &mut impl Panel, view: &View<'_>, scroll: u8) -> Result<(), Error> {
    small(panel, 0, 0, "> Config Mode")?;
    let page: String<8> = fmt_line(format_args!(
        "[{}/{}]",
        view.preset_index + 1,
        view.preset_count
    ))?;
    small(panel, 96, 0, &page)?;

    small(panel, 0, 1, " Tag:")?;
    small(panel, 36, 1, view.preset.name)?;

    for row in 0..CONFIG_LIST_ROWS {
        if let Some(key) = Key::ALL.get((scroll + row) as usize) {
            let line: String<24> = fmt_line(format_args!(
                "- Key{}: {}",
                key.number(),
                view.preset.description(*key)
            ))?;
            small(panel, 0, 2 + row, &line)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carousel_sizes() {
        assert_eq!(carousel_len(Mode::Normal), 5);
        assert_eq!(carousel_len(Mode::KeyConfig), 4);
        assert_eq!(carousel_len(Mode::Metronome), 0);
        assert_eq!(carousel_region(Mode::TimerSet), None);
    }

    #[test]
    fn format_reports_overflow() {
        let ok: Result<String<8>, Error> = fmt_line(format_args!("[{}/{}]", 1, 3));
        assert_eq!(ok.as_deref(), Ok("[1/3]"));
        let long: Result<String<4>, Error> = fmt_line(format_args!("BPM:{:03}", 120));
        assert_eq!(long, Err(Error::BufferOverflow));
    }
}
