//! Display/power coordinator tests against a recording panel.

use super::*;
use crate::app::{CountdownTimer, Metronome};
use crate::io::{Bitmap, TextSize};
use crate::mode::Mode;
use crate::preset::PRESETS;

#[derive(Clone, Debug, PartialEq)]
enum Op {
    Clear,
    ClearRegion(u8, u8, u8, u8),
    Text(u8, u8, heapless::String<24>),
    Image(u8, u8),
    Number(u8, u8, u32),
    Power(bool),
    LowBrightness(bool),
    Flush,
}

#[derive(Default)]
struct Recorder {
    ops: heapless::Vec<Op, 1024>,
}

impl Recorder {
    fn push(&mut self, op: Op) -> Result<(), Error> {
        self.ops.push(op).map_err(|_| Error::BufferOverflow)
    }

    fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            Op::Text(_, _, t) => Some(t.as_str()),
            _ => None,
        })
    }

    fn has_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t == needle)
    }

    fn count(&self, wanted: &Op) -> usize {
        self.ops.iter().filter(|op| *op == wanted).count()
    }
}

impl Panel for Recorder {
    fn clear(&mut self) -> Result<(), Error> {
        self.push(Op::Clear)
    }

    fn clear_region(&mut self, x0: u8, row0: u8, x1: u8, row1: u8) -> Result<(), Error> {
        self.push(Op::ClearRegion(x0, row0, x1, row1))
    }

    fn print_text(&mut self, x: u8, row: u8, text: &str, _size: TextSize) -> Result<(), Error> {
        let text = heapless::String::try_from(text).map_err(|_| Error::BufferOverflow)?;
        self.push(Op::Text(x, row, text))
    }

    fn print_image(&mut self, x: u8, row: u8, _image: &Bitmap) -> Result<(), Error> {
        self.push(Op::Image(x, row))
    }

    fn print_number(&mut self, x: u8, row: u8, value: u32, _width: u8) -> Result<(), Error> {
        self.push(Op::Number(x, row, value))
    }

    fn set_power(&mut self, on: bool) -> Result<(), Error> {
        self.push(Op::Power(on))
    }

    fn set_low_brightness(&mut self, on: bool) -> Result<(), Error> {
        self.push(Op::LowBrightness(on))
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.push(Op::Flush)
    }
}

struct Scene {
    timer: CountdownTimer,
    metronome: Metronome,
}

impl Scene {
    fn new() -> Self {
        Self {
            timer: CountdownTimer::new(),
            metronome: Metronome::new(),
        }
    }

    fn view(&self, mode: Mode, now_ms: u64) -> View<'_> {
        View {
            mode,
            connected: true,
            battery_percent: 87,
            preset: &PRESETS[0],
            preset_index: 0,
            preset_count: PRESETS.len(),
            timer: &self.timer,
            metronome: &self.metronome,
            now_ms,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Power policy
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn idle_dims_then_powers_off() {
    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    d.record_activity(0, false, &mut panel).unwrap();

    for now in (0..=6_000).step_by(10) {
        d.check_timeout(now, &mut panel).unwrap();
    }
    let s = d.state();
    assert!(s.screen_on);
    assert!(s.low_brightness);

    for now in (6_000..=11_000).step_by(10) {
        d.check_timeout(now, &mut panel).unwrap();
    }
    assert!(!d.state().screen_on);
    assert_eq!(panel.count(&Op::LowBrightness(true)), 1);
    assert_eq!(panel.count(&Op::Power(false)), 1);
}

#[test]
fn render_is_a_no_op_while_off() {
    let scene = Scene::new();
    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    d.check_timeout(10_000, &mut panel).unwrap();
    assert!(!d.state().screen_on);

    panel.ops.clear();
    d.render(&scene.view(Mode::Normal, 10_050), &mut panel).unwrap();
    d.render(&scene.view(Mode::Normal, 14_000), &mut panel).unwrap();
    assert!(panel.ops.is_empty());
}

#[test]
fn activity_wakes_and_brightens() {
    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    d.check_timeout(10_000, &mut panel).unwrap();

    panel.ops.clear();
    d.record_activity(10_500, false, &mut panel).unwrap();
    assert_eq!(
        panel.ops.as_slice(),
        &[Op::LowBrightness(false), Op::Power(true)]
    );
    let s = d.state();
    assert!(s.screen_on);
    assert!(!s.low_brightness);
    assert_eq!(s.last_activity_ms, 10_500);

    // Idle clock restarted: nothing happens 4 s later.
    panel.ops.clear();
    d.check_timeout(14_500, &mut panel).unwrap();
    assert!(panel.ops.is_empty());
}

#[test]
fn low_battery_keeps_brightness_low_on_activity() {
    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    d.force_low_brightness(&mut panel).unwrap();
    d.record_activity(100, true, &mut panel).unwrap();
    assert!(d.state().low_brightness);
    assert_eq!(panel.count(&Op::LowBrightness(false)), 0);
}

#[test]
fn timeout_checks_run_once_per_period() {
    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    d.check_timeout(9_500, &mut panel).unwrap();
    assert!(d.state().low_brightness);

    // Past the off threshold, but less than a period since the last check.
    d.check_timeout(10_200, &mut panel).unwrap();
    assert!(d.state().screen_on);
    d.check_timeout(10_500, &mut panel).unwrap();
    assert!(!d.state().screen_on);
}

// ═══════════════════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn normal_screen_shows_status_and_first_key() {
    let scene = Scene::new();
    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    d.render(&scene.view(Mode::Normal, 0), &mut panel).unwrap();

    assert_eq!(panel.ops[0], Op::Clear);
    assert!(panel.has_text("Connected  "));
    assert!(panel.has_text("Key1: Cut"));
    assert_eq!(panel.count(&Op::Number(100, 1, 87)), 1);
    assert_eq!(panel.count(&Op::ClearRegion(0, 3, 128, 4)), 1);
    assert_eq!(panel.ops.last(), Some(&Op::Flush));
}

#[test]
fn carousel_walks_descriptions() {
    let scene = Scene::new();
    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    for now in (0..=4_000).step_by(10) {
        d.render(&scene.view(Mode::Normal, now), &mut panel).unwrap();
    }
    assert!(panel.has_text("Key2: Paste"));
    assert!(panel.has_text("Key3: Delete"));
    assert!(!panel.has_text("Key4: <- Prev"));
    assert_eq!(d.state().scroll_index, 2);
    assert_eq!(panel.count(&Op::ClearRegion(0, 2, 128, 3)), 2);
}

#[test]
fn frames_are_rate_limited() {
    let scene = Scene::new();
    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    for now in (0..1_000).step_by(10) {
        d.render(&scene.view(Mode::Normal, now), &mut panel).unwrap();
    }
    assert_eq!(panel.count(&Op::Flush), 10);
}

#[test]
fn transition_clears_and_resets_carousel() {
    let scene = Scene::new();
    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    for now in (0..=4_000).step_by(100) {
        d.render(&scene.view(Mode::Normal, now), &mut panel).unwrap();
    }
    assert_ne!(d.state().scroll_index, 0);

    panel.ops.clear();
    d.reset_for_transition(4_050, &mut panel).unwrap();
    assert_eq!(panel.ops.as_slice(), &[Op::Clear]);
    assert_eq!(d.state().scroll_index, 0);
}

#[test]
fn timer_hud_in_normal_mode() {
    let mut scene = Scene::new();
    scene.timer.bump_hours();
    scene.timer.bump_minutes();
    scene.timer.toggle(0);

    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    d.render(&scene.view(Mode::Normal, 60_000), &mut panel).unwrap();
    assert!(panel.has_text("TIM remaining: 01:00"));
}

#[test]
fn timer_set_screen() {
    let mut scene = Scene::new();
    scene.timer.bump_minutes();
    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    d.render(&scene.view(Mode::TimerSet, 0), &mut panel).unwrap();
    assert!(panel.has_text("> Timer Settings"));
    assert!(panel.has_text(" <00:01>"));
    assert!(panel.has_text("1|HH 2|MM 3|En 4|Rst"));
    assert_eq!(panel.count(&Op::ClearRegion(72, 1, 128, 2)), 1);

    scene.timer.toggle(0);
    panel.ops.clear();
    d.render(&scene.view(Mode::TimerSet, 1_000), &mut panel).unwrap();
    assert!(panel.has_text("00:00[ON]"));
}

#[test]
fn metronome_screen() {
    let mut scene = Scene::new();
    scene.metronome.toggle(0);
    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    d.render(&scene.view(Mode::Metronome, 0), &mut panel).unwrap();
    assert!(panel.has_text("BPM:120 SIG:4/4"));
    assert!(panel.has_text("[RUN]"));
}

#[test]
fn key_config_screen_lists_two_keys() {
    let scene = Scene::new();
    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    d.render(&scene.view(Mode::KeyConfig, 0), &mut panel).unwrap();
    assert!(panel.has_text("> Config Mode"));
    assert!(panel.has_text("[1/3]"));
    assert!(panel.has_text("Image"));
    assert!(panel.has_text("- Key1: Cut"));
    assert!(panel.has_text("- Key2: Paste"));
    assert!(!panel.has_text("- Key3: Delete"));
}

#[test]
fn preset_change_wipes_name_row() {
    let scene = Scene::new();
    let mut d = DisplayCoordinator::default();
    let mut panel = Recorder::default();
    d.render(&scene.view(Mode::KeyConfig, 0), &mut panel).unwrap();

    panel.ops.clear();
    d.preset_changed(50);
    d.render(&scene.view(Mode::KeyConfig, 60), &mut panel).unwrap();
    assert_eq!(panel.count(&Op::ClearRegion(30, 1, 128, 2)), 1);
    assert!(panel.has_text("- Key1: Cut"));
}
