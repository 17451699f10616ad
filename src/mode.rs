//! Mode coordinator - which UI mode owns the keys.
//!
//! ```text
//!            config trigger              timer trigger
//!   KeyConfig <-----------> Normal <-----------> TimerSet
//!                             ^
//!                             | metronome trigger
//!                             v
//!                         Metronome
//! ```
//!
//! Long-press gestures arrive latched in the [`InputSnapshot`]. They are
//! accumulated in a pending mask so a trigger that cannot be honored this
//! pass (lower precedence, or a chord still forming) is retried on the next.
//!
//! Inside a mode only two triggers act, both returning to Normal: the
//! mode's own trigger and the timer trigger, which leads home from
//! anywhere. Long presses for any other binding are discarded there.
//!
//! Every transition arms a release guard over the keys held at that
//! instant. Until each of them has been seen released, in-mode input and
//! report dispatch are skipped, so the press that caused the transition
//! can never also act inside the mode it entered.

use crate::input::{InputSnapshot, Key, KeyMask};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    #[default]
    Normal,
    TimerSet,
    Metronome,
    KeyConfig,
}

/// Gesture bound to a mode toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Long press of one key.
    Single(Key),
    /// Long press of both keys.
    Chord(Key, Key),
}

impl Trigger {
    pub const fn keys(self) -> KeyMask {
        match self {
            Trigger::Single(k) => k.mask(),
            Trigger::Chord(a, b) => a.mask().union(b.mask()),
        }
    }
}

/// Which gesture toggles which mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerBindings {
    pub config: Trigger,
    pub timer: Trigger,
    pub metronome: Trigger,
}

impl TriggerBindings {
    /// Evaluation order: the first ready trigger wins the pass.
    fn by_precedence(&self) -> [(Trigger, Mode); 3] {
        [
            (self.config, Mode::KeyConfig),
            (self.timer, Mode::TimerSet),
            (self.metronome, Mode::Metronome),
        ]
    }

    /// Bindings that act in `mode`. Normal honors all of them; inside a
    /// mode only its own trigger and the timer trigger (the way home) act.
    fn active_in(&self, mode: Mode) -> impl Iterator<Item = (Trigger, Mode)> {
        self.by_precedence().into_iter().filter(move |(_, target)| {
            mode == Mode::Normal || *target == mode || *target == Mode::TimerSet
        })
    }

    /// Keys that form a chord with `key` in a binding active in `mode`.
    fn chord_partners(&self, key: Key, mode: Mode) -> KeyMask {
        let mut partners = KeyMask::NONE;
        for (trigger, _) in self.active_in(mode) {
            if let Trigger::Chord(a, b) = trigger {
                if a == key {
                    partners.insert(b);
                } else if b == key {
                    partners.insert(a);
                }
            }
        }
        partners
    }

    fn has_single(&self, key: Key, mode: Mode) -> bool {
        self.active_in(mode)
            .any(|(trigger, _)| trigger == Trigger::Single(key))
    }

    /// Every key some binding active in `mode` listens to.
    fn keys_in(&self, mode: Mode) -> KeyMask {
        self.active_in(mode)
            .fold(KeyMask::NONE, |keys, (trigger, _)| keys.union(trigger.keys()))
    }
}

impl Default for TriggerBindings {
    fn default() -> Self {
        Self {
            config: Trigger::Chord(Key::Four, Key::Five),
            timer: Trigger::Single(Key::Five),
            metronome: Trigger::Single(Key::Four),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
}

impl Transition {
    pub fn entered(&self, mode: Mode) -> bool {
        self.to == mode && self.from != mode
    }

    pub fn left(&self, mode: Mode) -> bool {
        self.from == mode && self.to != mode
    }
}

pub struct ModeCoordinator {
    mode: Mode,
    bindings: TriggerBindings,
    pending: KeyMask,
    /// Keys that must be seen released before in-mode input is armed.
    guard: KeyMask,
}

impl ModeCoordinator {
    pub const fn new(bindings: TriggerBindings) -> Self {
        Self {
            mode: Mode::Normal,
            bindings,
            pending: KeyMask::NONE,
            guard: KeyMask::NONE,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Keys still under the release guard.
    pub fn guarded(&self) -> KeyMask {
        self.guard
    }

    /// False while the release guard is up.
    pub fn in_mode_input_armed(&self) -> bool {
        self.guard.is_empty()
    }

    /// One evaluation pass. Honors at most one trigger.
    pub fn evaluate(&mut self, input: &InputSnapshot) -> Option<Transition> {
        // A guarded key's new long press belongs to the gesture that caused
        // the last transition. Bits already pending were deferred, not
        // caused by it, and stay.
        self.pending = self
            .pending
            .union(input.long_press.difference(self.guard));
        self.guard = KeyMask::from_bits(self.guard.bits() & input.pressed.bits());

        let mut honored = None;
        for (trigger, target) in self.bindings.active_in(self.mode) {
            if self.is_ready(trigger, input) {
                honored = Some((trigger, target));
                break;
            }
        }

        let transition = honored.map(|(trigger, target)| {
            self.pending = self.pending.difference(trigger.keys());
            let to = if self.mode == Mode::Normal { target } else { Mode::Normal };
            self.switch_to(to, input)
        });

        self.drop_stale(input);
        transition
    }

    /// Switch mode on behalf of an in-mode action (e.g. confirm). A request
    /// for the current mode is ignored.
    pub fn request(&mut self, to: Mode, input: &InputSnapshot) -> Option<Transition> {
        if to == self.mode {
            return None;
        }
        Some(self.switch_to(to, input))
    }

    fn switch_to(&mut self, to: Mode, input: &InputSnapshot) -> Transition {
        let transition = Transition { from: self.mode, to };
        info!("Mode: {:?} -> {:?}", transition.from, transition.to);
        self.mode = to;
        self.guard = input.pressed;
        transition
    }

    fn is_ready(&self, trigger: Trigger, input: &InputSnapshot) -> bool {
        match trigger {
            Trigger::Chord(..) => self.pending.contains_all(trigger.keys()),
            // A held chord partner may still complete the chord.
            Trigger::Single(key) => {
                self.pending.contains(key)
                    && !input.pressed.intersects(self.bindings.chord_partners(key, self.mode))
            }
        }
    }

    /// Forget long presses that no binding active in the current mode can
    /// still turn into a trigger.
    fn drop_stale(&mut self, input: &InputSnapshot) {
        let mode = self.mode;
        self.pending = KeyMask::from_bits(self.pending.bits() & self.bindings.keys_in(mode).bits());
        for key in self.pending.iter() {
            let partners = self.bindings.chord_partners(key, mode);
            let chord_alive = input.pressed.intersects(partners) || self.pending.intersects(partners);
            if !self.bindings.has_single(key, mode) && !chord_alive {
                self.pending.remove(key);
            }
        }
    }
}

impl Default for ModeCoordinator {
    fn default() -> Self {
        Self::new(TriggerBindings::default())
    }
}
