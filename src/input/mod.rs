//! Physical key input - debouncing, long-press gestures and the state the
//! sampling tick shares with the main loop.
//!
//! ## Components
//!
//! - **Debouncer**: per-key confirmation window + one-shot long press
//! - **SharedInput**: single-word atomics written by the tick, read once
//!   per main-loop iteration as an [`InputSnapshot`]

pub mod debounce;
pub mod shared;

pub use debounce::{ActiveLevel, ButtonState, DebounceConfig, Debouncer, LongPressPolicy};
pub use shared::{InputSnapshot, SharedInput};

/// Number of physical keys on the pad.
pub const BUTTON_COUNT: usize = 5;

/// One of the five physical keys, left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl Key {
    pub const ALL: [Key; BUTTON_COUNT] = [Key::One, Key::Two, Key::Three, Key::Four, Key::Five];

    /// Zero-based ordinal, usable as an array index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// One-based number as printed on the keycap legend.
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }

    pub const fn mask(self) -> KeyMask {
        KeyMask(1 << self as u8)
    }
}

/// A set of keys packed into one byte (bit n = `Key` with index n).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyMask(u8);

impl KeyMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self((1 << BUTTON_COUNT) - 1);

    /// Build from raw bits; bits above `BUTTON_COUNT` are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, key: Key) -> bool {
        self.0 & key.mask().0 != 0
    }

    /// True when every key of `other` is in `self`.
    pub const fn contains_all(self, other: KeyMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: KeyMask) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, key: Key) {
        self.0 |= key.mask().0;
    }

    pub fn remove(&mut self, key: Key) {
        self.0 &= !key.mask().0;
    }

    pub const fn union(self, other: KeyMask) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn difference(self, other: KeyMask) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Key> {
        Key::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl From<Key> for KeyMask {
    fn from(key: Key) -> Self {
        key.mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ordinals() {
        assert_eq!(Key::One.index(), 0);
        assert_eq!(Key::Five.index(), 4);
        assert_eq!(Key::Three.number(), 3);
        assert_eq!(Key::Four.mask().bits(), 0b01000);
    }

    #[test]
    fn mask_set_operations() {
        let mut mask = KeyMask::NONE;
        mask.insert(Key::Two);
        mask.insert(Key::Five);
        assert!(mask.contains(Key::Two));
        assert!(!mask.contains(Key::One));
        assert!(mask.contains_all(Key::Five.mask()));
        assert!(!mask.contains_all(KeyMask::ALL));

        mask.remove(Key::Two);
        assert_eq!(mask, Key::Five.mask());
        assert_eq!(KeyMask::ALL.difference(mask).iter().count(), 4);
    }

    #[test]
    fn mask_drops_out_of_range_bits() {
        assert_eq!(KeyMask::from_bits(0xFF), KeyMask::ALL);
    }

    #[test]
    fn mask_iterates_in_key_order() {
        let mask = Key::Four.mask().union(Key::One.mask());
        let mut keys = mask.iter();
        assert_eq!(keys.next(), Some(Key::One));
        assert_eq!(keys.next(), Some(Key::Four));
        assert_eq!(keys.next(), None);
    }
}
