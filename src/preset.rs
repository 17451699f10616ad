//! Key-mapping presets.
//!
//! The catalog is immutable data baked into flash. Only the selected index
//! is persisted; the dispatcher works from [`ActiveBuffers`], a RAM copy of
//! the selected mapping, so it never walks the catalog on a key event.

use crate::error::Error;
use crate::hid::keyboard::{modifier, usage};
use crate::hid::KeyboardReport;
use crate::input::{Key, BUTTON_COUNT};

/// One complete key mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPreset {
    /// Short tag shown on the config screen.
    pub name: &'static str,
    /// Report sent on press of each key.
    pub mapping: [KeyboardReport; BUTTON_COUNT],
    /// What each key does, shown in the carousel.
    pub descriptions: [&'static str; BUTTON_COUNT],
}

impl KeyPreset {
    pub fn report(&self, key: Key) -> &KeyboardReport {
        &self.mapping[key.index()]
    }

    pub fn description(&self, key: Key) -> &'static str {
        self.descriptions[key.index()]
    }
}

/// Built-in presets, selected by index.
pub static PRESETS: [KeyPreset; 3] = [
    KeyPreset {
        name: "Image",
        mapping: [
            KeyboardReport::key(modifier::LEFT_CTRL, usage::X),
            KeyboardReport::key(modifier::LEFT_CTRL, usage::V),
            KeyboardReport::key(0, usage::DELETE),
            KeyboardReport::key(0, usage::LEFT_ARROW),
            KeyboardReport::key(0, usage::RIGHT_ARROW),
        ],
        descriptions: ["Cut", "Paste", "Delete", "<- Prev", "-> Next"],
    },
    KeyPreset {
        name: "Video",
        mapping: [
            KeyboardReport::RELEASE,
            KeyboardReport::RELEASE,
            KeyboardReport::key(0, usage::SPACE),
            KeyboardReport::key(0, usage::LEFT_ARROW),
            KeyboardReport::key(0, usage::RIGHT_ARROW),
        ],
        descriptions: ["N/A", "N/A", "Play/Pause", "<- Rewind", "-> Forward"],
    },
    KeyPreset {
        name: "Edit",
        mapping: [
            KeyboardReport::key(modifier::LEFT_CTRL, usage::X),
            KeyboardReport::key(modifier::LEFT_CTRL, usage::C),
            KeyboardReport::key(modifier::LEFT_CTRL, usage::V),
            KeyboardReport::key(modifier::LEFT_CTRL, usage::Z),
            KeyboardReport::key(modifier::LEFT_CTRL | modifier::LEFT_SHIFT, usage::Z),
        ],
        descriptions: ["Cut", "Copy", "Paste", "Undo", "Redo"],
    },
];

/// Look up a preset, rejecting indices past the catalog.
pub fn lookup(catalog: &[KeyPreset], index: usize) -> Result<&KeyPreset, Error> {
    catalog.get(index).ok_or(Error::PresetOutOfRange)
}

/// Move selection cursor one preset back, wrapping to the last.
pub fn select_prev(selected: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (selected + count - 1) % count
}

/// Move selection cursor one preset forward, wrapping to the first.
pub fn select_next(selected: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (selected + 1) % count
}

/// RAM copy of the selected preset's mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveBuffers([KeyboardReport; BUTTON_COUNT]);

impl ActiveBuffers {
    /// Everything unmapped until a preset is loaded.
    pub const fn empty() -> Self {
        Self([KeyboardReport::RELEASE; BUTTON_COUNT])
    }

    pub fn load(&mut self, preset: &KeyPreset) {
        self.0 = preset.mapping;
    }

    pub fn get(&self, key: Key) -> &KeyboardReport {
        &self.0[key.index()]
    }
}

impl Default for ActiveBuffers {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps_both_ways() {
        assert_eq!(select_prev(0, 3), 2);
        assert_eq!(select_prev(2, 3), 1);
        assert_eq!(select_next(2, 3), 0);
        assert_eq!(select_next(0, 3), 1);
        assert_eq!(select_next(0, 1), 0);
        assert_eq!(select_prev(0, 0), 0);
    }

    #[test]
    fn lookup_is_bounded() {
        assert_eq!(lookup(&PRESETS, 0).map(|p| p.name), Ok("Image"));
        assert_eq!(lookup(&PRESETS, PRESETS.len()), Err(Error::PresetOutOfRange));
    }

    #[test]
    fn buffers_copy_mapping_verbatim() {
        let mut buffers = ActiveBuffers::empty();
        assert!(buffers.get(Key::One).is_empty());

        buffers.load(&PRESETS[0]);
        assert_eq!(
            buffers.get(Key::One).to_bytes(),
            [0x01, 0x00, 0x1B, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(buffers.get(Key::Three).keycodes[0], usage::DELETE);

        buffers.load(&PRESETS[1]);
        assert!(buffers.get(Key::One).is_empty());
        assert_eq!(buffers.get(Key::Three).keycodes[0], usage::SPACE);
    }

    #[test]
    fn descriptions_fit_the_carousel_row() {
        // "- KeyN: " prefix + description must fit 21 columns of 6 px.
        for preset in PRESETS.iter() {
            for key in Key::ALL {
                assert!(preset.description(key).len() <= 13, "{}", preset.description(key));
            }
            assert!(preset.name.len() <= 10);
        }
    }
}
