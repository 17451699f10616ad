//! Report dispatcher - turns stable key state into HID reports.
//!
//! Per key, a press sends the key's report once and the key then waits
//! for release; the release sends one all-keys-up report. However many
//! loop iterations a press spans, the host sees one down and one up.
//!
//! Nothing is queued while the link is down: HID input has no replay
//! semantics, so a press that happens while disconnected is simply lost.

use crate::error::Error;
use crate::hid::KeyboardReport;
use crate::input::{InputSnapshot, Key, KeyMask};
use crate::io::Transport;
use crate::preset::{self, ActiveBuffers, KeyPreset};

pub struct ReportDispatcher {
    buffers: ActiveBuffers,
    awaiting_release: KeyMask,
    enabled: bool,
}

impl ReportDispatcher {
    pub const fn new() -> Self {
        Self {
            buffers: ActiveBuffers::empty(),
            awaiting_release: KeyMask::NONE,
            enabled: true,
        }
    }

    /// Load preset `index` into the active buffers.
    ///
    /// An out-of-range index leaves the current buffers untouched. Keys
    /// already waiting for release are unaffected; the new mapping applies
    /// from their next press.
    pub fn apply_preset(&mut self, catalog: &[KeyPreset], index: usize) -> Result<(), Error> {
        let preset = preset::lookup(catalog, index)?;
        self.buffers.load(preset);
        info!("Dispatch: preset {} ({}) loaded", index, preset.name);
        Ok(())
    }

    /// Global reporting switch; off while a UI mode owns the keys.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn buffers(&self) -> &ActiveBuffers {
        &self.buffers
    }

    pub fn awaiting_release(&self) -> KeyMask {
        self.awaiting_release
    }

    /// Send whatever the snapshot calls for. Returns the number of reports
    /// handed to the transport.
    pub fn dispatch(&mut self, input: &InputSnapshot, transport: &mut impl Transport) -> usize {
        if !self.enabled || !transport.is_connected() {
            return 0;
        }

        let mut sent = 0;
        for key in Key::ALL {
            if !self.awaiting_release.contains(key)
                && (input.is_pressed(key) || input.went_down(key))
            {
                transport.send_report(self.buffers.get(key));
                self.awaiting_release.insert(key);
                sent += 1;
            }

            if self.awaiting_release.contains(key) && !input.is_pressed(key) {
                transport.send_report(&KeyboardReport::RELEASE);
                self.awaiting_release.remove(key);
                sent += 1;
            }
        }
        sent
    }

    /// Unconditional all-keys-up, used at mode boundaries so the host can
    /// never be left with a stuck key. Clears all release tracking.
    pub fn force_release(&mut self, transport: &mut impl Transport) {
        if transport.is_connected() {
            transport.send_report(&KeyboardReport::RELEASE);
        }
        self.awaiting_release = KeyMask::NONE;
    }
}

impl Default for ReportDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
