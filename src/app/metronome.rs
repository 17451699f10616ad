//! Metronome: fixed-tempo clicks with an accented downbeat.

use crate::input::Key;

pub const DEFAULT_BPM: u16 = 120;
pub const MIN_BPM: u16 = 30;
pub const MAX_BPM: u16 = 240;
const BPM_STEP: u16 = 5;

/// Beats per bar (over 4).
pub const MIN_SIGNATURE: u8 = 2;
pub const MAX_SIGNATURE: u8 = 7;
const DEFAULT_SIGNATURE: u8 = 4;

/// One click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Beat {
    /// Position in the bar, 0-based.
    pub index: u8,
    /// First beat of the bar.
    pub accent: bool,
}

#[derive(Debug)]
pub struct Metronome {
    bpm: u16,
    signature: u8,
    running: bool,
    beat: u8,
    next_beat_ms: u64,
}

impl Metronome {
    pub const fn new() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            signature: DEFAULT_SIGNATURE,
            running: false,
            beat: 0,
            next_beat_ms: 0,
        }
    }

    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    pub fn signature(&self) -> u8 {
        self.signature
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval_ms(&self) -> u64 {
        60_000 / self.bpm as u64
    }

    pub fn slower(&mut self) {
        self.bpm = self.bpm.saturating_sub(BPM_STEP).max(MIN_BPM);
    }

    pub fn faster(&mut self) {
        self.bpm = (self.bpm + BPM_STEP).min(MAX_BPM);
    }

    pub fn cycle_signature(&mut self) {
        self.signature = if self.signature >= MAX_SIGNATURE {
            MIN_SIGNATURE
        } else {
            self.signature + 1
        };
        self.beat = 0;
    }

    /// Start on a downbeat right away, or stop.
    pub fn toggle(&mut self, now_ms: u64) {
        if self.running {
            self.stop();
        } else {
            self.running = true;
            self.beat = 0;
            self.next_beat_ms = now_ms;
            info!("Metronome: start {=u16} bpm {=u8}/4", self.bpm, self.signature);
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("Metronome: stop");
        }
        self.running = false;
    }

    /// Metronome screen keys: 1 slower, 2 faster, 3 signature, 4 run.
    pub fn handle_key(&mut self, key: Key, now_ms: u64) {
        match key {
            Key::One => self.slower(),
            Key::Two => self.faster(),
            Key::Three => self.cycle_signature(),
            Key::Four => self.toggle(now_ms),
            Key::Five => {}
        }
    }

    /// The beat that is due at `now_ms`, if any. A late caller gets one
    /// beat and the schedule restarts from now rather than bursting.
    pub fn poll(&mut self, now_ms: u64) -> Option<Beat> {
        if !self.running || now_ms < self.next_beat_ms {
            return None;
        }
        let beat = Beat {
            index: self.beat,
            accent: self.beat == 0,
        };
        self.beat = (self.beat + 1) % self.signature;
        self.next_beat_ms += self.interval_ms();
        if self.next_beat_ms <= now_ms {
            self.next_beat_ms = now_ms + self.interval_ms();
        }
        Some(beat)
    }
}

impl Default for Metronome {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tempo_is_clamped() {
        let mut m = Metronome::new();
        for _ in 0..100 {
            m.faster();
        }
        assert_eq!(m.bpm(), MAX_BPM);
        for _ in 0..100 {
            m.slower();
        }
        assert_eq!(m.bpm(), MIN_BPM);
        assert_eq!(m.interval_ms(), 2_000);
    }

    #[test]
    fn signature_cycles() {
        let mut m = Metronome::new();
        let seen: heapless::Vec<u8, 8> = (0..6)
            .map(|_| {
                m.cycle_signature();
                m.signature()
            })
            .collect();
        assert_eq!(seen.as_slice(), &[5, 6, 7, 2, 3, 4]);
    }

    #[test]
    fn beats_follow_tempo_with_accent() {
        let mut m = Metronome::new();
        m.handle_key(Key::Three, 0); // 5/4
        m.handle_key(Key::Four, 1_000);

        let mut beats: heapless::Vec<(u64, Beat), 16> = heapless::Vec::new();
        for now in (1_000..4_000).step_by(10) {
            if let Some(b) = m.poll(now) {
                beats.push((now, b)).unwrap();
            }
        }
        // 120 bpm: every 500 ms starting immediately.
        assert_eq!(beats.len(), 6);
        assert_eq!(beats[0], (1_000, Beat { index: 0, accent: true }));
        assert_eq!(beats[1].0, 1_500);
        assert!(!beats[1].1.accent);
        assert_eq!(beats[5].1, Beat { index: 0, accent: true });
    }

    #[test]
    fn stopped_metronome_is_silent() {
        let mut m = Metronome::new();
        assert_eq!(m.poll(10_000), None);
        m.toggle(0);
        assert!(m.poll(0).is_some());
        m.stop();
        assert_eq!(m.poll(10_000), None);
    }

    #[test]
    fn late_poll_does_not_burst() {
        let mut m = Metronome::new();
        m.toggle(0);
        m.poll(0);
        assert!(m.poll(5_000).is_some());
        assert!(m.poll(5_010).is_none());
    }
}
