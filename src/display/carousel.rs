/// Auto-advancing index over a fixed number of entries.
#[derive(Debug, Default)]
pub struct Carousel {
    index: u8,
    last_advance_ms: u64,
}

impl Carousel {
    pub const fn new() -> Self {
        Self {
            index: 0,
            last_advance_ms: 0,
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    /// Back to the first entry, dwelling from `now_ms`.
    pub fn reset(&mut self, now_ms: u64) {
        self.index = 0;
        self.last_advance_ms = now_ms;
    }

    /// Advance once `dwell_ms` has passed. Returns true on advance.
    pub fn tick(&mut self, now_ms: u64, dwell_ms: u64, len: u8) -> bool {
        if len == 0 || now_ms.saturating_sub(self.last_advance_ms) < dwell_ms {
            return false;
        }
        self.index = (self.index + 1) % len;
        self.last_advance_ms = now_ms;
        true
    }
}
