use crate::config;

/// Panel power level derived from idle time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerLevel {
    Normal,
    Low,
    Off,
}

/// Idle thresholds for the three-level panel power policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayTimeouts {
    /// Idle time that drops to low brightness.
    pub almost_ms: u64,
    /// Idle time that powers the panel off.
    pub off_ms: u64,
    /// How often the thresholds are compared.
    pub check_period_ms: u64,
}

impl Default for DisplayTimeouts {
    fn default() -> Self {
        Self {
            almost_ms: config::SCREEN_ALMOST_TIMEOUT_MS,
            off_ms: config::SCREEN_OFF_TIMEOUT_MS,
            check_period_ms: config::SCREEN_TIMEOUT_CHECK_MS,
        }
    }
}

/// Decide the panel power level from time since the last activity.
///
/// The two thresholds are compared independently, so an `off_ms` below
/// `almost_ms` simply skips the low-brightness stage.
pub fn power_level(idle_ms: u64, timeouts: &DisplayTimeouts) -> PowerLevel {
    if idle_ms >= timeouts.off_ms {
        PowerLevel::Off
    } else if idle_ms >= timeouts.almost_ms {
        PowerLevel::Low
    } else {
        PowerLevel::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_normal_before_almost_threshold() {
        let t = DisplayTimeouts::default();
        assert_eq!(power_level(0, &t), PowerLevel::Normal);
        assert_eq!(power_level(4_999, &t), PowerLevel::Normal);
    }

    #[test]
    fn dims_between_thresholds() {
        let t = DisplayTimeouts::default();
        assert_eq!(power_level(5_000, &t), PowerLevel::Low);
        assert_eq!(power_level(9_999, &t), PowerLevel::Low);
    }

    #[test]
    fn turns_off_at_off_threshold() {
        let t = DisplayTimeouts::default();
        assert_eq!(power_level(10_000, &t), PowerLevel::Off);
        assert_eq!(power_level(u64::MAX, &t), PowerLevel::Off);
    }

    #[test]
    fn off_below_almost_skips_dimming() {
        let t = DisplayTimeouts {
            almost_ms: 5_000,
            off_ms: 2_000,
            check_period_ms: 1_000,
        };
        assert_eq!(power_level(3_000, &t), PowerLevel::Off);
    }
}
