//! Battery gauge - ADC code → cell voltage → state of charge.
//!
//! Li-Po discharge is far from linear: most of the capacity sits on a
//! plateau around 3.7 V and the voltage falls off a cliff below 3.5 V.
//! The percentage is therefore read off a breakpoint table with linear
//! interpolation between neighbours instead of a single linear map.
//!
//! The low-battery flag is a separate threshold on the voltage, so the
//! warning point can move without bending the displayed curve.

use crate::config::{
    ADC_FULL_SCALE, ADC_REFERENCE_VOLTS, BATTERY_DIVIDER_RATIO, BATTERY_SAMPLE_PERIOD_MS,
    LOW_BATTERY_VOLTS,
};
use crate::error::Error;
use crate::io::{AnalogInput, Transport};

/// One point of the discharge curve.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Breakpoint {
    pub volts: f32,
    pub percent: u8,
}

const fn bp(volts: f32, percent: u8) -> Breakpoint {
    Breakpoint { volts, percent }
}

/// Generic single-cell 3.7 V Li-Po curve, full to cut-off.
///
/// 4.2 V drops to ~4.15 V within minutes of unplugging, so 4.15 V already
/// counts as full; 3.25 V is around the protection board cut-off.
pub const LIPO_DISCHARGE_CURVE: [Breakpoint; 13] = [
    bp(4.15, 100),
    bp(4.05, 95),
    bp(3.97, 90),
    bp(3.90, 80),
    bp(3.80, 70),
    bp(3.73, 60),
    bp(3.67, 50),
    bp(3.61, 40),
    bp(3.56, 30),
    bp(3.50, 20),
    bp(3.42, 10),
    bp(3.35, 5),
    bp(3.25, 0),
];

/// Check that a table can be interpolated: at least two points, voltages
/// strictly descending, percentages non-increasing from 100 down to 0.
pub fn validate_table(table: &[Breakpoint]) -> Result<(), Error> {
    let (Some(first), Some(last)) = (table.first(), table.last()) else {
        return Err(Error::InvalidBreakpointTable);
    };
    if table.len() < 2 || first.percent != 100 || last.percent != 0 {
        return Err(Error::InvalidBreakpointTable);
    }
    let ordered = table
        .windows(2)
        .all(|pair| pair[0].volts > pair[1].volts && pair[0].percent >= pair[1].percent);
    if !ordered {
        return Err(Error::InvalidBreakpointTable);
    }
    Ok(())
}

/// State of charge for `volts`, clamped to 0..=100.
///
/// Above the first breakpoint → 100, at or below the last → 0, otherwise
/// interpolate inside the bracketing segment `v_low < volts <= v_high` and
/// truncate. A segment whose percentage rises with falling voltage is read
/// as flat at its lower end's percentage.
pub fn percentage_for(table: &[Breakpoint], volts: f32) -> u8 {
    let (Some(first), Some(last)) = (table.first(), table.last()) else {
        return 0;
    };
    if volts >= first.volts {
        return 100;
    }
    if volts <= last.volts {
        return 0;
    }

    for pair in table.windows(2) {
        let (high, low) = (pair[0], pair[1]);
        if volts <= high.volts && volts > low.volts {
            let span = f32::from(high.percent.saturating_sub(low.percent));
            let p = f32::from(low.percent) + (volts - low.volts) / (high.volts - low.volts) * span;
            return p as u8;
        }
    }

    // Only reachable for NaN.
    0
}

/// ADC transfer function and the divider in front of it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdcCalibration {
    pub reference_volts: f32,
    pub full_scale: u16,
    pub divider_ratio: f32,
}

impl AdcCalibration {
    /// Volts at the ADC pin.
    pub fn pin_volts(&self, code: u16) -> f32 {
        f32::from(code) * self.reference_volts / f32::from(self.full_scale)
    }

    /// Volts at the cell, undoing the divider.
    pub fn cell_volts(&self, code: u16) -> f32 {
        self.pin_volts(code) / self.divider_ratio
    }
}

impl Default for AdcCalibration {
    fn default() -> Self {
        Self {
            reference_volts: ADC_REFERENCE_VOLTS,
            full_scale: ADC_FULL_SCALE,
            divider_ratio: BATTERY_DIVIDER_RATIO,
        }
    }
}

/// Result of one voltage sample.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatterySample {
    pub volts: f32,
    pub percent: u8,
    pub is_low: bool,
}

pub struct BatteryEstimator {
    table: &'static [Breakpoint],
    calibration: AdcCalibration,
    low_threshold: f32,
    sample_period_ms: u64,
    volts: f32,
    is_low: bool,
    last_sample_ms: Option<u64>,
}

impl BatteryEstimator {
    pub fn new(
        table: &'static [Breakpoint],
        calibration: AdcCalibration,
        low_threshold: f32,
    ) -> Result<Self, Error> {
        validate_table(table)?;
        Ok(Self {
            table,
            calibration,
            low_threshold,
            sample_period_ms: BATTERY_SAMPLE_PERIOD_MS,
            volts: 0.0,
            is_low: false,
            last_sample_ms: None,
        })
    }

    /// Record a raw conversion taken at `now_ms`.
    pub fn record_raw(&mut self, code: u16, now_ms: u64) -> BatterySample {
        self.volts = self.calibration.cell_volts(code);
        self.last_sample_ms = Some(now_ms);

        let is_low = self.volts < self.low_threshold;
        if is_low != self.is_low {
            if is_low {
                warn!("Battery: low ({} V)", self.volts);
            } else {
                info!("Battery: recovered ({} V)", self.volts);
            }
        }
        self.is_low = is_low;

        self.sample()
    }

    /// Boot-time read so the first frame does not show 0%.
    ///
    /// The first conversion after power-up is discarded while the input
    /// settles.
    pub fn prime(&mut self, adc: &mut impl AnalogInput, now_ms: u64) -> Result<BatterySample, Error> {
        adc.read_raw()?;
        let code = adc.read_raw()?;
        Ok(self.record_raw(code, now_ms))
    }

    /// Sample on the fixed cadence. Returns the new sample when one was
    /// taken. A failed read keeps the previous voltage and waits a full
    /// period before retrying.
    pub fn poll(&mut self, now_ms: u64, adc: &mut impl AnalogInput) -> Option<BatterySample> {
        let due = match self.last_sample_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.sample_period_ms,
        };
        if !due {
            return None;
        }

        match adc.read_raw() {
            Ok(code) => Some(self.record_raw(code, now_ms)),
            Err(_e) => {
                warn!("Battery: ADC read failed: {:?}", _e);
                self.last_sample_ms = Some(now_ms);
                None
            }
        }
    }

    pub fn volts(&self) -> f32 {
        self.volts
    }

    pub fn percentage(&self) -> u8 {
        percentage_for(self.table, self.volts)
    }

    pub fn is_low(&self) -> bool {
        self.is_low
    }

    pub fn sample(&self) -> BatterySample {
        BatterySample {
            volts: self.volts,
            percent: self.percentage(),
            is_low: self.is_low,
        }
    }

    /// Push the current level to the host's Battery Service, if linked.
    pub fn report(&self, transport: &mut impl Transport) {
        if transport.is_connected() {
            transport.set_battery_level(self.percentage());
        }
    }
}

impl Default for BatteryEstimator {
    fn default() -> Self {
        Self {
            table: &LIPO_DISCHARGE_CURVE,
            calibration: AdcCalibration::default(),
            low_threshold: LOW_BATTERY_VOLTS,
            sample_period_ms: BATTERY_SAMPLE_PERIOD_MS,
            volts: 0.0,
            is_low: false,
            last_sample_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static THREE_POINT: [Breakpoint; 3] = [bp(4.15, 100), bp(3.67, 50), bp(3.25, 0)];

    struct FixedAdc(Result<u16, Error>);

    impl AnalogInput for FixedAdc {
        fn read_raw(&mut self) -> Result<u16, Error> {
            self.0
        }
    }

    /// Code that reads back as roughly `volts` at the cell.
    fn code_for(volts: f32) -> u16 {
        let cal = AdcCalibration::default();
        (volts * cal.divider_ratio * f32::from(cal.full_scale) / cal.reference_volts) as u16
    }

    #[test]
    fn shipped_curve_is_valid() {
        assert_eq!(validate_table(&LIPO_DISCHARGE_CURVE), Ok(()));
    }

    #[test]
    fn rejects_malformed_tables() {
        assert_eq!(validate_table(&[]), Err(Error::InvalidBreakpointTable));
        assert_eq!(
            validate_table(&[bp(4.0, 100)]),
            Err(Error::InvalidBreakpointTable)
        );
        assert_eq!(
            validate_table(&[bp(3.5, 100), bp(3.9, 0)]),
            Err(Error::InvalidBreakpointTable)
        );
        assert_eq!(
            validate_table(&[bp(4.1, 100), bp(3.8, 60), bp(3.7, 70), bp(3.2, 0)]),
            Err(Error::InvalidBreakpointTable)
        );
        static SHORT: [Breakpoint; 2] = [bp(4.0, 100), bp(3.0, 0)];
        assert!(BatteryEstimator::new(&SHORT, AdcCalibration::default(), 3.4).is_ok());
        static FLAT: [Breakpoint; 2] = [bp(4.0, 100), bp(4.0, 0)];
        assert!(BatteryEstimator::new(&FLAT, AdcCalibration::default(), 3.4).is_err());
    }

    #[test]
    fn unvalidated_rising_segment_reads_flat() {
        let table = [bp(4.0, 50), bp(3.5, 80), bp(3.0, 0)];
        assert_eq!(percentage_for(&table, 3.7), 80);
        assert_eq!(percentage_for(&table, 3.2), 32);
    }

    #[test]
    fn breakpoints_map_exactly() {
        assert_eq!(percentage_for(&THREE_POINT, 4.15), 100);
        assert_eq!(percentage_for(&THREE_POINT, 3.67), 50);
        assert_eq!(percentage_for(&THREE_POINT, 3.25), 0);
    }

    #[test]
    fn interpolates_inside_segment() {
        let p = percentage_for(&THREE_POINT, 3.46);
        assert!(p > 0 && p < 50, "got {p}");
        // (3.46 - 3.25) / 0.42 * 50 = 25
        assert!((24..=25).contains(&p));
    }

    #[test]
    fn clamps_outside_table() {
        for v in [4.15, 4.2, 5.0, 100.0] {
            assert_eq!(percentage_for(&LIPO_DISCHARGE_CURVE, v), 100);
        }
        for v in [3.25, 3.0, 0.0, -1.0] {
            assert_eq!(percentage_for(&LIPO_DISCHARGE_CURVE, v), 0);
        }
        assert_eq!(percentage_for(&LIPO_DISCHARGE_CURVE, f32::NAN), 0);
        assert_eq!(percentage_for(&[], 3.7), 0);
    }

    #[test]
    fn monotonic_across_the_whole_curve() {
        let mut previous = 0u8;
        let mut mv = 3000;
        while mv <= 4300 {
            let p = percentage_for(&LIPO_DISCHARGE_CURVE, mv as f32 / 1000.0);
            assert!(p >= previous, "{} mV gave {} after {}", mv, p, previous);
            previous = p;
            mv += 1;
        }
        assert_eq!(previous, 100);
    }

    #[test]
    fn every_curve_point_is_hit() {
        for point in LIPO_DISCHARGE_CURVE.iter() {
            assert_eq!(percentage_for(&LIPO_DISCHARGE_CURVE, point.volts), point.percent);
        }
    }

    #[test]
    fn adc_conversion_undoes_divider() {
        let cal = AdcCalibration::default();
        assert_eq!(cal.pin_volts(0), 0.0);
        let full = cal.pin_volts(4096);
        assert!((full - ADC_REFERENCE_VOLTS).abs() < 1e-4);
        assert!((cal.cell_volts(4096) - ADC_REFERENCE_VOLTS / BATTERY_DIVIDER_RATIO).abs() < 1e-4);
    }

    #[test]
    fn low_flag_is_a_voltage_threshold() {
        let mut battery = BatteryEstimator::default();
        let sample = battery.record_raw(code_for(3.38), 0);
        assert!(sample.is_low);
        // Still above 0% on the curve; the flag is independent of it.
        assert!(sample.percent > 0);

        let sample = battery.record_raw(code_for(3.9), 1);
        assert!(!sample.is_low);
    }

    #[test]
    fn poll_honours_cadence() {
        let mut battery = BatteryEstimator::default();
        let mut adc = FixedAdc(Ok(code_for(3.9)));
        assert!(battery.poll(0, &mut adc).is_some());
        assert!(battery.poll(BATTERY_SAMPLE_PERIOD_MS - 1, &mut adc).is_none());
        assert!(battery.poll(BATTERY_SAMPLE_PERIOD_MS, &mut adc).is_some());
    }

    #[test]
    fn failed_read_keeps_previous_voltage() {
        let mut battery = BatteryEstimator::default();
        battery.record_raw(code_for(3.9), 0);
        let before = battery.volts();

        let mut adc = FixedAdc(Err(Error::Adc));
        assert!(battery.poll(BATTERY_SAMPLE_PERIOD_MS, &mut adc).is_none());
        assert_eq!(battery.volts(), before);
    }

    #[test]
    fn prime_discards_first_conversion() {
        struct Sequence([u16; 2], usize);
        impl AnalogInput for Sequence {
            fn read_raw(&mut self) -> Result<u16, Error> {
                let code = self.0[self.1];
                self.1 += 1;
                Ok(code)
            }
        }

        let mut battery = BatteryEstimator::default();
        let mut adc = Sequence([0, code_for(4.0)], 0);
        let sample = battery.prime(&mut adc, 0).unwrap();
        assert!(sample.percent > 90);
        assert_eq!(adc.1, 2);
    }
}
