//! Fixed-point compensation of raw ADC values.
//!
//! Bit-exact ports of the reference formulas in the BMP280 datasheet
//! (BST-BMP280-DS001 rev 1.26, section 3.11.3 and appendix 8.2). Right shifts
//! on signed values are arithmetic, as in the reference code. Products that
//! may exceed 32 bits for out-of-range inputs wrap the way the C reference
//! does.

use crate::calibration::Calibration;
use crate::config::Arithmetic;
use crate::measurement::{Measurement, RawSample, Reading, SKIPPED};

/// Fine temperature (`t_fine`), carried from the temperature step into the
/// pressure step of the same conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FineTemperature(pub i32);

/// Compensates a raw temperature.
///
/// Returns the temperature in hundredths of a degree Celsius (5123 is
/// 51.23 °C) together with the fine temperature needed by the pressure
/// formulas.
pub fn temperature(adc_t: u32, calib: &Calibration) -> (i32, FineTemperature) {
    let adc_t = adc_t as i32;
    let t1 = calib.dig_t1 as i32;
    let t2 = calib.dig_t2 as i32;
    let t3 = calib.dig_t3 as i32;

    let var1 = ((adc_t >> 3) - (t1 << 1)).wrapping_mul(t2) >> 11;
    let delta = (adc_t >> 4) - t1;
    let var2 = (delta.wrapping_mul(delta) >> 12).wrapping_mul(t3) >> 14;

    let t_fine = var1.wrapping_add(var2);
    let centi_celsius = t_fine.wrapping_mul(5).wrapping_add(128) >> 8;
    (centi_celsius, FineTemperature(t_fine))
}

/// Compensates a raw pressure with 64-bit intermediates.
///
/// Returns pressure in Pa as unsigned Q24.8 (24674867 is 96386.2 Pa).
/// Returns 0 when the calibration makes the divisor zero.
pub fn pressure_q24_8(adc_p: u32, calib: &Calibration, fine: FineTemperature) -> u32 {
    let p1 = calib.dig_p1 as i64;
    let p2 = calib.dig_p2 as i64;
    let p3 = calib.dig_p3 as i64;
    let p4 = calib.dig_p4 as i64;
    let p5 = calib.dig_p5 as i64;
    let p6 = calib.dig_p6 as i64;
    let p7 = calib.dig_p7 as i64;
    let p8 = calib.dig_p8 as i64;
    let p9 = calib.dig_p9 as i64;

    let mut var1 = fine.0 as i64 - 128000;
    let mut var2 = var1.wrapping_mul(var1).wrapping_mul(p6);
    var2 = var2.wrapping_add(var1.wrapping_mul(p5) << 17);
    var2 = var2.wrapping_add(p4 << 35);
    var1 = (var1.wrapping_mul(var1).wrapping_mul(p3) >> 8)
        .wrapping_add(var1.wrapping_mul(p2) << 12);
    var1 = (1i64 << 47).wrapping_add(var1).wrapping_mul(p1) >> 33;

    if var1 == 0 {
        return 0;
    }

    let mut p = 1_048_576 - adc_p as i64;
    p = (p << 31)
        .wrapping_sub(var2)
        .wrapping_mul(3125)
        .wrapping_div(var1);
    var1 = p9.wrapping_mul(p >> 13).wrapping_mul(p >> 13) >> 25;
    var2 = p8.wrapping_mul(p) >> 19;
    p = p.wrapping_add(var1).wrapping_add(var2) >> 8;
    p = p.wrapping_add(p7 << 4);
    p as u32
}

/// Compensates a raw pressure with 32-bit intermediates.
///
/// Returns pressure in whole Pa (96386 is 963.86 hPa). Returns 0 when the
/// calibration makes the divisor zero.
pub fn pressure_pa(adc_p: u32, calib: &Calibration, fine: FineTemperature) -> u32 {
    let p1 = calib.dig_p1 as i32;
    let p2 = calib.dig_p2 as i32;
    let p3 = calib.dig_p3 as i32;
    let p4 = calib.dig_p4 as i32;
    let p5 = calib.dig_p5 as i32;
    let p6 = calib.dig_p6 as i32;
    let p7 = calib.dig_p7 as i32;
    let p8 = calib.dig_p8 as i32;
    let p9 = calib.dig_p9 as i32;

    let mut var1 = (fine.0 >> 1) - 64000;
    let square = (var1 >> 2).wrapping_mul(var1 >> 2);
    let mut var2 = (square >> 11).wrapping_mul(p6);
    var2 = var2.wrapping_add(var1.wrapping_mul(p5) << 1);
    var2 = (var2 >> 2).wrapping_add(p4 << 16);
    let curvature = p3.wrapping_mul(square >> 13) >> 3;
    var1 = curvature.wrapping_add(p2.wrapping_mul(var1) >> 1) >> 18;
    var1 = (32768 + var1).wrapping_mul(p1) >> 15;

    if var1 == 0 {
        return 0;
    }

    let mut p = ((1_048_576 - adc_p as i32) as u32)
        .wrapping_sub((var2 >> 12) as u32)
        .wrapping_mul(3125);
    if p < 0x8000_0000 {
        p = (p << 1) / var1 as u32;
    } else {
        p = (p / var1 as u32).wrapping_mul(2);
    }

    let p_squared = ((p >> 3).wrapping_mul(p >> 3) >> 13) as i32;
    var1 = p9.wrapping_mul(p_squared) >> 12;
    var2 = ((p >> 2) as i32).wrapping_mul(p8) >> 13;
    let correction = var1.wrapping_add(var2).wrapping_add(p7) >> 4;
    (p as i32).wrapping_add(correction) as u32
}

impl Arithmetic {
    /// Pressure in Pa with the selected arithmetic width.
    pub fn pressure(self, adc_p: u32, calib: &Calibration, fine: FineTemperature) -> f32 {
        match self {
            Arithmetic::Wide64 => pressure_q24_8(adc_p, calib, fine) as f32 / 256.0,
            Arithmetic::Narrow32 => pressure_pa(adc_p, calib, fine) as f32,
        }
    }
}

/// Turns a raw sample into a measurement.
///
/// A channel reading [`SKIPPED`] is reported as [`Reading::Disabled`]
/// without running its formula. Pressure needs the fine temperature, so it
/// is disabled as well when the temperature channel is skipped.
pub fn compensate(sample: RawSample, calib: &Calibration, arithmetic: Arithmetic) -> Measurement {
    if sample.temperature == SKIPPED {
        return Measurement {
            temperature: Reading::Disabled,
            pressure: Reading::Disabled,
        };
    }

    let (centi_celsius, fine) = temperature(sample.temperature, calib);
    let pressure = if sample.pressure == SKIPPED {
        Reading::Disabled
    } else {
        Reading::Value(arithmetic.pressure(sample.pressure, calib, fine))
    };

    Measurement {
        temperature: Reading::Value(centi_celsius as f32 / 100.0),
        pressure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::tests::DATASHEET;

    const ADC_T: u32 = 519888;
    const ADC_P: u32 = 415148;

    #[test]
    fn datasheet_temperature() {
        let (centi_celsius, fine) = temperature(ADC_T, &DATASHEET);
        assert_eq!(fine, FineTemperature(128422));
        assert_eq!(centi_celsius, 2508);
    }

    #[test]
    fn datasheet_pressure_wide() {
        let (_, fine) = temperature(ADC_T, &DATASHEET);
        let q24_8 = pressure_q24_8(ADC_P, &DATASHEET, fine);
        assert_eq!(q24_8, 25767233);
        assert_eq!(q24_8 as f32 / 256.0, 100653.25);
    }

    #[test]
    fn datasheet_pressure_narrow() {
        let (_, fine) = temperature(ADC_T, &DATASHEET);
        assert_eq!(pressure_pa(ADC_P, &DATASHEET, fine), 100656);
    }

    #[test]
    fn compensation_is_deterministic() {
        for adc_t in [0, 1, 400_000, ADC_T, 0x7FFFF, 0x80001, 0xFFFFF] {
            assert_eq!(
                temperature(adc_t, &DATASHEET),
                temperature(adc_t, &DATASHEET)
            );
            let (_, fine) = temperature(adc_t, &DATASHEET);
            assert_eq!(
                pressure_q24_8(ADC_P, &DATASHEET, fine),
                pressure_q24_8(ADC_P, &DATASHEET, fine)
            );
            assert_eq!(
                pressure_pa(ADC_P, &DATASHEET, fine),
                pressure_pa(ADC_P, &DATASHEET, fine)
            );
        }
    }

    #[test]
    fn pressure_depends_on_fine_temperature() {
        let (_, fine) = temperature(ADC_T, &DATASHEET);
        let warmer = FineTemperature(fine.0 + 1000);
        assert_eq!(pressure_q24_8(ADC_P, &DATASHEET, warmer), 25774932);
        assert_ne!(
            pressure_q24_8(ADC_P, &DATASHEET, fine),
            pressure_q24_8(ADC_P, &DATASHEET, warmer)
        );
        assert_eq!(pressure_pa(ADC_P, &DATASHEET, warmer), 100685);
    }

    #[test]
    fn zero_divisor_yields_zero() {
        let calib = Calibration {
            dig_p1: 0,
            ..DATASHEET
        };
        let (_, fine) = temperature(ADC_T, &calib);
        assert_eq!(pressure_q24_8(ADC_P, &calib, fine), 0);
        assert_eq!(pressure_pa(ADC_P, &calib, fine), 0);
    }

    #[test]
    fn extreme_calibration_wraps_instead_of_panicking() {
        let extreme = Calibration {
            dig_t1: 0,
            dig_t2: i16::MAX,
            dig_t3: i16::MAX,
            dig_p1: u16::MAX,
            dig_p2: i16::MIN,
            dig_p3: i16::MAX,
            dig_p4: i16::MAX,
            dig_p5: i16::MAX,
            dig_p6: i16::MIN,
            dig_p7: i16::MAX,
            dig_p8: i16::MIN,
            dig_p9: i16::MAX,
        };
        let inverted = Calibration {
            dig_t1: u16::MAX,
            dig_t2: i16::MIN,
            dig_t3: i16::MIN,
            dig_p1: 1,
            dig_p2: i16::MAX,
            dig_p3: i16::MIN,
            dig_p4: i16::MIN,
            dig_p5: i16::MIN,
            dig_p6: i16::MAX,
            dig_p7: i16::MIN,
            dig_p8: i16::MAX,
            dig_p9: i16::MIN,
        };

        for calib in [extreme, inverted] {
            for adc_t in [0, 0x7FFFF, 0xFFFFF] {
                for adc_p in [0, 0x7FFFF, 0xFFFFF] {
                    let sample = RawSample {
                        temperature: adc_t,
                        pressure: adc_p,
                    };
                    for arithmetic in [Arithmetic::Wide64, Arithmetic::Narrow32] {
                        let measurement = compensate(sample, &calib, arithmetic);
                        assert_eq!(measurement, compensate(sample, &calib, arithmetic));
                    }
                }
            }
        }
    }

    #[test]
    fn compensate_datasheet_sample() {
        let sample = RawSample {
            temperature: ADC_T,
            pressure: ADC_P,
        };
        let wide = compensate(sample, &DATASHEET, Arithmetic::Wide64);
        assert_eq!(wide.temperature, Reading::Value(25.08));
        assert_eq!(wide.pressure, Reading::Value(100653.25));

        let narrow = compensate(sample, &DATASHEET, Arithmetic::Narrow32);
        assert_eq!(narrow.pressure, Reading::Value(100656.0));
    }

    #[test]
    fn skipped_temperature_reads_zero() {
        let sample = RawSample {
            temperature: SKIPPED,
            pressure: ADC_P,
        };
        for calib in [DATASHEET, Calibration::default()] {
            let measurement = compensate(sample, &calib, Arithmetic::Wide64);
            assert_eq!(measurement.temperature, Reading::Disabled);
            assert_eq!(measurement.temperature_celsius(), 0.0);
            assert!(measurement.pressure.is_disabled());
        }
    }

    #[test]
    fn skipped_pressure_reads_zero() {
        let sample = RawSample {
            temperature: ADC_T,
            pressure: SKIPPED,
        };
        let measurement = compensate(sample, &DATASHEET, Arithmetic::Narrow32);
        assert_eq!(measurement.temperature, Reading::Value(25.08));
        assert_eq!(measurement.pressure, Reading::Disabled);
        assert_eq!(measurement.pressure_pa(), 0.0);
    }
}
