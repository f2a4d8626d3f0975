//! Fixed-point compensation of raw ADC values.
//!
//! The formulas below are the integer reference algorithm from the BME280
//! datasheet (section 4.2.3). The operation order is load-bearing: the
//! intermediate values are scaled to stay inside `i32`/`i64` range, so the
//! shifts and multiplies must not be reordered.
//!
//! Pressure and humidity compensation require [`TFine`], which only
//! [`compensate_temperature`] produces. The borrow of a `TFine` value is the
//! ordering contract: temperature first, then pressure/humidity for the same
//! raw sample.

use crate::{CalibrationData, Humidity, Measurement, Pressure, RawSample, Temperature};

/// Fine-resolution temperature intermediate.
///
/// Produced by [`compensate_temperature`] and consumed by
/// [`compensate_pressure`] and [`compensate_humidity`]. It carries the
/// temperature dependency of the pressure and humidity polynomials, so it must
/// come from the same measurement cycle as the raw values it is combined with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TFine(pub(crate) i32);

/// Converts a raw 20-bit temperature ADC value to centi-degrees Celsius.
///
/// Returns the compensated temperature and the [`TFine`] value needed for
/// the pressure and humidity compensation of the same cycle.
pub fn compensate_temperature(adc_temp: u32, calib: &CalibrationData) -> (Temperature, TFine) {
    let adc_temp = adc_temp as i32;
    let dig_t1 = calib.dig_t1 as i32;

    let var1 = (((adc_temp >> 3) - (dig_t1 << 1)) * (calib.dig_t2 as i32)) >> 11;
    let var2 = (((((adc_temp >> 4) - dig_t1) * ((adc_temp >> 4) - dig_t1)) >> 12)
        * (calib.dig_t3 as i32))
        >> 14;
    let t_fine = var1 + var2;

    (Temperature((t_fine * 5 + 128) >> 8), TFine(t_fine))
}

/// Converts a raw 20-bit pressure ADC value to Pascal in Q24.8 fixed-point.
///
/// Uses 64-bit intermediates; the trim products exceed 32-bit range. If the
/// denominator term evaluates to zero the function returns a zero pressure
/// sentinel instead of dividing, matching the reference algorithm's guard.
pub fn compensate_pressure(adc_press: u32, calib: &CalibrationData, t_fine: TFine) -> Pressure {
    let mut var1 = (t_fine.0 as i64) - 128000;
    let mut var2 = var1 * var1 * (calib.dig_p6 as i64);
    var2 += (var1 * (calib.dig_p5 as i64)) << 17;
    var2 += (calib.dig_p4 as i64) << 35;
    var1 = ((var1 * var1 * (calib.dig_p3 as i64)) >> 8) + ((var1 * (calib.dig_p2 as i64)) << 12);
    var1 = (((1i64 << 47) + var1) * (calib.dig_p1 as i64)) >> 33;

    if var1 == 0 {
        // Occurs when dig_P1 is zero; the division below would trap.
        return Pressure(0);
    }

    let mut p = 1048576 - (adc_press as i64);
    p = (((p << 31) - var2) * 3125) / var1;
    var1 = ((calib.dig_p9 as i64) * (p >> 13) * (p >> 13)) >> 25;
    var2 = ((calib.dig_p8 as i64) * p) >> 19;
    p = ((p + var1 + var2) >> 8) + ((calib.dig_p7 as i64) << 4);

    Pressure(p as u32)
}

/// Converts a raw 16-bit humidity ADC value to %RH in Q22.10 fixed-point.
///
/// The polynomial can leave the representable range for extreme inputs, so
/// the result is saturated to `[0, 419430400]` before the final shift. This
/// bounds the output to `[0, 102400]`, i.e. 0..100 %RH.
pub fn compensate_humidity(adc_hum: u16, calib: &CalibrationData, t_fine: TFine) -> Humidity {
    let var1 = t_fine.0 - 76800;

    let var2 = (((((adc_hum as i32) << 14)
        - ((calib.dig_h4 as i32) << 20)
        - ((calib.dig_h5 as i32) * var1))
        + 16384)
        >> 15)
        * (((((((var1 * (calib.dig_h6 as i32)) >> 10)
            * (((var1 * (calib.dig_h3 as i32)) >> 11) + 32768))
            >> 10)
            + 2097152)
            * (calib.dig_h2 as i32)
            + 8192)
            >> 14);

    let var3 = var2 - (((((var2 >> 15) * (var2 >> 15)) >> 7) * (calib.dig_h1 as i32)) >> 4);

    Humidity((var3.clamp(0, 419_430_400) >> 12) as u32)
}

/// Compensates a full raw sample, managing the ordering internally:
/// temperature first, then pressure and humidity from the resulting `t_fine`.
pub fn compensate(raw: &RawSample, calib: &CalibrationData) -> Measurement {
    let (temp, t_fine) = compensate_temperature(raw.adc_temperature, calib);
    let pres = compensate_pressure(raw.adc_pressure, calib, t_fine);
    let hum = compensate_humidity(raw.adc_humidity, calib, t_fine);

    Measurement { temp, hum, pres }
}
