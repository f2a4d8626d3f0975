#![no_std]

//! # BME280 Environmental Sensor Driver
//!
//! A type-safe, `no_std` driver for the Bosch BME280.
//! This driver uses the typestate pattern to ensure the sensor is correctly
//! initialized and its calibration constants are loaded before measurements
//! are taken.
//!
//! ## Features
//! - **Auto-Detection**: Probes both possible I2C addresses (0x76/0x77).
//! - **Fixed-Point Arithmetic**: No FPU required; float conversions are
//!   opt-in helpers at the API boundary.
//! - **Typestate Pattern**: Compensation against unloaded calibration data
//!   is not representable.
//!
//! ## Units
//! - **Temperature**: Centigrade (C * 100) -> 2350 = 23.50 °C
//! - **Humidity**: Q22.10 fixed-point (%RH * 1024) -> 77533 = 75.72 %
//! - **Pressure**: Q24.8 fixed-point (Pa * 256) -> 25767233 = 1006.53 hPa
//!
//! ## Example
//! ```
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! # use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
//! # let mut i2c = I2cMock::new(&[
//! #     I2cTransaction::write_read(0x76, vec![0xD0], vec![0x60]),
//! #     I2cTransaction::write(0x76, vec![0xE0, 0xB6]),
//! #     I2cTransaction::write_read(0x76, vec![0x88], vec![0; 26]),
//! #     I2cTransaction::write_read(0x76, vec![0xE1], vec![0; 7]),
//! #     I2cTransaction::write(0x76, vec![0xF2, 0x01]),
//! #     I2cTransaction::write(0x76, vec![0xF4, 0x27]),
//! #     I2cTransaction::write(0x76, vec![0xF5, 0xA0]),
//! #     I2cTransaction::write_read(
//! #         0x76,
//! #         vec![0xF7],
//! #         vec![0x80, 0x00, 0x00, 0x80, 0x00, 0x00, 0x80, 0x00],
//! #     ),
//! # ]);
//! use bme280_driver::{Bme280, Bme280Builder, Oversampling};
//!
//! let mut delay = NoopDelay;
//!
//! // Probe for the sensor, then load its factory calibration data.
//! let address = bme280_driver::detect(&mut i2c)?;
//! let mut bme280 = Bme280::new(i2c, address).init(&mut delay)?;
//!
//! let config = Bme280Builder::new()
//!     .temp_oversampling(Oversampling::X1)
//!     .hum_oversampling(Oversampling::X1)
//!     .pres_oversampling(Oversampling::X1)
//!     .build();
//! bme280.configure(&config, &mut delay)?;
//!
//! let measurement = bme280.read_measurement()?;
//! let (_degrees, _centi) = measurement.temp.split();
//! # let mut i2c = bme280.release();
//! # i2c.done();
//! # Ok::<(), bme280_driver::error::Bme280Error<embedded_hal::i2c::ErrorKind>>(())
//! ```

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod calc;
mod settings;

pub use calc::{compensate, compensate_humidity, compensate_pressure, compensate_temperature, TFine};
pub use settings::{
    Bme280Builder, Config, IIRFilter, Mode, Oversampling, OversamplingConfig, Standby,
};

use embedded_hal::{delay::DelayNs, i2c};

/// Register addresses from the datasheet memory map.
mod regs {
    pub const ID: u8 = 0xD0;
    pub const RESET: u8 = 0xE0;
    pub const CTRL_HUM: u8 = 0xF2;
    pub const CTRL_MEAS: u8 = 0xF4;
    pub const CONFIG: u8 = 0xF5;
    pub const PRESS_MSB: u8 = 0xF7;
    /// Base of the temperature/pressure calibration block (26 bytes).
    pub const CALIB_TP: u8 = 0x88;
    /// Base of the humidity calibration block (7 bytes).
    pub const CALIB_H: u8 = 0xE1;

    pub const RESET_CMD: u8 = 0xB6;
}

const CALIB_TP_LEN: usize = 26;
const CALIB_H_LEN: usize = 7;
const BURST_LEN: usize = 8;

/// Identity byte returned by the ID register of every BME280.
pub const CHIP_ID: u8 = 0x60;
/// I2C address with the SDO pin pulled low. Probed first by [`detect`].
pub const PRIMARY_ADDRESS: u8 = 0x76;
/// I2C address with the SDO pin pulled high.
pub const SECONDARY_ADDRESS: u8 = 0x77;

/// Wait after [`configure`](Bme280::configure) before the first raw read.
///
/// The sensor needs this long to finish its start-up and first conversion;
/// reads issued earlier return stale or all-zero data.
pub const STARTUP_DELAY_MS: u32 = 100;

// --- Typestates ---

/// Sensor has been created but calibration data is not yet loaded.
#[derive(Debug)]
pub struct Uninitialized;

/// Sensor is initialized and holds its factory calibration constants.
#[derive(Debug)]
pub struct Ready {
    calib_data: CalibrationData,
}

/// Error types for the BME280 driver.
///
/// There is deliberately no "not initialized" variant: measurement and
/// compensation methods only exist on `Bme280<_, Ready>`, which cannot be
/// constructed without a successful calibration load.
pub mod error {
    /// Errors that can occur during communication or probing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum Bme280Error<E> {
        /// I2C bus error (NACK, timeout, device absent).
        I2CError(E),
        /// No device answered the identity probe at either known address.
        NotDetected,
    }

    /// Result type alias for BME280 operations.
    pub type Result<T, E> = core::result::Result<T, Bme280Error<E>>;
}

/// Factory-fused calibration coefficients read from the sensor.
/// These are unique to every individual chip and required by the
/// compensation formulas.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationData {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

impl CalibrationData {
    /// Parses the two calibration register blocks.
    ///
    /// `tp` is the 26-byte block starting at 0x88 (temperature and pressure
    /// trims plus H1), `h` the 7-byte block starting at 0xE1. Byte pairs are
    /// little-endian. H4 and H5 are 12-bit values that share the nibbles of
    /// byte 0xE5: H4 = `(0xE4 << 4) | (0xE5 & 0x0F)`,
    /// H5 = `(0xE5 >> 4) | (0xE6 << 4)`.
    pub fn from_register_blocks(tp: &[u8; CALIB_TP_LEN], h: &[u8; CALIB_H_LEN]) -> Self {
        CalibrationData {
            dig_t1: u16::from_le_bytes([tp[0], tp[1]]),
            dig_t2: i16::from_le_bytes([tp[2], tp[3]]),
            dig_t3: i16::from_le_bytes([tp[4], tp[5]]),
            dig_p1: u16::from_le_bytes([tp[6], tp[7]]),
            dig_p2: i16::from_le_bytes([tp[8], tp[9]]),
            dig_p3: i16::from_le_bytes([tp[10], tp[11]]),
            dig_p4: i16::from_le_bytes([tp[12], tp[13]]),
            dig_p5: i16::from_le_bytes([tp[14], tp[15]]),
            dig_p6: i16::from_le_bytes([tp[16], tp[17]]),
            dig_p7: i16::from_le_bytes([tp[18], tp[19]]),
            dig_p8: i16::from_le_bytes([tp[20], tp[21]]),
            dig_p9: i16::from_le_bytes([tp[22], tp[23]]),
            // tp[24] is register 0xA0, which holds no trim value.
            dig_h1: tp[25],
            dig_h2: i16::from_le_bytes([h[0], h[1]]),
            dig_h3: h[2],
            dig_h4: (((h[3] as u16) << 4) | ((h[4] & 0x0F) as u16)) as i16,
            dig_h5: (((h[4] >> 4) as u16) | ((h[5] as u16) << 4)) as i16,
            dig_h6: h[6] as i8,
        }
    }
}

/// Raw ADC output read directly from the measurement registers.
///
/// All three values originate from one burst read and therefore from the
/// same measurement cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    /// 20-bit pressure ADC value.
    pub adc_pressure: u32,
    /// 20-bit temperature ADC value.
    pub adc_temperature: u32,
    /// 16-bit humidity ADC value.
    pub adc_humidity: u16,
}

impl RawSample {
    /// Reconstructs the 20-bit and 16-bit ADC values from the 8-byte burst
    /// starting at the pressure MSB register (MSB-first packing).
    pub fn from_burst(buf: &[u8; BURST_LEN]) -> Self {
        RawSample {
            adc_pressure: ((buf[0] as u32) << 12) | ((buf[1] as u32) << 4) | ((buf[2] as u32) >> 4),
            adc_temperature: ((buf[3] as u32) << 12)
                | ((buf[4] as u32) << 4)
                | ((buf[5] as u32) >> 4),
            adc_humidity: ((buf[6] as u16) << 8) | (buf[7] as u16),
        }
    }
}

/// Represents temperature in Centigrade (degrees Celsius * 100).
///
/// # Example
/// A value of `2350` represents **23.50 °C**.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature(pub i32);

impl Temperature {
    /// Splits the fixed-point value into integral (degrees) and fractional
    /// (centi-degrees) parts.
    ///
    /// # Example
    /// ```rust
    /// use bme280_driver::Temperature;
    /// let temp = Temperature(2350);
    /// assert_eq!(temp.split(), (23, 50)); // Represents 23.50 °C
    /// ```
    pub fn split(&self) -> (i32, i32) {
        (self.0 / 100, self.0 % 100)
    }

    /// Floating-point convenience conversion to degrees Celsius.
    pub fn celsius(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

/// Represents relative humidity in Q22.10 fixed-point (%RH * 1024).
///
/// # Example
/// A value of `77533` represents **75.72 %rH**.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Humidity(pub u32);

impl Humidity {
    /// Converts to milli-percent (%RH * 1000).
    pub fn millipercent(&self) -> u32 {
        (self.0 * 1000) >> 10
    }

    /// Splits the value into integral and fractional percent parts.
    /// The fraction represents 3 decimal places.
    ///
    /// # Example
    /// ```rust
    /// use bme280_driver::Humidity;
    /// let hum = Humidity(77533);
    /// assert_eq!(hum.split(), (75, 715)); // Represents 75.715 %
    /// ```
    pub fn split(&self) -> (u32, u32) {
        (self.millipercent() / 1000, self.millipercent() % 1000)
    }

    /// Floating-point convenience conversion to %RH.
    pub fn percent(&self) -> f32 {
        self.0 as f32 / 1024.0
    }
}

/// Represents atmospheric pressure in Q24.8 fixed-point (Pa * 256).
///
/// # Example
/// A value of `25767233` represents **100653 Pa** (or 1006.53 hPa).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pressure(pub u32);

impl Pressure {
    /// Integer Pascal value (fractional bits discarded).
    pub fn pascals(&self) -> u32 {
        self.0 >> 8
    }

    /// Converts to Hectopascal (hPa) and splits it into integral and
    /// fractional parts.
    ///
    /// # Example
    /// ```rust
    /// use bme280_driver::Pressure;
    /// let press = Pressure(25767233);
    /// assert_eq!(press.as_hpa(), (1006, 53)); // Represents 1006.53 hPa
    /// ```
    pub fn as_hpa(&self) -> (u32, u32) {
        (self.pascals() / 100, self.pascals() % 100)
    }

    /// Floating-point convenience conversion to hPa.
    pub fn hectopascals(&self) -> f32 {
        self.0 as f32 / 25600.0
    }
}

/// Compensated measurement result in physical units.
///
/// All fields use strong types (`Temperature`, `Humidity`, `Pressure`) to
/// prevent unit confusion.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Temperature data.
    pub temp: Temperature,
    /// Humidity data.
    pub hum: Humidity,
    /// Atmospheric pressure data.
    pub pres: Pressure,
}

/// Probes both known I2C addresses for a BME280.
///
/// A device is present at an address only if its ID register returns
/// [`CHIP_ID`]. Addresses are tried in fixed preference order
/// ([`PRIMARY_ADDRESS`], then [`SECONDARY_ADDRESS`]); the first match wins.
/// A bus error during a probe means "nothing answering here" and moves on to
/// the next address, so an absent sensor is reported as
/// [`NotDetected`](error::Bme280Error::NotDetected) rather than as a
/// transport failure.
pub fn detect<I2C, E>(i2c: &mut I2C) -> error::Result<u8, E>
where
    I2C: i2c::I2c<Error = E>,
{
    for address in [PRIMARY_ADDRESS, SECONDARY_ADDRESS] {
        let mut id = [0u8; 1];
        if i2c.write_read(address, &[regs::ID], &mut id).is_ok() && id[0] == CHIP_ID {
            return Ok(address);
        }
    }

    Err(error::Bme280Error::NotDetected)
}

/// The main BME280 driver structure.
///
/// Use [`Bme280::new`] to start. The `STATE` generic uses the typestate
/// pattern to track initialization status at compile time; measurement
/// methods only exist once [`init`](Bme280::init) has loaded the calibration
/// constants.
///
/// The driver borrows the bus per transaction and makes no exclusivity
/// assumption beyond its own multi-step sequences.
#[derive(Debug)]
pub struct Bme280<I2C, STATE> {
    i2c: I2C,
    address: u8,
    state: STATE,
}

impl<I2C, E> Bme280<I2C, Uninitialized>
where
    I2C: i2c::I2c<Error = E>,
{
    /// Creates a new driver instance in the `Uninitialized` state.
    ///
    /// This does not communicate with the sensor yet.
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus object.
    /// * `address` - The I2C address of the sensor, typically obtained from
    ///   [`detect`].
    pub fn new(i2c: I2C, address: u8) -> Self {
        Bme280 {
            i2c,
            address,
            state: Uninitialized,
        }
    }

    /// Initializes the sensor: performs a soft-reset and loads the factory
    /// calibration data.
    ///
    /// This transitions the driver state from `Uninitialized` to `Ready`.
    ///
    /// # Errors
    /// Returns an error if the I2C communication fails during reset or
    /// calibration reading. No partially initialized driver is ever
    /// returned.
    pub fn init(mut self, delay: &mut impl DelayNs) -> error::Result<Bme280<I2C, Ready>, E> {
        self.reset(delay)?;

        // The two calibration blocks are non-contiguous in the register map.
        let mut tp = [0u8; CALIB_TP_LEN];
        self.read_into(regs::CALIB_TP, &mut tp)?;
        let mut h = [0u8; CALIB_H_LEN];
        self.read_into(regs::CALIB_H, &mut h)?;

        Ok(Bme280 {
            i2c: self.i2c,
            address: self.address,
            state: Ready {
                calib_data: CalibrationData::from_register_blocks(&tp, &h),
            },
        })
    }
}

impl<I2C, STATE, E> Bme280<I2C, STATE>
where
    I2C: i2c::I2c<Error = E>,
{
    /// Performs a soft-reset of the sensor.
    ///
    /// This resets all internal registers to their default values.
    /// A delay of at least 2ms is required after the reset command.
    fn reset(&mut self, delay: &mut impl DelayNs) -> error::Result<(), E> {
        self.write_reg(&[regs::RESET, regs::RESET_CMD])?;
        delay.delay_ms(2);
        Ok(())
    }

    /// Reads data from a starting register address into a provided buffer.
    ///
    /// One bus transaction: write the register pointer, then burst-read.
    fn read_into(&mut self, reg_address: u8, buffer: &mut [u8]) -> error::Result<(), E> {
        self.i2c
            .write_read(self.address, &[reg_address], buffer)
            .map_err(|e| error::Bme280Error::I2CError(e))
    }

    /// Reads a single byte from a specific register address.
    fn read_reg_byte(&mut self, reg_address: u8) -> error::Result<u8, E> {
        let mut buffer = [0];
        self.read_into(reg_address, &mut buffer)?;
        Ok(buffer[0])
    }

    /// Writes a byte slice (typically `[Register, Value]`) to the sensor.
    fn write_reg(&mut self, data: &[u8]) -> error::Result<(), E> {
        self.i2c
            .write(self.address, data)
            .map_err(|e| error::Bme280Error::I2CError(e))
    }

    /// Reads the Chip ID from the sensor (expected value: [`CHIP_ID`]).
    pub fn chip_id(&mut self) -> error::Result<u8, E> {
        self.read_reg_byte(regs::ID)
    }

    /// Consumes the driver and hands the I2C bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> Bme280<I2C, Ready>
where
    I2C: i2c::I2c<Error = E>,
{
    /// Applies a full sensor configuration.
    ///
    /// `ctrl_hum` is written strictly before `ctrl_meas`: the sensor only
    /// latches humidity oversampling when `ctrl_meas` is written afterwards.
    /// Reversing the order silently disables the humidity measurement.
    ///
    /// After the registers are written this waits [`STARTUP_DELAY_MS`] for
    /// the start-up and first conversion to complete.
    pub fn configure(&mut self, config: &Config, delay: &mut impl DelayNs) -> error::Result<(), E> {
        for write in config.register_writes() {
            self.write_reg(&write)?;
        }

        delay.delay_ms(STARTUP_DELAY_MS);
        Ok(())
    }

    /// Reads one raw sample from the measurement registers.
    ///
    /// A single 8-byte burst read retrieves all three ADC values, so they
    /// are guaranteed to originate from the same measurement cycle. Separate
    /// reads could tear across cycles.
    pub fn read_raw(&mut self) -> error::Result<RawSample, E> {
        let mut buffer = [0u8; BURST_LEN];
        self.read_into(regs::PRESS_MSB, &mut buffer)?;
        Ok(RawSample::from_burst(&buffer))
    }

    /// Reads one raw sample and compensates it into physical units.
    pub fn read_measurement(&mut self) -> error::Result<Measurement, E> {
        let raw = self.read_raw()?;
        Ok(calc::compensate(&raw, &self.state.calib_data))
    }

    /// The calibration constants loaded during [`init`](Bme280::init).
    pub fn calibration(&self) -> &CalibrationData {
        &self.state.calib_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    /// Encoding of the calc-module golden trims as register bytes.
    fn golden_tp_bytes() -> [u8; 26] {
        [
            0x70, 0x6B, // T1 = 27504
            0x43, 0x67, // T2 = 26435
            0x18, 0xFC, // T3 = -1000
            0x7D, 0x8E, // P1 = 36477
            0x43, 0xD6, // P2 = -10685
            0xD0, 0x0B, // P3 = 3024
            0x27, 0x0B, // P4 = 2855
            0x8C, 0x00, // P5 = 140
            0xF9, 0xFF, // P6 = -7
            0x8C, 0x3C, // P7 = 15500
            0xF8, 0xC6, // P8 = -14600
            0x70, 0x17, // P9 = 6000
            0xAA, // 0xA0, no trim value
            0x4B, // H1 = 75
        ]
    }

    fn golden_h_bytes() -> [u8; 7] {
        // H2 = 371, H3 = 0, H4 = 303, H5 = 50, H6 = 30
        [0x73, 0x01, 0x00, 0x12, 0x2F, 0x03, 0x1E]
    }

    fn golden_calib() -> CalibrationData {
        CalibrationData {
            dig_t1: 27504,
            dig_t2: 26435,
            dig_t3: -1000,
            dig_p1: 36477,
            dig_p2: -10685,
            dig_p3: 3024,
            dig_p4: 2855,
            dig_p5: 140,
            dig_p6: -7,
            dig_p7: 15500,
            dig_p8: -14600,
            dig_p9: 6000,
            dig_h1: 75,
            dig_h2: 371,
            dig_h3: 0,
            dig_h4: 303,
            dig_h5: 50,
            dig_h6: 30,
        }
    }

    /// The I2C traffic produced by `init` with the golden calibration data.
    fn init_transactions(address: u8) -> [I2cTransaction; 3] {
        [
            I2cTransaction::write(address, vec![regs::RESET, regs::RESET_CMD]),
            I2cTransaction::write_read(address, vec![regs::CALIB_TP], golden_tp_bytes().to_vec()),
            I2cTransaction::write_read(address, vec![regs::CALIB_H], golden_h_bytes().to_vec()),
        ]
    }

    #[test]
    fn calibration_parse_round_trips_golden_bytes() {
        let calib = CalibrationData::from_register_blocks(&golden_tp_bytes(), &golden_h_bytes());
        assert_eq!(calib, golden_calib());
    }

    #[test]
    fn h4_h5_nibble_split() {
        // H4 takes byte 0xE4 as high 8 bits plus the low nibble of 0xE5;
        // H5 takes the high nibble of 0xE5 as its low bits plus byte 0xE6.
        let mut h = golden_h_bytes();
        h[3] = 0x12;
        h[4] = 0x2F;
        h[5] = 0x03;
        let calib = CalibrationData::from_register_blocks(&golden_tp_bytes(), &h);
        assert_eq!(calib.dig_h4, 0x12F);
        assert_eq!(calib.dig_h5, 0x032);

        h[3] = 0xFF;
        h[4] = 0xFF;
        h[5] = 0xFF;
        let calib = CalibrationData::from_register_blocks(&golden_tp_bytes(), &h);
        assert_eq!(calib.dig_h4, 0xFFF);
        assert_eq!(calib.dig_h5, 0xFFF);
    }

    #[test]
    fn detect_finds_primary_address() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write_read(
            PRIMARY_ADDRESS,
            vec![regs::ID],
            vec![CHIP_ID],
        )]);
        assert_eq!(detect(&mut i2c), Ok(PRIMARY_ADDRESS));
        i2c.done();
    }

    #[test]
    fn detect_moves_on_after_bus_error() {
        // Bus error on the first probe is "not present here", not fatal.
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write_read(PRIMARY_ADDRESS, vec![regs::ID], vec![0x00])
                .with_error(ErrorKind::Other),
            I2cTransaction::write_read(SECONDARY_ADDRESS, vec![regs::ID], vec![CHIP_ID]),
        ]);
        assert_eq!(detect(&mut i2c), Ok(SECONDARY_ADDRESS));
        i2c.done();
    }

    #[test]
    fn detect_rejects_wrong_chip_id() {
        // 0x58 is a BMP280 answering on the same bus.
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write_read(PRIMARY_ADDRESS, vec![regs::ID], vec![0x58]),
            I2cTransaction::write_read(SECONDARY_ADDRESS, vec![regs::ID], vec![0x00]),
        ]);
        assert_eq!(detect(&mut i2c), Err(error::Bme280Error::NotDetected));
        i2c.done();
    }

    #[test]
    fn init_loads_calibration() {
        let mut i2c = I2cMock::new(&init_transactions(PRIMARY_ADDRESS));
        let bme = Bme280::new(i2c.clone(), PRIMARY_ADDRESS)
            .init(&mut NoopDelay)
            .unwrap();
        assert_eq!(*bme.calibration(), golden_calib());
        i2c.done();
    }

    #[test]
    fn init_propagates_transport_error() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write(PRIMARY_ADDRESS, vec![regs::RESET, regs::RESET_CMD]),
            I2cTransaction::write_read(PRIMARY_ADDRESS, vec![regs::CALIB_TP], vec![0; 26])
                .with_error(ErrorKind::Other),
        ]);
        let result = Bme280::new(i2c.clone(), PRIMARY_ADDRESS).init(&mut NoopDelay);
        assert_eq!(result.unwrap_err(), error::Bme280Error::I2CError(ErrorKind::Other));
        i2c.done();
    }

    #[test]
    fn configure_writes_ctrl_hum_before_ctrl_meas() {
        // The mock enforces transaction order, so this sequence is the test:
        // humidity oversampling only latches if ctrl_meas is written after it.
        let mut transactions = init_transactions(PRIMARY_ADDRESS).to_vec();
        transactions.extend([
            I2cTransaction::write(PRIMARY_ADDRESS, vec![regs::CTRL_HUM, 0x01]),
            I2cTransaction::write(PRIMARY_ADDRESS, vec![regs::CTRL_MEAS, 0x27]),
            I2cTransaction::write(PRIMARY_ADDRESS, vec![regs::CONFIG, 0xA0]),
        ]);
        let mut i2c = I2cMock::new(&transactions);

        let mut bme = Bme280::new(i2c.clone(), PRIMARY_ADDRESS)
            .init(&mut NoopDelay)
            .unwrap();
        bme.configure(&Config::default(), &mut NoopDelay).unwrap();
        i2c.done();
    }

    #[test]
    fn read_raw_decodes_burst() {
        let mut transactions = init_transactions(PRIMARY_ADDRESS).to_vec();
        transactions.push(I2cTransaction::write_read(
            PRIMARY_ADDRESS,
            vec![regs::PRESS_MSB],
            vec![0x4E, 0x52, 0x8A, 0x7F, 0x01, 0xF0, 0x80, 0x00],
        ));
        let mut i2c = I2cMock::new(&transactions);

        let mut bme = Bme280::new(i2c.clone(), PRIMARY_ADDRESS)
            .init(&mut NoopDelay)
            .unwrap();
        let raw = bme.read_raw().unwrap();
        assert_eq!(
            raw,
            RawSample {
                adc_pressure: 320808,
                adc_temperature: 520223,
                adc_humidity: 32768,
            }
        );
        i2c.done();
    }

    #[test]
    fn read_measurement_end_to_end() {
        let mut transactions = init_transactions(SECONDARY_ADDRESS).to_vec();
        transactions.push(I2cTransaction::write_read(
            SECONDARY_ADDRESS,
            vec![regs::PRESS_MSB],
            vec![0x4E, 0x52, 0x8A, 0x7F, 0x01, 0xF0, 0x80, 0x00],
        ));
        let mut i2c = I2cMock::new(&transactions);

        let mut bme = Bme280::new(i2c.clone(), SECONDARY_ADDRESS)
            .init(&mut NoopDelay)
            .unwrap();
        let m = bme.read_measurement().unwrap();
        assert_eq!(m.temp, Temperature(2519));
        assert_eq!(m.pres, Pressure(29952604));
        assert_eq!(m.hum, Humidity(77537));
        assert_eq!(m.temp.split(), (25, 19));
        assert_eq!(m.pres.as_hpa(), (1170, 2));
        i2c.done();
    }

    #[test]
    fn chip_id_and_release() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write_read(
            PRIMARY_ADDRESS,
            vec![regs::ID],
            vec![CHIP_ID],
        )]);
        let mut bme = Bme280::new(i2c.clone(), PRIMARY_ADDRESS);
        assert_eq!(bme.chip_id(), Ok(CHIP_ID));
        let _bus = bme.release();
        i2c.done();
    }
}
