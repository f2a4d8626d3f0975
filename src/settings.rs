use crate::regs;

/// Oversampling settings for Temperature, Pressure, and Humidity.
///
/// Higher oversampling rates increase accuracy (reduce noise) but lead to
/// longer measurement times and higher power consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Oversampling {
    /// No measurement performed. The ADC output is held at its reset value.
    Skipped = 0,
    /// 1x Oversampling (default).
    #[default]
    X1 = 1,
    /// 2x Oversampling.
    X2 = 2,
    /// 4x Oversampling.
    X4 = 3,
    /// 8x Oversampling.
    X8 = 4,
    /// 16x Oversampling. Maximum precision, longest conversion time.
    X16 = 5,
}

impl Oversampling {
    /// Creates an instance from a raw register field value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Oversampling::X1,
            2 => Oversampling::X2,
            3 => Oversampling::X4,
            4 => Oversampling::X8,
            5 => Oversampling::X16,
            _ => Oversampling::Skipped,
        }
    }
}

/// Grouped oversampling settings for all three environmental channels.
///
/// Use `Oversampling::Skipped` to disable channels that are not relevant
/// for your application (saves time and energy).
#[derive(Default, Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OversamplingConfig {
    /// Oversampling for the temperature channel.
    pub temp_osrs: Oversampling,
    /// Oversampling for the humidity channel.
    pub hum_osrs: Oversampling,
    /// Oversampling for the pressure channel.
    pub pres_osrs: Oversampling,
}

/// Coefficient for the IIR (Infinite Impulse Response) filter.
///
/// The filter smooths short-term disturbances in the pressure and temperature
/// readings (e.g. slamming doors or gusts of wind). It has no effect on
/// humidity.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IIRFilter {
    /// Filter disabled.
    #[default]
    Off = 0,
    /// Filter coefficient 2.
    X2 = 1,
    /// Filter coefficient 4.
    X4 = 2,
    /// Filter coefficient 8.
    X8 = 3,
    /// Filter coefficient 16.
    X16 = 4,
}

/// Inactive duration between measurement cycles in normal mode.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Standby {
    /// 0.5 ms
    Micros500 = 0,
    /// 62.5 ms
    Micros62500 = 1,
    /// 125 ms
    Millis125 = 2,
    /// 250 ms
    Millis250 = 3,
    /// 500 ms
    Millis500 = 4,
    /// 1000 ms (default).
    #[default]
    Millis1000 = 5,
    /// 10 ms
    Millis10 = 6,
    /// 20 ms
    Millis20 = 7,
}

/// Sensor power mode.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    /// No measurements, lowest power consumption.
    Sleep = 0b00,
    /// Perform one measurement cycle, then return to sleep.
    Forced = 0b01,
    /// Cycle continuously, pausing for the standby duration between
    /// measurements (default).
    #[default]
    Normal = 0b11,
}

/// Complete sensor configuration applied by [`configure`](crate::Bme280::configure).
///
/// The default configuration is 1x oversampling on all channels, filter off,
/// 1000 ms standby, normal mode.
#[derive(Default, Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Oversampling settings for T, P and H.
    pub osrs_config: OversamplingConfig,
    /// IIR filter setting for noise suppression.
    pub iir_filter: IIRFilter,
    /// Standby duration between measurement cycles in normal mode.
    pub standby: Standby,
    /// Power mode.
    pub mode: Mode,
}

impl Config {
    /// Value of the `ctrl_hum` register (0xF2).
    pub(crate) fn ctrl_hum_bits(&self) -> u8 {
        self.osrs_config.hum_osrs as u8
    }

    /// Value of the `ctrl_meas` register (0xF4).
    ///
    /// Writing this register is what latches a previously written `ctrl_hum`
    /// value into the measurement logic.
    pub(crate) fn ctrl_meas_bits(&self) -> u8 {
        ((self.osrs_config.temp_osrs as u8) << 5)
            | ((self.osrs_config.pres_osrs as u8) << 2)
            | self.mode as u8
    }

    /// Value of the `config` register (0xF5).
    pub(crate) fn config_bits(&self) -> u8 {
        ((self.standby as u8) << 5) | ((self.iir_filter as u8) << 2)
    }

    /// The three register writes performed by `configure`, in the order the
    /// sensor requires them.
    pub(crate) fn register_writes(&self) -> [[u8; 2]; 3] {
        [
            [regs::CTRL_HUM, self.ctrl_hum_bits()],
            [regs::CTRL_MEAS, self.ctrl_meas_bits()],
            [regs::CONFIG, self.config_bits()],
        ]
    }
}

/// Convenience builder for creating a [`Config`].
#[derive(Default)]
pub struct Bme280Builder {
    config: Config,
}

impl Bme280Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the oversampling for the temperature channel.
    pub fn temp_oversampling(mut self, os: Oversampling) -> Self {
        self.config.osrs_config.temp_osrs = os;
        self
    }

    /// Sets the oversampling for the humidity channel.
    pub fn hum_oversampling(mut self, os: Oversampling) -> Self {
        self.config.osrs_config.hum_osrs = os;
        self
    }

    /// Sets the oversampling for the pressure channel.
    pub fn pres_oversampling(mut self, os: Oversampling) -> Self {
        self.config.osrs_config.pres_osrs = os;
        self
    }

    /// Sets the IIR filter coefficient.
    pub fn iir_filter(mut self, filter: IIRFilter) -> Self {
        self.config.iir_filter = filter;
        self
    }

    /// Sets the standby duration for normal mode.
    pub fn standby(mut self, standby: Standby) -> Self {
        self.config.standby = standby;
        self
    }

    /// Sets the power mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Finalizes the builder and returns the `Config` object.
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_register_bytes() {
        // 1x oversampling everywhere, filter off, 1000ms standby, normal mode.
        let config = Config::default();
        assert_eq!(config.ctrl_hum_bits(), 0x01);
        assert_eq!(config.ctrl_meas_bits(), 0x27);
        assert_eq!(config.config_bits(), 0xA0);
    }

    #[test]
    fn builder_encodes_fields() {
        let config = Bme280Builder::new()
            .temp_oversampling(Oversampling::X2)
            .pres_oversampling(Oversampling::X16)
            .hum_oversampling(Oversampling::Skipped)
            .iir_filter(IIRFilter::X4)
            .standby(Standby::Millis125)
            .mode(Mode::Forced)
            .build();
        assert_eq!(config.ctrl_hum_bits(), 0x00);
        assert_eq!(config.ctrl_meas_bits(), (2 << 5) | (5 << 2) | 0b01);
        assert_eq!(config.config_bits(), (2 << 5) | (2 << 2));
    }

    #[test]
    fn oversampling_from_u8_round_trips() {
        for os in [
            Oversampling::Skipped,
            Oversampling::X1,
            Oversampling::X2,
            Oversampling::X4,
            Oversampling::X8,
            Oversampling::X16,
        ] {
            assert_eq!(Oversampling::from_u8(os as u8), os);
        }
        assert_eq!(Oversampling::from_u8(0xFF), Oversampling::Skipped);
    }
}
