//! Measurement configuration and its packing into the CTRL_MEAS (0xF4) and
//! CONFIG (0xF5) registers.

/// Oversampling setting, shared by `osrs_t` (CTRL_MEAS bits 7:5) and
/// `osrs_p` (CTRL_MEAS bits 4:2).
///
/// | Variant | Bits | Pressure          | Temperature        | Pressure RMS noise |
/// |---------|------|-------------------|--------------------|--------------------|
/// | Skipped | 000  | -                 | -                  | -                  |
/// | X1      | 001  | 16 bit / 2.62 Pa  | 16 bit / 0.0050 °C | ~3.3 Pa            |
/// | X2      | 010  | 17 bit / 1.31 Pa  | 17 bit / 0.0025 °C | ~2.6 Pa            |
/// | X4      | 011  | 18 bit / 0.66 Pa  | 18 bit / 0.0012 °C | ~2.1 Pa            |
/// | X8      | 100  | 19 bit / 0.33 Pa  | 19 bit / 0.0006 °C | ~1.6 Pa            |
/// | X16     | 101  | 20 bit / 0.16 Pa  | 20 bit / 0.0003 °C | ~1.3 Pa            |
///
/// A skipped channel reads back as `0x80000`. Codes 110 and 111 behave like ×16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Oversampling {
    Skipped = 0b000,
    X1 = 0b001,
    X2 = 0b010,
    X4 = 0b011,
    X8 = 0b100,
    X16 = 0b101,
}

impl Oversampling {
    pub const ALL: [Oversampling; 6] = [
        Oversampling::Skipped,
        Oversampling::X1,
        Oversampling::X2,
        Oversampling::X4,
        Oversampling::X8,
        Oversampling::X16,
    ];

    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Oversampling::Skipped,
            0b001 => Oversampling::X1,
            0b010 => Oversampling::X2,
            0b011 => Oversampling::X4,
            0b100 => Oversampling::X8,
            _ => Oversampling::X16,
        }
    }
}

/// Power mode (mode[1:0] in CTRL_MEAS, bits 1:0).
///
/// | Variant | Bits   | Behavior                                                  |
/// |---------|--------|-----------------------------------------------------------|
/// | Sleep   | 00     | No measurements; registers readable                       |
/// | Forced  | 01, 10 | One measurement cycle, then sleep; host must re-trigger   |
/// | Normal  | 11     | Continuous: measure, standby for t_sb, measure again      |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    Sleep = 0b00,
    Forced = 0b01,
    Normal = 0b11,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Sleep, Mode::Forced, Mode::Normal];

    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Mode::Sleep,
            0b11 => Mode::Normal,
            _ => Mode::Forced,
        }
    }
}

/// IIR filter coefficient (filter[2:0] in CONFIG, bits 4:2).
///
/// Higher coefficient means stronger smoothing of short-term pressure
/// fluctuations and a slower response to real changes. Filter state survives
/// sleep and forced cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Filter {
    Off = 0b000,
    X2 = 0b001,
    X4 = 0b010,
    X8 = 0b011,
    X16 = 0b100,
}

impl Filter {
    pub const ALL: [Filter; 5] = [
        Filter::Off,
        Filter::X2,
        Filter::X4,
        Filter::X8,
        Filter::X16,
    ];

    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Filter::Off,
            0b001 => Filter::X2,
            0b010 => Filter::X4,
            0b011 => Filter::X8,
            _ => Filter::X16,
        }
    }
}

/// Standby duration between conversions in normal mode (t_sb[2:0] in
/// CONFIG, bits 7:5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Standby {
    Ms0_5 = 0b000,
    Ms62_5 = 0b001,
    Ms125 = 0b010,
    Ms250 = 0b011,
    Ms500 = 0b100,
    Ms1000 = 0b101,
    Ms2000 = 0b110,
    Ms4000 = 0b111,
}

impl Standby {
    pub const ALL: [Standby; 8] = [
        Standby::Ms0_5,
        Standby::Ms62_5,
        Standby::Ms125,
        Standby::Ms250,
        Standby::Ms500,
        Standby::Ms1000,
        Standby::Ms2000,
        Standby::Ms4000,
    ];

    pub const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0b111) as usize]
    }
}

/// Fixed-point width used for pressure compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Arithmetic {
    /// 64-bit intermediates, Q24.8 Pa output.
    #[default]
    Wide64,
    /// 32-bit intermediates, whole Pa output.
    Narrow32,
}

/// Content of the CTRL_MEAS register (0xF4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CtrlMeas {
    pub temperature: Oversampling,
    pub pressure: Oversampling,
    pub mode: Mode,
}

impl CtrlMeas {
    pub const fn pack(self) -> u8 {
        (self.temperature as u8) << 5 | (self.pressure as u8) << 2 | self.mode as u8
    }

    pub const fn unpack(value: u8) -> Self {
        Self {
            temperature: Oversampling::from_bits(value >> 5),
            pressure: Oversampling::from_bits(value >> 2),
            mode: Mode::from_bits(value),
        }
    }
}

/// Content of the CONFIG register (0xF5). `spi3w_en` (bit 0) is always
/// written as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigByte {
    pub standby: Standby,
    pub filter: Filter,
}

impl ConfigByte {
    pub const fn pack(self) -> u8 {
        (self.standby as u8) << 5 | (self.filter as u8) << 2
    }

    pub const fn unpack(value: u8) -> Self {
        Self {
            standby: Standby::from_bits(value >> 5),
            filter: Filter::from_bits(value >> 2),
        }
    }
}

/// Recommended settings from the datasheet (section 3.5, Table 7).
///
/// | Preset           | Use case                     | Osrs T/P | Mode   | Filter |
/// |------------------|------------------------------|----------|--------|--------|
/// | HandheldLowPower | Handheld device, low power   | ×2 / ×16 | Normal | ×4     |
/// | HandheldDynamic  | Handheld device, dynamic     | ×1 / ×4  | Normal | ×16    |
/// | Weather          | Weather monitoring           | ×1 / ×1  | Forced | Off    |
/// | Elevator         | Elevator / floor change      | ×1 / ×4  | Normal | ×4     |
/// | Drop             | Drop detection               | ×1 / ×2  | Normal | Off    |
/// | Indoor           | Indoor navigation            | ×2 / ×16 | Normal | ×16    |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Preset {
    HandheldLowPower,
    HandheldDynamic,
    Weather,
    Elevator,
    Drop,
    Indoor,
}

/// Everything the initialization sequence writes to the device, plus the
/// compensation arithmetic used for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub temperature: Oversampling,
    pub pressure: Oversampling,
    pub mode: Mode,
    pub filter: Filter,
    pub standby: Standby,
    pub arithmetic: Arithmetic,
}

impl Default for Config {
    /// Forced mode, ×1 temperature and ×4 pressure oversampling, no filter.
    fn default() -> Self {
        Self {
            temperature: Oversampling::X1,
            pressure: Oversampling::X4,
            mode: Mode::Forced,
            filter: Filter::Off,
            standby: Standby::Ms0_5,
            arithmetic: Arithmetic::Wide64,
        }
    }
}

impl Config {
    pub fn new(
        temperature: Oversampling,
        pressure: Oversampling,
        mode: Mode,
        filter: Filter,
        standby: Standby,
    ) -> Self {
        Self {
            temperature,
            pressure,
            mode,
            filter,
            standby,
            arithmetic: Arithmetic::default(),
        }
    }

    /// Builds one of the datasheet presets. `standby` only matters in normal
    /// mode.
    pub fn preset(preset: Preset, standby: Standby) -> Self {
        let (temperature, pressure) = match preset {
            Preset::HandheldLowPower | Preset::Indoor => (Oversampling::X2, Oversampling::X16),
            Preset::HandheldDynamic | Preset::Elevator => (Oversampling::X1, Oversampling::X4),
            Preset::Weather => (Oversampling::X1, Oversampling::X1),
            Preset::Drop => (Oversampling::X1, Oversampling::X2),
        };
        let mode = match preset {
            Preset::Weather => Mode::Forced,
            _ => Mode::Normal,
        };
        let filter = match preset {
            Preset::Weather | Preset::Drop => Filter::Off,
            Preset::HandheldLowPower | Preset::Elevator => Filter::X4,
            Preset::HandheldDynamic | Preset::Indoor => Filter::X16,
        };
        Self::new(temperature, pressure, mode, filter, standby)
    }

    pub fn with_temperature(mut self, temperature: Oversampling) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_pressure(mut self, pressure: Oversampling) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_standby(mut self, standby: Standby) -> Self {
        self.standby = standby;
        self
    }

    pub fn with_arithmetic(mut self, arithmetic: Arithmetic) -> Self {
        self.arithmetic = arithmetic;
        self
    }

    pub const fn ctrl_meas(&self) -> CtrlMeas {
        CtrlMeas {
            temperature: self.temperature,
            pressure: self.pressure,
            mode: self.mode,
        }
    }

    pub const fn config_byte(&self) -> ConfigByte {
        ConfigByte {
            standby: self.standby,
            filter: self.filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_meas_round_trip() {
        for temperature in Oversampling::ALL {
            for pressure in Oversampling::ALL {
                for mode in Mode::ALL {
                    let fields = CtrlMeas {
                        temperature,
                        pressure,
                        mode,
                    };
                    assert_eq!(CtrlMeas::unpack(fields.pack()), fields);
                }
            }
        }
    }

    #[test]
    fn config_round_trip() {
        for standby in Standby::ALL {
            for filter in Filter::ALL {
                let fields = ConfigByte { standby, filter };
                let packed = fields.pack();
                assert_eq!(packed & 0b11, 0);
                assert_eq!(ConfigByte::unpack(packed), fields);
            }
        }
    }

    #[test]
    #[allow(clippy::unusual_byte_groupings)]
    fn bit_positions() {
        let ctrl = CtrlMeas {
            temperature: Oversampling::X2,
            pressure: Oversampling::X16,
            mode: Mode::Normal,
        };
        assert_eq!(ctrl.pack(), 0b010_101_11);

        let config = ConfigByte {
            standby: Standby::Ms1000,
            filter: Filter::X16,
        };
        assert_eq!(config.pack(), 0b101_100_00);
    }

    #[test]
    fn reserved_codes_decode_as_strongest_setting() {
        assert_eq!(Oversampling::from_bits(0b110), Oversampling::X16);
        assert_eq!(Oversampling::from_bits(0b111), Oversampling::X16);
        assert_eq!(Filter::from_bits(0b111), Filter::X16);
        assert_eq!(Mode::from_bits(0b10), Mode::Forced);
    }

    #[test]
    #[allow(clippy::unusual_byte_groupings)]
    fn weather_preset_uses_forced_mode() {
        let config = Config::preset(Preset::Weather, Standby::Ms1000);
        assert_eq!(config.mode, Mode::Forced);
        assert_eq!(config.ctrl_meas().pack(), 0b001_001_01);
        assert_eq!(config.arithmetic, Arithmetic::Wide64);
    }

    #[test]
    fn normal_mode_presets() {
        let indoor = Config::preset(Preset::Indoor, Standby::Ms125);
        assert_eq!(indoor.temperature, Oversampling::X2);
        assert_eq!(indoor.pressure, Oversampling::X16);
        assert_eq!(indoor.mode, Mode::Normal);
        assert_eq!(indoor.filter, Filter::X16);
        assert_eq!(indoor.standby, Standby::Ms125);

        let drop = Config::preset(Preset::Drop, Standby::Ms0_5);
        assert_eq!(drop.pressure, Oversampling::X2);
        assert_eq!(drop.mode, Mode::Normal);
        assert_eq!(drop.filter, Filter::Off);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = Config::default()
            .with_mode(Mode::Normal)
            .with_standby(Standby::Ms62_5)
            .with_arithmetic(Arithmetic::Narrow32);
        assert_eq!(config.mode, Mode::Normal);
        assert_eq!(config.standby, Standby::Ms62_5);
        assert_eq!(config.arithmetic, Arithmetic::Narrow32);
    }
}
