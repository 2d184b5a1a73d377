use core::fmt;

/// Raw ADC output of a disabled (skipped) channel.
pub const SKIPPED: u32 = 0x80000;

/// Raw 20-bit ADC values of one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub temperature: u32,
    pub pressure: u32,
}

impl RawSample {
    /// Decodes the 6-byte burst read from 0xF7: pressure MSB/LSB/XLSB
    /// followed by temperature MSB/LSB/XLSB, 20 bits left-justified.
    pub fn from_bytes(raw: &[u8; 6]) -> Self {
        Self {
            pressure: decode_20bit(raw[0], raw[1], raw[2]),
            temperature: decode_20bit(raw[3], raw[4], raw[5]),
        }
    }
}

fn decode_20bit(msb: u8, lsb: u8, xlsb: u8) -> u32 {
    (msb as u32) << 12 | (lsb as u32) << 4 | (xlsb as u32) >> 4
}

/// One compensated channel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    Value(f32),
    /// Channel skipped by its oversampling setting, or not computable
    /// because the temperature channel is skipped.
    Disabled,
}

impl Reading {
    /// The reading, with disabled channels reported as `0.0`.
    pub fn value(self) -> f32 {
        match self {
            Reading::Value(v) => v,
            Reading::Disabled => 0.0,
        }
    }

    pub fn is_disabled(self) -> bool {
        matches!(self, Reading::Disabled)
    }
}

/// A compensated measurement: temperature in °C and pressure in Pa.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    pub temperature: Reading,
    pub pressure: Reading,
}

impl Measurement {
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature.value()
    }

    pub fn pressure_pa(&self) -> f32 {
        self.pressure.value()
    }

    pub fn pressure_hpa(&self) -> f32 {
        self.pressure.value() / 100.0
    }
}

/// The console report: pressure line then temperature line.
impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} hPa\r\n{:.2} deg C",
            self.pressure_hpa(),
            self.temperature_celsius()
        )
    }
}
