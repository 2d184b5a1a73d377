/// BMP280 register map (Bosch Sensortec BMP280 datasheet, revision 1.26, section 4.2).
///
/// Key groups:
/// - **Measurement results** - 0xF7–0xFC (6 bytes): pressure (20-bit) + temperature (20-bit)
/// - **Control registers** - 0xF4 (measurement control), 0xF5 (standby + IIR filter)
/// - **Status** - 0xF3 (measuring / NVM copy bits)
/// - **Reset & ID** - 0xE0 (soft reset), 0xD0 (chip ID)
/// - **Calibration** - 0x88–0xA1 (26 bytes, read-only, factory trimmed)
///
/// Every register carries an [`Access`] class; the register layer refuses
/// transfers that violate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    TempXlsb = 0xFC,
    TempLsb = 0xFB,
    TempMsb = 0xFA,
    PressXlsb = 0xF9,
    PressLsb = 0xF8,
    PressMsb = 0xF7,
    Config = 0xF5,
    CtrlMeas = 0xF4,
    // bit 3 - conversion running, bit 0 - NVM data being copied
    Status = 0xF3,
    // Writing 0xB6 runs the complete power-on-reset procedure
    Reset = 0xE0,
    // Must read 0x58 after start up
    Id = 0xD0,
    CalibStart = 0x88,
}

/// Access class of a register, as documented in the datasheet memory map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }

    pub const fn access(self) -> Access {
        match self {
            Register::Reset => Access::WriteOnly,
            Register::Config | Register::CtrlMeas => Access::ReadWrite,
            _ => Access::ReadOnly,
        }
    }

    pub const fn is_readable(self) -> bool {
        !matches!(self.access(), Access::WriteOnly)
    }

    pub const fn is_writable(self) -> bool {
        !matches!(self.access(), Access::ReadOnly)
    }

    /// Number of bytes a burst read may cover starting at this register
    /// without leaving its register block.
    pub const fn burst_limit(self) -> usize {
        match self {
            Register::CalibStart => CALIBRATION_LEN,
            Register::PressMsb => 6,
            Register::PressLsb => 5,
            Register::PressXlsb => 4,
            Register::TempMsb => 3,
            Register::TempLsb => 2,
            Register::Status => 3,
            Register::CtrlMeas => 2,
            _ => 1,
        }
    }
}

/// 7-bit bus address, selected by strapping the SDO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Address {
    /// SDO connected to GND
    #[default]
    SdoGnd = ADDRESS_SDO_GND,
    /// SDO connected to VDDIO
    SdoVddio = ADDRESS_SDO_VDDIO,
}

impl Address {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

pub const ADDRESS_SDO_GND: u8 = 0x76;
pub const ADDRESS_SDO_VDDIO: u8 = 0x77;

pub const BMP280_RESET_REG_VALUE: u8 = 0xB6;
pub const BMP280_CHIP_ID: u8 = 0x58;

/// Length of the calibration block 0x88–0xA1; the last two bytes are reserved.
pub const CALIBRATION_LEN: usize = 26;

pub const STATUS_MEASURING: u8 = 1 << 3;
