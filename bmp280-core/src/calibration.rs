//! Factory calibration coefficients.
//!
//! The coefficients live in registers 0x88–0xA1 as little-endian 16-bit words
//! (BST-BMP280-DS001 rev 1.26, section 3.11.2, Table 17). They are read once
//! after a verified reset and stay valid until the next reset or power loss.

use crate::registers::CALIBRATION_LEN;

/// Factory-trimmed compensation coefficients (dig_T* and dig_P*).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Temperature coefficient 1 (unsigned, typical ~27000–28000)
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    /// Pressure coefficient 1 (unsigned, typical ~30000–37000)
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
}

impl Calibration {
    /// Decodes the calibration block read from 0x88. Bytes 24 and 25 are
    /// reserved and ignored.
    pub fn from_bytes(buffer: &[u8; CALIBRATION_LEN]) -> Self {
        let unsigned = |i: usize| u16::from_le_bytes([buffer[i], buffer[i + 1]]);
        let signed = |i: usize| i16::from_le_bytes([buffer[i], buffer[i + 1]]);

        Self {
            dig_t1: unsigned(0),
            dig_t2: signed(2),
            dig_t3: signed(4),
            dig_p1: unsigned(6),
            dig_p2: signed(8),
            dig_p3: signed(10),
            dig_p4: signed(12),
            dig_p5: signed(14),
            dig_p6: signed(16),
            dig_p7: signed(18),
            dig_p8: signed(20),
            dig_p9: signed(22),
        }
    }
}
