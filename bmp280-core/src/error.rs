use core::fmt;

use crate::registers::Register;

/// Errors raised by the BMP280 driver. `E` is the bus error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The bus transaction failed (NACK, arbitration loss, ...).
    Bus(E),
    /// The ID register did not read 0x58; wrong or absent device.
    IdentityMismatch { found: u8 },
    /// A configuration register read back a different value than written.
    ConfigurationMismatch {
        register: Register,
        written: u8,
        read: u8,
    },
    /// The measuring flag did not clear within the poll budget.
    Timeout,
    /// The operation needs a session established by `init`.
    NotInitialized,
    /// The transfer violates the register's access class or block length.
    InvalidAccess { register: Register },
}

impl<E> Error<E> {
    /// `true` when the device can no longer be trusted to hold the state
    /// written by `init`.
    pub fn is_link_loss(&self) -> bool {
        matches!(self, Error::Bus(_) | Error::Timeout)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "bus error: {e:?}"),
            Error::IdentityMismatch { found } => {
                write!(f, "chip id mismatch: expected 0x58, found {found:#04x}")
            }
            Error::ConfigurationMismatch {
                register,
                written,
                read,
            } => write!(
                f,
                "register {:#04x} read back {read:#04x} after writing {written:#04x}",
                register.addr()
            ),
            Error::Timeout => write!(f, "measuring flag never cleared"),
            Error::NotInitialized => write!(f, "sensor not initialized"),
            Error::InvalidAccess { register } => write!(
                f,
                "access to register {:#04x} not permitted",
                register.addr()
            ),
        }
    }
}
