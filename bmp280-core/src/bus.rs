//! Register-level access to the device.

use embedded_hal::i2c::I2c;

use crate::error::Error;
use crate::registers::Register;

/// Blocking register reads and writes against one device address.
///
/// Every transfer is checked against the register's access class before it
/// reaches the bus.
pub struct RegisterBus<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C, E> RegisterBus<I2C>
where
    I2C: I2c<Error = E>,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Burst read starting at `register`.
    pub fn read(&mut self, register: Register, buf: &mut [u8]) -> Result<(), Error<E>> {
        if !register.is_readable() || buf.len() > register.burst_limit() {
            return Err(Error::InvalidAccess { register });
        }
        self.i2c
            .write_read(self.address, &[register.addr()], buf)
            .map_err(Error::Bus)
    }

    pub fn read_u8(&mut self, register: Register) -> Result<u8, Error<E>> {
        let mut value = [0u8];
        self.read(register, &mut value)?;
        Ok(value[0])
    }

    pub fn write(&mut self, register: Register, value: u8) -> Result<(), Error<E>> {
        if !register.is_writable() {
            return Err(Error::InvalidAccess { register });
        }
        self.i2c
            .write(self.address, &[register.addr(), value])
            .map_err(Error::Bus)
    }

    /// Reads `register` back and compares the bits selected by `mask` with
    /// `written`. A disagreement is a [`Error::ConfigurationMismatch`], never a
    /// bus error.
    pub fn verify(&mut self, register: Register, written: u8, mask: u8) -> Result<(), Error<E>> {
        let read = self.read_u8(register)?;
        if read & mask != written & mask {
            return Err(Error::ConfigurationMismatch {
                register,
                written,
                read,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec;

    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    use super::*;

    const ADDR: u8 = 0x76;

    #[test]
    fn reads_and_writes_go_to_the_device_address() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x58]),
            I2cTransaction::write(ADDR, vec![0xF4, 0x27]),
        ]);
        let mut bus = RegisterBus::new(i2c, ADDR);
        assert_eq!(bus.read_u8(Register::Id), Ok(0x58));
        assert_eq!(bus.write(Register::CtrlMeas, 0x27), Ok(()));
        bus.release().done();
    }

    #[test]
    fn access_class_is_enforced_without_bus_traffic() {
        let i2c = I2cMock::new(&[]);
        let mut bus = RegisterBus::new(i2c, ADDR);

        assert_eq!(
            bus.write(Register::Id, 0x00),
            Err(Error::InvalidAccess {
                register: Register::Id,
            })
        );
        assert_eq!(
            bus.write(Register::Status, 0x00),
            Err(Error::InvalidAccess {
                register: Register::Status,
            })
        );
        assert_eq!(
            bus.read_u8(Register::Reset),
            Err(Error::InvalidAccess {
                register: Register::Reset,
            })
        );
        let mut too_long = [0u8; 7];
        assert_eq!(
            bus.read(Register::PressMsb, &mut too_long),
            Err(Error::InvalidAccess {
                register: Register::PressMsb,
            })
        );
        bus.release().done();
    }

    #[test]
    fn bus_failure_is_reported_as_bus_error() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write_read(ADDR, vec![0xD0], vec![0x00]).with_error(ErrorKind::Other),
        ]);
        let mut bus = RegisterBus::new(i2c, ADDR);
        assert_eq!(bus.read_u8(Register::Id), Err(Error::Bus(ErrorKind::Other)));
        bus.release().done();
    }

    #[test]
    fn verify_distinguishes_mismatch_from_bus_fault() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write_read(ADDR, vec![0xF5], vec![0xA0]),
            I2cTransaction::write_read(ADDR, vec![0xF5], vec![0x80]),
            I2cTransaction::write_read(ADDR, vec![0xF4], vec![0x24]),
        ]);
        let mut bus = RegisterBus::new(i2c, ADDR);
        assert_eq!(bus.verify(Register::Config, 0xA0, 0xFF), Ok(()));
        assert_eq!(
            bus.verify(Register::Config, 0xA0, 0xFF),
            Err(Error::ConfigurationMismatch {
                register: Register::Config,
                written: 0xA0,
                read: 0x80,
            })
        );
        // mode bits masked out
        assert_eq!(bus.verify(Register::CtrlMeas, 0x25, 0xFC), Ok(()));
        bus.release().done();
    }
}
