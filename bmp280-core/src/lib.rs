//! Blocking driver for the Bosch BMP280 pressure and temperature sensor.
//!
//! The driver talks to the sensor through any [`embedded_hal::i2c::I2c`]
//! bus and waits through any [`embedded_hal::delay::DelayNs`] provider, so
//! the same code runs on the target and against a mocked bus in tests.
//!
//! A [`Bmp280`] becomes usable for measurements once [`Bmp280::init`] has
//! reset the device, checked its identity, read the factory calibration and
//! written (and read back) the requested [`Config`]. The calibration and the
//! applied configuration form a [`Session`]; a failed re-initialization or a
//! lost bus link drops it.

#![no_std]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod bus;
pub mod calibration;
pub mod compensation;
pub mod config;
pub mod error;
pub mod measurement;
pub mod registers;
pub mod shared;

use embedded_hal::{delay::DelayNs, i2c::I2c};

pub use crate::{
    bus::RegisterBus,
    calibration::Calibration,
    compensation::FineTemperature,
    config::{Arithmetic, Config, Filter, Mode, Oversampling, Preset, Standby},
    error::Error,
    measurement::{Measurement, RawSample, Reading},
    registers::{Address, Register, ADDRESS_SDO_GND, ADDRESS_SDO_VDDIO},
    shared::SharedBus,
};
use crate::{
    config::CtrlMeas,
    registers::{BMP280_CHIP_ID, BMP280_RESET_REG_VALUE, CALIBRATION_LEN, STATUS_MEASURING},
};

/// Settling time after a soft reset.
pub const RESET_DELAY_MS: u32 = 10;
/// Time allowed for a configuration write to land before it is read back.
pub const CONFIG_DELAY_MS: u32 = 1;

/// CONFIG bit 1 is reserved.
const CONFIG_MASK: u8 = 0b1111_1101;
/// osrs_t and osrs_p fields of CTRL_MEAS.
const OVERSAMPLING_MASK: u8 = 0b1111_1100;

/// Bounds the wait for the measuring flag to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollPolicy {
    /// Status reads before giving up with [`Error::Timeout`].
    pub attempts: u32,
    /// Delay between two status reads, in microseconds.
    pub interval_us: u32,
}

impl Default for PollPolicy {
    /// 100 polls, 1 ms apart; twice the longest conversion at ×16/×16.
    fn default() -> Self {
        Self {
            attempts: 100,
            interval_us: 1_000,
        }
    }
}

/// State established by a successful initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Session {
    calibration: Calibration,
    config: Config,
}

impl Session {
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// BMP280 driver instance (blocking I²C).
///
/// Owns the bus, the device address, the delay provider and, once
/// initialized, the [`Session`].
pub struct Bmp280<I2C, D> {
    bus: RegisterBus<I2C>,
    delay: D,
    poll: PollPolicy,
    session: Option<Session>,
}

impl<I2C, D, E> Bmp280<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
{
    /// Creates an uninitialized driver for the sensor at `address`.
    pub fn new(i2c: I2C, delay: D, address: Address) -> Self {
        Self {
            bus: RegisterBus::new(i2c, address.addr()),
            delay,
            poll: PollPolicy::default(),
            session: None,
        }
    }

    /// Re-attaches a driver to a device initialized earlier, typically with
    /// a bus borrowed from [`SharedBus::lock`].
    pub fn resume(i2c: I2C, delay: D, address: Address, session: Session) -> Self {
        Self {
            session: Some(session),
            ..Self::new(i2c, delay, address)
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Gives back the bus and the delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.bus.release(), self.delay)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.session.is_some()
    }

    /// Initializes the sensor.
    ///
    /// Sequence:
    /// 1. Soft reset (0xE0 ← 0xB6), then wait [`RESET_DELAY_MS`]
    /// 2. Verify chip ID (0xD0 == 0x58)
    /// 3. Read calibration coefficients (0x88–0xA1)
    /// 4. Write standby time and filter to CONFIG (0xF5), read it back
    /// 5. Write oversampling and mode to CTRL_MEAS (0xF4), read it back
    ///
    /// The session is dropped first and only re-established when every step
    /// succeeds.
    ///
    /// # Errors
    /// - [`Error::Bus`] if any transfer fails
    /// - [`Error::IdentityMismatch`] if the chip ID is not 0x58
    /// - [`Error::ConfigurationMismatch`] if a register reads back differently
    pub fn init(&mut self, config: Config) -> Result<(), Error<E>> {
        self.session = None;
        let session = self.establish(config)?;
        info!(
            "BMP280 at {:#x} ready, ctrl_meas {:#x}, config {:#x}",
            self.bus.address(),
            config.ctrl_meas().pack(),
            config.config_byte().pack()
        );
        self.session = Some(session);
        Ok(())
    }

    fn establish(&mut self, config: Config) -> Result<Session, Error<E>> {
        if let Err(e) = self.soft_reset() {
            error!("Failed to perform soft reset");
            return Err(e);
        }

        let id = self.chip_id().inspect_err(|_| error!("Failed to read chip ID"))?;
        if id != BMP280_CHIP_ID {
            error!("Chip ID mismatch: {:#x}", id);
            return Err(Error::IdentityMismatch { found: id });
        }

        let calibration = self
            .read_calibration()
            .inspect_err(|_| error!("Failed to read calibration data"))?;
        debug!("Calibration coefficients read");

        let config_byte = config.config_byte().pack();
        self.bus.write(Register::Config, config_byte)?;
        self.delay.delay_ms(CONFIG_DELAY_MS);
        self.bus
            .verify(Register::Config, config_byte, CONFIG_MASK)
            .inspect_err(|_| error!("Failed to set configuration setting"))?;

        let ctrl_meas = config.ctrl_meas();
        self.bus.write(Register::CtrlMeas, ctrl_meas.pack())?;
        self.delay.delay_ms(CONFIG_DELAY_MS);
        self.verify_ctrl_meas(ctrl_meas)
            .inspect_err(|_| error!("Failed to set measurement setting"))?;

        Ok(Session {
            calibration,
            config,
        })
    }

    /// In forced mode the device may finish its conversion and drop back to
    /// sleep before the read-back, so sleep is accepted there.
    fn verify_ctrl_meas(&mut self, written: CtrlMeas) -> Result<(), Error<E>> {
        let packed = written.pack();
        let read = self.bus.read_u8(Register::CtrlMeas)?;
        let mode = CtrlMeas::unpack(read).mode;
        let mode_matches =
            mode == written.mode || (written.mode == Mode::Forced && mode == Mode::Sleep);

        if read & OVERSAMPLING_MASK != packed & OVERSAMPLING_MASK || !mode_matches {
            return Err(Error::ConfigurationMismatch {
                register: Register::CtrlMeas,
                written: packed,
                read,
            });
        }
        Ok(())
    }

    /// Runs the power-on-reset procedure and waits for the device to settle.
    /// Any session is dropped.
    pub fn soft_reset(&mut self) -> Result<(), Error<E>> {
        self.session = None;
        self.bus.write(Register::Reset, BMP280_RESET_REG_VALUE)?;
        self.delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    pub fn chip_id(&mut self) -> Result<u8, Error<E>> {
        self.bus.read_u8(Register::Id)
    }

    /// Reads and decodes the 26-byte calibration block.
    pub fn read_calibration(&mut self) -> Result<Calibration, Error<E>> {
        let mut buffer = [0u8; CALIBRATION_LEN];
        self.bus.read(Register::CalibStart, &mut buffer)?;
        Ok(Calibration::from_bytes(&buffer))
    }

    /// Triggers one conversion by setting forced mode in CTRL_MEAS while
    /// keeping the oversampling fields. Does nothing in normal mode, where
    /// the device converts on its own.
    ///
    /// # Errors
    /// [`Error::NotInitialized`] without a session, [`Error::Bus`] on a
    /// failed transfer (which also drops the session).
    pub fn wake(&mut self) -> Result<(), Error<E>> {
        let session = self.session.ok_or(Error::NotInitialized)?;
        if session.config.mode == Mode::Normal {
            return Ok(());
        }

        let result = self.trigger_forced();
        self.track_link(result)
    }

    fn trigger_forced(&mut self) -> Result<(), Error<E>> {
        let ctrl_meas = self.bus.read_u8(Register::CtrlMeas)?;
        self.bus
            .write(Register::CtrlMeas, ctrl_meas | Mode::Forced as u8)
    }

    /// Waits for the running conversion and reads both raw channels.
    ///
    /// Needs no session; [`Bmp280::measure`] is the compensated variant.
    pub fn read_raw(&mut self) -> Result<RawSample, Error<E>> {
        self.wait_until_idle()?;

        let mut raw = [0u8; 6];
        self.bus
            .read(Register::PressMsb, &mut raw)
            .inspect_err(|_| warn!("Burst read from 0xF7 failed"))?;
        Ok(RawSample::from_bytes(&raw))
    }

    fn wait_until_idle(&mut self) -> Result<(), Error<E>> {
        for _ in 0..self.poll.attempts {
            let status = self.bus.read_u8(Register::Status)?;
            if status & STATUS_MEASURING == 0 {
                return Ok(());
            }
            self.delay.delay_us(self.poll.interval_us);
        }
        warn!("Measuring flag still set after {} polls", self.poll.attempts);
        Err(Error::Timeout)
    }

    /// Reads one measurement and compensates it with the session's
    /// calibration and arithmetic.
    ///
    /// Skipped channels come back as [`Reading::Disabled`].
    ///
    /// # Errors
    /// - [`Error::NotInitialized`] without a session
    /// - [`Error::Bus`] or [`Error::Timeout`]; both drop the session
    pub fn measure(&mut self) -> Result<Measurement, Error<E>> {
        let session = self.session.ok_or(Error::NotInitialized)?;
        let result = self.read_raw();
        let sample = self.track_link(result)?;
        trace!(
            "raw temperature {}, raw pressure {}",
            sample.temperature,
            sample.pressure
        );

        let measurement =
            compensation::compensate(sample, &session.calibration, session.config.arithmetic);
        if measurement.pressure == Reading::Value(0.0) {
            warn!("Pressure compensation divisor is zero, reading is not trustworthy");
        }
        Ok(measurement)
    }

    fn track_link<T>(&mut self, result: Result<T, Error<E>>) -> Result<T, Error<E>> {
        if let Err(e) = &result {
            if e.is_link_loss() {
                warn!("Lost contact with BMP280, session dropped");
                self.session = None;
            }
        }
        result
    }
}
