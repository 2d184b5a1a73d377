//! One lock per physical bus.
//!
//! Several sensors, or several callers of one sensor, can share a bus through
//! [`SharedBus`]. The lock is held for the whole closure passed to
//! [`SharedBus::lock`], so a multi-register sequence (initialization,
//! calibration read, measurement) never interleaves with another caller's.
//!
//! ```
//! # use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
//! # struct NoDelay;
//! # impl embedded_hal::delay::DelayNs for NoDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! use bmp280_core::{Bmp280, SharedBus, Address};
//! use embassy_sync::blocking_mutex::raw::NoopRawMutex;
//!
//! # let i2c = I2cMock::new(&[I2cTransaction::write_read(0x76, vec![0xD0], vec![0x58])]);
//! let bus: SharedBus<NoopRawMutex, _> = SharedBus::new(i2c);
//! let id = bus.lock(|i2c| Bmp280::new(i2c, NoDelay, Address::SdoGnd).chip_id());
//! assert_eq!(id, Ok(0x58));
//! # bus.into_inner().done();
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::RawMutex, Mutex};

pub struct SharedBus<M: RawMutex, BUS> {
    bus: Mutex<M, RefCell<BUS>>,
}

impl<M: RawMutex, BUS> SharedBus<M, BUS> {
    pub const fn new(bus: BUS) -> Self {
        Self {
            bus: Mutex::new(RefCell::new(bus)),
        }
    }

    /// Runs `f` with exclusive access to the bus.
    ///
    /// # Panics
    ///
    /// Panics when called again from inside `f` on the same bus.
    pub fn lock<R>(&self, f: impl FnOnce(&mut BUS) -> R) -> R {
        self.bus.lock(|cell| f(&mut cell.borrow_mut()))
    }

    pub fn into_inner(self) -> BUS {
        self.bus.into_inner().into_inner()
    }
}
