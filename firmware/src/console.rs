//! Serial console shared by all tasks.

use core::fmt::Display;

use defmt::Display2Format;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};

/// Serializes writes to the console.
///
/// The lock is taken for exactly one report and released when the guard
/// drops, whichever way `print` returns.
pub struct Console {
    lock: Mutex<CriticalSectionRawMutex, ()>,
}

impl Console {
    pub const fn new() -> Self {
        Self {
            lock: Mutex::new(()),
        }
    }

    pub async fn print(&self, report: impl Display) {
        let _guard = self.lock.lock().await;
        defmt::println!("{}", Display2Format(&report));
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
