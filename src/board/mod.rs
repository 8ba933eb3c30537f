//! nRF52840 board binding.
//!
//! Implements the collaborator traits on top of the SoftDevice and
//! embassy-nrf peripherals.  The trait calls are synchronous and never
//! wait: each one just hands a request to the async task that owns the
//! peripheral (radio, UART TX, LED).  Results come back to the gateway
//! task through [`INBOUND`].

pub mod indicator;
pub mod radio;
pub mod serial;

use ble2uart::ble::RadioEvent;
use ble2uart::config::RX_CHUNK_LEN;
use ble2uart::driver::{Amplifier, Platform, Watchdog};
use ble2uart::error::DriverError;
use embassy_nrf::gpio::Output;
use embassy_nrf::wdt::WatchdogHandle;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

pub use indicator::Led;
pub use radio::SoftdeviceRadio;
pub use serial::HostLink;

/// Everything the gateway task reacts to.
pub enum Inbound {
    Radio(RadioEvent),
    UartRx(Vec<u8, RX_CHUNK_LEN>),
    UartSent,
}

pub static INBOUND: Channel<CriticalSectionRawMutex, Inbound, 16> = Channel::new();

pub struct Nrf52840;

impl Platform for Nrf52840 {
    type Radio = SoftdeviceRadio;
    type Amplifier = PaLna;
    type Serial = HostLink;
    type Indicator = Led;
    type Watchdog = HardwareWatchdog;
}

/// PA/LNA front-end control lines.
pub struct PaLna {
    pub crx: Output<'static>,
    pub csd: Output<'static>,
}

impl Amplifier for PaLna {
    fn enable_rx(&mut self) -> Result<(), DriverError> {
        self.csd.set_high();
        self.crx.set_high();
        Ok(())
    }
}

pub struct HardwareWatchdog {
    pub handle: WatchdogHandle,
}

impl Watchdog for HardwareWatchdog {
    fn feed(&mut self) {
        self.handle.pet();
    }
}
