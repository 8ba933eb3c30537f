//! Hardware collaborator traits.
//!
//! The gateway logic never touches peripherals directly.  Each board
//! collaborator sits behind a small trait so the same scan/command
//! logic runs against the SoftDevice on target and against fakes on
//! the host.
//!
//! Implementations do NOT need to be `Send` or `Sync` - everything runs
//! on a single cooperative executor.

use crate::ble::{Modulation, ScanParams};
use crate::error::DriverError;

/// Radio and advertising engine primitives.
pub trait Radio {
    /// Power up the radio on the given PHY.
    fn init(&mut self, modulation: Modulation) -> Result<(), DriverError>;

    /// Release the radio.
    fn uninit(&mut self) -> Result<(), DriverError>;

    /// Configure the advertising engine for scanning.
    fn adv_init(&mut self, params: &ScanParams) -> Result<(), DriverError>;

    /// Release the advertising engine.
    fn adv_uninit(&mut self) -> Result<(), DriverError>;

    /// Start scanning.  Results arrive later as `RadioEvent`s.
    fn scan_start(&mut self) -> Result<(), DriverError>;

    /// Stop scanning.  `InvalidState` if scanning was never initialised.
    fn scan_stop(&mut self) -> Result<(), DriverError>;

    /// 48-bit hardware address in the low bits.
    fn address(&self) -> Result<u64, DriverError>;
}

/// PA/LNA front-end control lines.
pub trait Amplifier {
    /// Switch the front end to receive mode.
    fn enable_rx(&mut self) -> Result<(), DriverError>;
}

/// Outbound serial channel towards the host.
pub trait SerialPort {
    /// Queue one frame.  Completion is reported later as `UartEvent::Sent`.
    fn send(&mut self, frame: &[u8]) -> Result<(), DriverError>;

    /// Communication layer identifier reported in device-id replies.
    fn device_id(&self) -> Result<u64, DriverError>;
}

/// Status LED.
pub trait Indicator {
    /// Stop any blink in progress.
    fn blink_stop(&mut self) -> Result<(), DriverError>;

    /// Light the LED once for `duration_ms`.
    fn blink_once(&mut self, duration_ms: u16) -> Result<(), DriverError>;
}

/// Hardware watchdog.
pub trait Watchdog {
    fn feed(&mut self);
}

/// Set of collaborator types a board provides.
pub trait Platform {
    type Radio: Radio;
    type Amplifier: Amplifier;
    type Serial: SerialPort;
    type Indicator: Indicator;
    type Watchdog: Watchdog;
}

/// Board collaborators owned by the gateway.
///
/// Fields are public so callers can borrow several at once.
pub struct Board<P: Platform> {
    pub radio: P::Radio,
    pub amplifier: P::Amplifier,
    pub serial: P::Serial,
    pub indicator: P::Indicator,
    pub watchdog: P::Watchdog,
}

/// Front end for boards without PA/LNA.
pub struct NoAmplifier;

impl Amplifier for NoAmplifier {
    fn enable_rx(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}
