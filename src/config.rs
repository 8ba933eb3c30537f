//! Application-wide constants and compile-time configuration.
//!
//! All buffer sizes, timing parameters, board capability gates and
//! protocol constants live here so they can be tuned in one place.

// BLE

/// Manufacturer id used to tag the advertising engine when the filter is
/// disabled.  0xFFFF is reserved by the Bluetooth SIG for internal use, so
/// it never matches a real advertiser.
pub const UNKNOWN_MANUFACTURER_ID: u16 = 0xFFFF;

/// Manufacturer id the filter starts with (Ruuvi Innovations).
pub const DEFAULT_MANUFACTURER_ID: u16 = 0x0499;

/// Advertising interval handed to the advertising engine (ms).
/// Unused while scanning, but the engine requires a value.
pub const ADV_INTERVAL_UNUSED_MS: u32 = 1000;

/// Advertising TX power handed to the advertising engine (dBm). Unused while scanning.
pub const ADV_POWER_UNUSED_DBM: i8 = 0;

/// Largest advertisement payload the report frame can carry (bytes).
pub const MAX_ADV_BYTES: usize = 31;

/// Largest advertisement the radio can hand us (extended advertising).
pub const MAX_SCAN_DATA_BYTES: usize = 255;

/// Scan window per PHY before the radio reports a timeout (seconds).
pub const SCAN_TIMEOUT_SECS: u16 = 7;

// Serial link

/// Carry-over buffer capacity (bytes).  Must be a power of two.
pub const REASSEMBLY_CAPACITY: usize = 128;

/// Scratch buffer used for the combined decode (bytes).
pub const SCRATCH_CAPACITY: usize = REASSEMBLY_CAPACITY / 2;

/// Largest received chunk carried by a single deferred task (bytes).
/// One full frame always fits a single chunk.
pub const RX_CHUNK_LEN: usize = MAX_FRAME_LEN;

/// Largest frame the codec produces or accepts (bytes).
pub const MAX_FRAME_LEN: usize = 64;

/// Responses that may wait while another frame is in flight.
pub const PENDING_RESPONSES: usize = 4;

/// UART baud rate as defined by the board.
pub const UART_BAUDRATE: u32 = 115_200;

// Scheduler / watchdog

/// Depth of the deferred work queue.
pub const SCHED_QUEUE_SIZE: usize = 16;

/// If the watchdog is not fed at this interval or faster, the device reboots (ms).
pub const WATCHDOG_INTERVAL_MS: u32 = 2 * 60 * 1000;

// GPIO pin assignments (nRF52840 dongle defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   UART TX        → P0.06
//   UART RX        → P0.08
//   Status LED     → P0.13
//   PA/LNA CRX     → P0.17  (only on boards with a front-end module)
//   PA/LNA CSD     → P0.19

/// Capability gates that differ between boards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardFeatures {
    /// Radio supports BLE Long Range (coded PHY).
    pub coded_phy_supported: bool,
    /// Board has a PA/LNA front end that must be switched to RX before scanning.
    pub pa_lna: bool,
}

impl Default for BoardFeatures {
    /// nRF52840 without an external front end.
    fn default() -> Self {
        Self {
            coded_phy_supported: true,
            pa_lna: false,
        }
    }
}

/// UART baud rates supported by the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Baudrate {
    Baud9600,
    Baud115200,
}

impl Baudrate {
    /// Convert a board baud rate into a driver setting.
    ///
    /// Unsupported values fall back to 115200.
    pub fn from_board(baud: u32) -> Self {
        match baud {
            9600 => Baudrate::Baud9600,
            115_200 => Baudrate::Baud115200,
            _ => Baudrate::Baud115200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reassembly_capacity_is_power_of_two() {
        assert!(REASSEMBLY_CAPACITY.is_power_of_two());
        assert!(MAX_FRAME_LEN <= SCRATCH_CAPACITY);
    }

    #[test]
    fn board_baudrate_mapping() {
        assert_eq!(Baudrate::from_board(9600), Baudrate::Baud9600);
        assert_eq!(Baudrate::from_board(115_200), Baudrate::Baud115200);
        assert_eq!(Baudrate::from_board(57_600), Baudrate::Baud115200);
    }
}
