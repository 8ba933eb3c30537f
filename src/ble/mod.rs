//! Bluetooth Low Energy subsystem.
//!
//! The gateway drives the radio as a pure **observer** - it never
//! connects to anything:
//!
//! 1. **Scan configuration** - which PHYs and primary channels to scan,
//!    manufacturer filter and advertisement length cap.
//! 2. **Scanner** - rotates through enabled PHYs, (re)programs the radio
//!    and turns scan results into UART advertisement reports.
//! 3. **Advertisement parser** - pulls the manufacturer id out of raw
//!    AD structures for filtering.

pub mod adv_parser;
pub mod scan_config;
pub mod scanner;

use core::fmt;

use heapless::Vec;

use crate::config::MAX_SCAN_DATA_BYTES;
use crate::error::Error;

/// BLE physical layer used for scanning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Modulation {
    /// 1 Mbit/s "classic" advertising.
    OneMbit = 0x01,
    /// 2 Mbit/s, extended advertising payloads.
    TwoMbit = 0x02,
    /// 125 kbit/s coded PHY (BLE Long Range).
    Coded = 0x04,
}

impl Modulation {
    /// Fixed rotation order: coded → 1M → 2M → coded ...
    pub const ROTATION: [Modulation; 3] =
        [Modulation::Coded, Modulation::OneMbit, Modulation::TwoMbit];

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Modulation {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0x01 => Ok(Modulation::OneMbit),
            0x02 => Ok(Modulation::TwoMbit),
            0x04 => Ok(Modulation::Coded),
            _ => Err(Error::InvalidParam),
        }
    }
}

/// Primary advertising channels to scan.
///
/// On 2 Mbit/s the mask only selects where the primary (1 Mbit/s)
/// advertisement is picked up; the extended payload follows on a
/// data channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelMask {
    pub ch37: bool,
    pub ch38: bool,
    pub ch39: bool,
}

impl ChannelMask {
    pub const fn all() -> Self {
        Self {
            ch37: true,
            ch38: true,
            ch39: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            ch37: false,
            ch38: false,
            ch39: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.ch37 || self.ch38 || self.ch39)
    }
}

impl Default for ChannelMask {
    fn default() -> Self {
        Self::all()
    }
}

/// 48-bit BLE device address, stored in radio (little-endian) order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Build from the lower 48 bits of a `u64` (as returned by the radio).
    pub fn from_u64(raw: u64) -> Self {
        let b = raw.to_le_bytes();
        Self([b[0], b[1], b[2], b[3], b[4], b[5]])
    }

    pub fn bytes(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    /// Most significant byte first: `AA:BB:CC:DD:EE:FF`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[5], b[4], b[3], b[2], b[1], b[0]
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MacAddress {
    fn format(&self, f: defmt::Formatter) {
        let b = &self.0;
        defmt::write!(
            f,
            "{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}",
            b[5],
            b[4],
            b[3],
            b[2],
            b[1],
            b[0]
        )
    }
}

/// One advertisement as handed over by the radio.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanResult {
    /// Advertiser address.
    pub addr: MacAddress,
    /// Received Signal Strength Indicator (dBm).
    pub rssi: i8,
    /// Raw AD structures.
    pub data: Vec<u8, MAX_SCAN_DATA_BYTES>,
    /// PHY the advertisement was received on.
    pub phy: Modulation,
    /// Channel index the advertisement was received on.
    pub channel: u8,
}

impl ScanResult {
    /// Build a result, truncating `data` to the radio's maximum.
    pub fn new(addr: MacAddress, rssi: i8, data: &[u8], phy: Modulation, channel: u8) -> Self {
        let take = data.len().min(MAX_SCAN_DATA_BYTES);
        let mut buf = Vec::new();
        // Cannot fail: `take` is bounded by the capacity.
        let _ = buf.extend_from_slice(&data[..take]);
        Self {
            addr,
            rssi,
            data: buf,
            phy,
            channel,
        }
    }
}

/// Parameters handed to the advertising engine when scanning (re)starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanParams {
    pub channels: ChannelMask,
    /// Unused while scanning.
    pub adv_interval_ms: u32,
    /// Unused while scanning.
    pub adv_power_dbm: i8,
    pub max_adv_length: u8,
    /// Configured id when the filter is on, the "unknown" sentinel otherwise.
    pub manufacturer_id: u16,
}

/// Events the radio driver delivers to the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioEvent {
    /// An advertisement was received.
    Received(ScanResult),
    /// The scan window on the current PHY closed.
    Timeout,
    Sent,
    Connected,
    Disconnected,
}
