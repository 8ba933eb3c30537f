//! Host serial protocol - command set and frame codec.
//!
//! Every message on the UART, in both directions, is one frame:
//!
//! ```text
//! ┌──────┬─────┬─────┬───────────────┬───────────┬──────┐
//! │ STX  │ LEN │ CMD │ payload[LEN]  │ CRC16 LE  │ ETX  │
//! │ 0xCA │     │     │               │ STX..data │ 0x0A │
//! └──────┴─────┴─────┴───────────────┴───────────┴──────┘
//! ```
//!
//! CRC16 is CCITT-FALSE (poly 0x1021, init 0xFFFF).

pub mod codec;

#[cfg(test)]
mod tests;

use heapless::Vec;

pub use codec::{crc16_ccitt_false, decode, decode_prefix, encode};

use crate::ble::{ChannelMask, MacAddress, Modulation};
use crate::config::MAX_ADV_BYTES;

/// Start-of-frame marker.
pub const STX: u8 = 0xCA;
/// End-of-frame marker.
pub const ETX: u8 = 0x0A;
/// STX, LEN, CMD.
pub const HEADER_LEN: usize = 3;
/// CRC16, ETX.
pub const TRAILER_LEN: usize = 3;

/// Command tags on the wire.
pub mod tag {
    pub const SET_FILTER_ENABLED: u8 = 1;
    pub const SET_FILTER_ID: u8 = 2;
    pub const SET_CODED_PHY: u8 = 3;
    pub const SET_1M_PHY: u8 = 4;
    pub const SET_2M_PHY: u8 = 5;
    pub const SET_CH_37: u8 = 6;
    pub const SET_CH_38: u8 = 7;
    pub const SET_CH_39: u8 = 8;
    pub const SET_ALL: u8 = 15;
    pub const ADV_REPORT: u8 = 16;
    pub const DEVICE_ID: u8 = 17;
    pub const GET_DEVICE_ID: u8 = 24;
    pub const GET_ALL: u8 = 25;
    pub const LED_CTRL: u8 = 26;
    pub const ACK: u8 = 32;
}

/// Frame codec failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Output buffer cannot hold the encoded frame.
    BufferTooSmall,
    /// Fewer bytes than the smallest possible frame.
    Truncated,
    /// First byte is not STX.
    BadStart,
    /// Last byte is not ETX.
    BadEnd,
    /// LEN does not match the number of bytes given.
    LengthMismatch,
    CrcMismatch { expected: u16, actual: u16 },
    /// Payload length is wrong for the command.
    PayloadLength,
    /// A payload field holds an out-of-range value.
    InvalidValue,
}

/// Every setting in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AllSettings {
    pub filter_enabled: bool,
    pub manufacturer_id: u16,
    pub channels: ChannelMask,
    pub coded_phy: bool,
    pub one_mbit_phy: bool,
    pub two_mbit_phy: bool,
    pub max_adv_length: u8,
}

/// Advertisement relayed to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdvReport {
    pub mac: MacAddress,
    pub adv: Vec<u8, MAX_ADV_BYTES>,
    pub rssi: i8,
    pub phy: Modulation,
    pub channel: u8,
}

/// Reply to `GetDeviceId`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceIdentity {
    /// Communication layer identifier.
    pub id: u64,
    /// Radio hardware address.
    pub address: MacAddress,
}

/// Decoded frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    SetFilterEnabled(bool),
    SetFilterId(u16),
    SetCodedPhy(bool),
    Set1MbitPhy(bool),
    Set2MbitPhy(bool),
    SetChannel37(bool),
    SetChannel38(bool),
    SetChannel39(bool),
    SetAll(AllSettings),
    AdvReport(AdvReport),
    DeviceId(DeviceIdentity),
    GetDeviceId,
    /// Ask the host to send its configuration (answered with `SetAll`).
    GetAll,
    /// Blink the LED once; 0 just stops the LED.
    LedControl { duration_ms: u16 },
    Ack { tag: u8, success: bool },
    /// Well-formed frame with a tag we do not know.
    Unknown(u8),
}

impl Command {
    /// Wire tag of this command.
    pub fn tag(&self) -> u8 {
        match self {
            Command::SetFilterEnabled(_) => tag::SET_FILTER_ENABLED,
            Command::SetFilterId(_) => tag::SET_FILTER_ID,
            Command::SetCodedPhy(_) => tag::SET_CODED_PHY,
            Command::Set1MbitPhy(_) => tag::SET_1M_PHY,
            Command::Set2MbitPhy(_) => tag::SET_2M_PHY,
            Command::SetChannel37(_) => tag::SET_CH_37,
            Command::SetChannel38(_) => tag::SET_CH_38,
            Command::SetChannel39(_) => tag::SET_CH_39,
            Command::SetAll(_) => tag::SET_ALL,
            Command::AdvReport(_) => tag::ADV_REPORT,
            Command::DeviceId(_) => tag::DEVICE_ID,
            Command::GetDeviceId => tag::GET_DEVICE_ID,
            Command::GetAll => tag::GET_ALL,
            Command::LedControl { .. } => tag::LED_CTRL,
            Command::Ack { .. } => tag::ACK,
            Command::Unknown(t) => *t,
        }
    }
}
