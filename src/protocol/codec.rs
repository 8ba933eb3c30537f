//! Frame encoding / decoding.

use heapless::Vec;

use super::{
    tag, AdvReport, AllSettings, CodecError, Command, DeviceIdentity, ETX, HEADER_LEN, STX,
    TRAILER_LEN,
};
use crate::ble::{ChannelMask, MacAddress, Modulation};
use crate::config::{MAX_ADV_BYTES, MAX_FRAME_LEN};

/// Largest payload that fits a frame.
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - HEADER_LEN - TRAILER_LEN;

/// mac(6) + adv_len(1) + rssi(1) + phy(1) + channel(1)
const ADV_REPORT_FIXED_LEN: usize = 10;

// SET_ALL flag bits
const FLAG_FILTER: u8 = 1 << 0;
const FLAG_CODED: u8 = 1 << 1;
const FLAG_1M: u8 = 1 << 2;
const FLAG_2M: u8 = 1 << 3;
const FLAG_CH37: u8 = 1 << 4;
const FLAG_CH38: u8 = 1 << 5;
const FLAG_CH39: u8 = 1 << 6;

/// Encode `cmd` into `out`, returning the frame length.
pub fn encode(cmd: &Command, out: &mut [u8]) -> Result<usize, CodecError> {
    let mut payload: Vec<u8, MAX_PAYLOAD_LEN> = Vec::new();
    write_payload(cmd, &mut payload)?;

    let len = payload.len();
    let total = HEADER_LEN + len + TRAILER_LEN;
    if out.len() < total {
        return Err(CodecError::BufferTooSmall);
    }

    out[0] = STX;
    out[1] = len as u8;
    out[2] = cmd.tag();
    out[HEADER_LEN..HEADER_LEN + len].copy_from_slice(&payload);

    let body_end = HEADER_LEN + len;
    let crc = crc16_ccitt_false(&out[..body_end]).to_le_bytes();
    out[body_end] = crc[0];
    out[body_end + 1] = crc[1];
    out[body_end + 2] = ETX;
    Ok(total)
}

/// Decode a buffer holding exactly one frame.
pub fn decode(buf: &[u8]) -> Result<Command, CodecError> {
    if buf.len() < HEADER_LEN + TRAILER_LEN {
        return Err(CodecError::Truncated);
    }
    if buf[0] != STX {
        return Err(CodecError::BadStart);
    }

    let len = buf[1] as usize;
    if HEADER_LEN + len + TRAILER_LEN != buf.len() {
        return Err(CodecError::LengthMismatch);
    }
    if buf[buf.len() - 1] != ETX {
        return Err(CodecError::BadEnd);
    }

    let body_end = HEADER_LEN + len;
    let actual = u16::from_le_bytes([buf[body_end], buf[body_end + 1]]);
    let expected = crc16_ccitt_false(&buf[..body_end]);
    if expected != actual {
        return Err(CodecError::CrcMismatch { expected, actual });
    }

    read_payload(buf[2], &buf[HEADER_LEN..body_end])
}

/// Decode the frame at the start of `buf`, ignoring whatever follows it.
///
/// Returns the command and the number of bytes the frame took.
pub fn decode_prefix(buf: &[u8]) -> Result<(Command, usize), CodecError> {
    if buf.len() < HEADER_LEN + TRAILER_LEN {
        return Err(CodecError::Truncated);
    }
    if buf[0] != STX {
        return Err(CodecError::BadStart);
    }
    let frame_len = HEADER_LEN + buf[1] as usize + TRAILER_LEN;
    if buf.len() < frame_len {
        return Err(CodecError::Truncated);
    }
    let cmd = decode(&buf[..frame_len])?;
    Ok((cmd, frame_len))
}

/// CRC-16/CCITT-FALSE.
pub fn crc16_ccitt_false(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &b in bytes {
        crc ^= (b as u16) << 8;
        for _ in 0..8 {
            if (crc & 0x8000) != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

fn write_payload(cmd: &Command, p: &mut Vec<u8, MAX_PAYLOAD_LEN>) -> Result<(), CodecError> {
    let put = |p: &mut Vec<u8, MAX_PAYLOAD_LEN>, bytes: &[u8]| {
        p.extend_from_slice(bytes)
            .map_err(|_| CodecError::BufferTooSmall)
    };

    match cmd {
        Command::SetFilterEnabled(v)
        | Command::SetCodedPhy(v)
        | Command::Set1MbitPhy(v)
        | Command::Set2MbitPhy(v)
        | Command::SetChannel37(v)
        | Command::SetChannel38(v)
        | Command::SetChannel39(v) => put(p, &[*v as u8]),
        Command::SetFilterId(id) => put(p, &id.to_le_bytes()),
        Command::SetAll(all) => {
            let mut flags = 0u8;
            for (set, bit) in [
                (all.filter_enabled, FLAG_FILTER),
                (all.coded_phy, FLAG_CODED),
                (all.one_mbit_phy, FLAG_1M),
                (all.two_mbit_phy, FLAG_2M),
                (all.channels.ch37, FLAG_CH37),
                (all.channels.ch38, FLAG_CH38),
                (all.channels.ch39, FLAG_CH39),
            ] {
                if set {
                    flags |= bit;
                }
            }
            let id = all.manufacturer_id.to_le_bytes();
            put(p, &[flags, id[0], id[1], all.max_adv_length])
        }
        Command::AdvReport(report) => {
            put(p, &report.mac.bytes())?;
            put(p, &[report.adv.len() as u8])?;
            put(p, &report.adv)?;
            put(p, &[report.rssi as u8, report.phy.as_u8(), report.channel])
        }
        Command::DeviceId(ident) => {
            put(p, &ident.id.to_le_bytes())?;
            put(p, &ident.address.bytes())
        }
        Command::LedControl { duration_ms } => put(p, &duration_ms.to_le_bytes()),
        Command::Ack { tag, success } => put(p, &[*tag, if *success { 0 } else { 1 }]),
        Command::GetDeviceId | Command::GetAll | Command::Unknown(_) => Ok(()),
    }
}

fn read_payload(cmd: u8, p: &[u8]) -> Result<Command, CodecError> {
    let command = match cmd {
        tag::SET_FILTER_ENABLED => Command::SetFilterEnabled(read_bool(p)?),
        tag::SET_FILTER_ID => Command::SetFilterId(read_u16(p)?),
        tag::SET_CODED_PHY => Command::SetCodedPhy(read_bool(p)?),
        tag::SET_1M_PHY => Command::Set1MbitPhy(read_bool(p)?),
        tag::SET_2M_PHY => Command::Set2MbitPhy(read_bool(p)?),
        tag::SET_CH_37 => Command::SetChannel37(read_bool(p)?),
        tag::SET_CH_38 => Command::SetChannel38(read_bool(p)?),
        tag::SET_CH_39 => Command::SetChannel39(read_bool(p)?),
        tag::SET_ALL => {
            expect_len(p, 4)?;
            let flags = p[0];
            Command::SetAll(AllSettings {
                filter_enabled: flags & FLAG_FILTER != 0,
                manufacturer_id: u16::from_le_bytes([p[1], p[2]]),
                channels: ChannelMask {
                    ch37: flags & FLAG_CH37 != 0,
                    ch38: flags & FLAG_CH38 != 0,
                    ch39: flags & FLAG_CH39 != 0,
                },
                coded_phy: flags & FLAG_CODED != 0,
                one_mbit_phy: flags & FLAG_1M != 0,
                two_mbit_phy: flags & FLAG_2M != 0,
                max_adv_length: p[3],
            })
        }
        tag::ADV_REPORT => {
            if p.len() < ADV_REPORT_FIXED_LEN {
                return Err(CodecError::PayloadLength);
            }
            let adv_len = p[6] as usize;
            if adv_len > MAX_ADV_BYTES {
                return Err(CodecError::InvalidValue);
            }
            expect_len(p, ADV_REPORT_FIXED_LEN + adv_len)?;

            let mut mac = [0u8; 6];
            mac.copy_from_slice(&p[..6]);
            let mut adv = Vec::new();
            adv.extend_from_slice(&p[7..7 + adv_len])
                .map_err(|_| CodecError::InvalidValue)?;
            let tail = &p[7 + adv_len..];
            Command::AdvReport(AdvReport {
                mac: MacAddress(mac),
                adv,
                rssi: tail[0] as i8,
                phy: Modulation::try_from(tail[1]).map_err(|_| CodecError::InvalidValue)?,
                channel: tail[2],
            })
        }
        tag::DEVICE_ID => {
            expect_len(p, 14)?;
            let mut id = [0u8; 8];
            id.copy_from_slice(&p[..8]);
            let mut mac = [0u8; 6];
            mac.copy_from_slice(&p[8..14]);
            Command::DeviceId(DeviceIdentity {
                id: u64::from_le_bytes(id),
                address: MacAddress(mac),
            })
        }
        tag::GET_DEVICE_ID => {
            expect_len(p, 0)?;
            Command::GetDeviceId
        }
        tag::GET_ALL => {
            expect_len(p, 0)?;
            Command::GetAll
        }
        tag::LED_CTRL => Command::LedControl {
            duration_ms: read_u16(p)?,
        },
        tag::ACK => {
            expect_len(p, 2)?;
            let success = match p[1] {
                0 => true,
                1 => false,
                _ => return Err(CodecError::InvalidValue),
            };
            Command::Ack { tag: p[0], success }
        }
        other => Command::Unknown(other),
    };
    Ok(command)
}

fn expect_len(p: &[u8], len: usize) -> Result<(), CodecError> {
    if p.len() == len {
        Ok(())
    } else {
        Err(CodecError::PayloadLength)
    }
}

fn read_bool(p: &[u8]) -> Result<bool, CodecError> {
    expect_len(p, 1)?;
    match p[0] {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(CodecError::InvalidValue),
    }
}

fn read_u16(p: &[u8]) -> Result<u16, CodecError> {
    expect_len(p, 2)?;
    Ok(u16::from_le_bytes([p[0], p[1]]))
}
