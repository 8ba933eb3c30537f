//! Unit tests for the frame codec.
//!
//! Host-only: exercise framing, CRC and per-command payload validation.

use heapless::Vec;

use super::codec::MAX_PAYLOAD_LEN;
use super::*;
use crate::config::MAX_FRAME_LEN;

fn frame(cmd: &Command) -> Vec<u8, MAX_FRAME_LEN> {
    let mut buf = [0u8; MAX_FRAME_LEN];
    let n = encode(cmd, &mut buf).unwrap();
    Vec::from_slice(&buf[..n]).unwrap()
}

/// Hand-build a frame with a correct CRC around an arbitrary payload.
fn raw_frame(cmd: u8, payload: &[u8]) -> Vec<u8, MAX_FRAME_LEN> {
    let mut out: Vec<u8, MAX_FRAME_LEN> = Vec::new();
    out.extend_from_slice(&[STX, payload.len() as u8, cmd]).unwrap();
    out.extend_from_slice(payload).unwrap();
    let crc = crc16_ccitt_false(&out).to_le_bytes();
    out.extend_from_slice(&[crc[0], crc[1], ETX]).unwrap();
    out
}

// ═══════════════════════════════════════════════════════════════════════════
// CRC
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn crc_check_value() {
    assert_eq!(crc16_ccitt_false(b"123456789"), 0x29B1);
}

#[test]
fn crc_of_nothing_is_init() {
    assert_eq!(crc16_ccitt_false(&[]), 0xFFFF);
}

// ═══════════════════════════════════════════════════════════════════════════
// Framing
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn bool_command_layout() {
    let f = frame(&Command::SetFilterEnabled(true));
    assert_eq!(f.len(), 7);
    assert_eq!(&f[..4], &[STX, 1, tag::SET_FILTER_ENABLED, 1]);
    let crc = crc16_ccitt_false(&f[..4]).to_le_bytes();
    assert_eq!(&f[4..], &[crc[0], crc[1], ETX]);
}

#[test]
fn filter_id_is_little_endian() {
    let f = frame(&Command::SetFilterId(0x0499));
    assert_eq!(&f[..5], &[STX, 2, tag::SET_FILTER_ID, 0x99, 0x04]);
    assert_eq!(decode(&f), Ok(Command::SetFilterId(0x0499)));
}

#[test]
fn empty_payload_commands() {
    let f = frame(&Command::GetAll);
    assert_eq!(f.len(), 6);
    assert_eq!(decode(&f), Ok(Command::GetAll));
    assert_eq!(decode(&frame(&Command::GetDeviceId)), Ok(Command::GetDeviceId));
}

#[test]
fn set_all_flags() {
    let all = AllSettings {
        filter_enabled: true,
        manufacturer_id: 0x1234,
        channels: ChannelMask {
            ch37: true,
            ch38: false,
            ch39: true,
        },
        coded_phy: false,
        one_mbit_phy: true,
        two_mbit_phy: true,
        max_adv_length: 31,
    };
    let f = frame(&Command::SetAll(all));
    // filter | 1M | 2M | ch37 | ch39
    assert_eq!(&f[3..7], &[0b0101_1101, 0x34, 0x12, 31]);
    assert_eq!(decode(&f), Ok(Command::SetAll(all)));
}

#[test]
fn adv_report_carries_metadata() {
    let mut adv = Vec::new();
    adv.extend_from_slice(&[0x02, 0x01, 0x06]).unwrap();
    let report = AdvReport {
        mac: MacAddress([1, 2, 3, 4, 5, 6]),
        adv,
        rssi: -70,
        phy: Modulation::Coded,
        channel: 38,
    };
    let f = frame(&Command::AdvReport(report.clone()));
    assert_eq!(f[1], 13);
    assert_eq!(&f[3..9], &[1, 2, 3, 4, 5, 6]);
    assert_eq!(f[9], 3);
    assert_eq!(&f[13..16], &[(-70i8) as u8, 0x04, 38]);
    assert_eq!(decode(&f), Ok(Command::AdvReport(report)));
}

#[test]
fn largest_adv_report_fits_a_frame() {
    let mut adv = Vec::new();
    adv.extend_from_slice(&[0xAB; crate::config::MAX_ADV_BYTES]).unwrap();
    let report = AdvReport {
        mac: MacAddress::default(),
        adv,
        rssi: 0,
        phy: Modulation::OneMbit,
        channel: 37,
    };
    let mut buf = [0u8; MAX_FRAME_LEN];
    let n = encode(&Command::AdvReport(report), &mut buf).unwrap();
    assert!(n <= MAX_FRAME_LEN);
    assert!(n - 6 <= MAX_PAYLOAD_LEN);
}

#[test]
fn device_id_layout() {
    let ident = DeviceIdentity {
        id: 0x0102_0304_0506_0708,
        address: MacAddress([0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5]),
    };
    let f = frame(&Command::DeviceId(ident));
    assert_eq!(f[1], 14);
    assert_eq!(&f[3..11], &[8, 7, 6, 5, 4, 3, 2, 1]);
    assert_eq!(decode(&f), Ok(Command::DeviceId(ident)));
}

#[test]
fn ack_result_byte() {
    let ok = frame(&Command::Ack {
        tag: tag::SET_CH_37,
        success: true,
    });
    assert_eq!(&ok[3..5], &[tag::SET_CH_37, 0]);

    let fail = frame(&Command::Ack {
        tag: 0x55,
        success: false,
    });
    assert_eq!(&fail[3..5], &[0x55, 1]);
    assert_eq!(
        decode(&fail),
        Ok(Command::Ack {
            tag: 0x55,
            success: false
        })
    );
}

#[test]
fn unknown_tag_decodes_with_any_payload() {
    let f = raw_frame(0x77, &[1, 2, 3]);
    assert_eq!(decode(&f), Ok(Command::Unknown(0x77)));
}

#[test]
fn output_buffer_too_small() {
    let mut buf = [0u8; 5];
    assert_eq!(
        encode(&Command::SetFilterEnabled(false), &mut buf),
        Err(CodecError::BufferTooSmall)
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Decode failures
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn truncated_input() {
    assert_eq!(decode(&[]), Err(CodecError::Truncated));
    assert_eq!(decode(&[STX, 0, 25, 0, 0]), Err(CodecError::Truncated));
}

#[test]
fn wrong_start_marker() {
    let mut f = frame(&Command::GetAll);
    f[0] = 0x00;
    assert_eq!(decode(&f), Err(CodecError::BadStart));
}

#[test]
fn wrong_end_marker() {
    let mut f = frame(&Command::GetAll);
    let last = f.len() - 1;
    f[last] = 0x0D;
    assert_eq!(decode(&f), Err(CodecError::BadEnd));
}

#[test]
fn partial_frame_is_length_mismatch() {
    let f = frame(&Command::SetFilterId(7));
    assert_eq!(decode(&f[..f.len() - 1]), Err(CodecError::LengthMismatch));
}

#[test]
fn trailing_bytes_are_length_mismatch() {
    let mut f = frame(&Command::GetAll);
    f.push(0x00).unwrap();
    assert_eq!(decode(&f), Err(CodecError::LengthMismatch));
}

#[test]
fn prefix_decode_ignores_what_follows() {
    let mut buf = frame(&Command::SetFilterId(0x1234));
    let first = buf.len();
    buf.extend_from_slice(&frame(&Command::SetFilterEnabled(true)))
        .unwrap();

    let (cmd, used) = decode_prefix(&buf).unwrap();
    assert_eq!(cmd, Command::SetFilterId(0x1234));
    assert_eq!(used, first);
    let (cmd, _) = decode_prefix(&buf[used..]).unwrap();
    assert_eq!(cmd, Command::SetFilterEnabled(true));
}

#[test]
fn prefix_decode_needs_the_whole_frame() {
    let f = frame(&Command::SetFilterId(7));
    assert_eq!(decode_prefix(&f[..f.len() - 1]), Err(CodecError::Truncated));
    assert_eq!(decode_prefix(&f[1..]), Err(CodecError::BadStart));
}

#[test]
fn corrupted_payload_fails_crc() {
    let mut f = frame(&Command::SetFilterId(0x0499));
    f[3] ^= 0xFF;
    assert!(matches!(decode(&f), Err(CodecError::CrcMismatch { .. })));
}

#[test]
fn bool_payload_out_of_range() {
    let f = raw_frame(tag::SET_CH_38, &[2]);
    assert_eq!(decode(&f), Err(CodecError::InvalidValue));
}

#[test]
fn wrong_payload_length_for_command() {
    let f = raw_frame(tag::SET_FILTER_ID, &[0x99]);
    assert_eq!(decode(&f), Err(CodecError::PayloadLength));
    let f = raw_frame(tag::GET_ALL, &[0]);
    assert_eq!(decode(&f), Err(CodecError::PayloadLength));
}

#[test]
fn adv_report_length_over_limit() {
    let mut payload = [0u8; 10];
    payload[6] = 40;
    let f = raw_frame(tag::ADV_REPORT, &payload);
    assert_eq!(decode(&f), Err(CodecError::InvalidValue));
}

#[test]
fn adv_report_unknown_phy() {
    // mac, adv_len 0, rssi, phy 0x03, channel
    let f = raw_frame(tag::ADV_REPORT, &[0, 0, 0, 0, 0, 0, 0, 0xC4, 0x03, 37]);
    assert_eq!(decode(&f), Err(CodecError::InvalidValue));
}
