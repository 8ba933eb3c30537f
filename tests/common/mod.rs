//! Fake board collaborators for driving a `Gateway` on the host.

#![allow(dead_code)]

use ble2uart::ble::{Modulation, ScanParams};
use ble2uart::config::BoardFeatures;
use ble2uart::driver::{Amplifier, Board, Indicator, Platform, Radio, SerialPort, Watchdog};
use ble2uart::error::DriverError;
use ble2uart::protocol::{self, Command};
use ble2uart::Gateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioCall {
    Init(Modulation),
    Uninit,
    AdvInit(ScanParams),
    AdvUninit,
    ScanStart,
    ScanStop,
}

#[derive(Default)]
pub struct FakeRadio {
    pub calls: Vec<RadioCall>,
    pub address: u64,
    pub fail_radio_uninit: bool,
    pub fail_adv_init: bool,
    pub fail_address: bool,
}

impl FakeRadio {
    pub fn inits(&self) -> Vec<Modulation> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RadioCall::Init(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    pub fn last_params(&self) -> Option<ScanParams> {
        self.calls.iter().rev().find_map(|c| match c {
            RadioCall::AdvInit(p) => Some(*p),
            _ => None,
        })
    }
}

impl Radio for FakeRadio {
    fn init(&mut self, modulation: Modulation) -> Result<(), DriverError> {
        self.calls.push(RadioCall::Init(modulation));
        Ok(())
    }

    fn uninit(&mut self) -> Result<(), DriverError> {
        self.calls.push(RadioCall::Uninit);
        if self.fail_radio_uninit {
            return Err(DriverError::Raw(8));
        }
        Ok(())
    }

    fn adv_init(&mut self, params: &ScanParams) -> Result<(), DriverError> {
        self.calls.push(RadioCall::AdvInit(*params));
        if self.fail_adv_init {
            return Err(DriverError::Raw(4));
        }
        Ok(())
    }

    fn adv_uninit(&mut self) -> Result<(), DriverError> {
        self.calls.push(RadioCall::AdvUninit);
        Ok(())
    }

    fn scan_start(&mut self) -> Result<(), DriverError> {
        self.calls.push(RadioCall::ScanStart);
        Ok(())
    }

    fn scan_stop(&mut self) -> Result<(), DriverError> {
        self.calls.push(RadioCall::ScanStop);
        Ok(())
    }

    fn address(&self) -> Result<u64, DriverError> {
        if self.fail_address {
            return Err(DriverError::InvalidState);
        }
        Ok(self.address)
    }
}

#[derive(Default)]
pub struct FakeAmplifier {
    pub rx_enabled: u32,
    pub fail: bool,
}

impl Amplifier for FakeAmplifier {
    fn enable_rx(&mut self) -> Result<(), DriverError> {
        if self.fail {
            return Err(DriverError::Raw(1));
        }
        self.rx_enabled += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSerial {
    pub sent: Vec<Vec<u8>>,
    pub device_id: u64,
}

impl FakeSerial {
    /// Every frame sent so far, decoded.
    pub fn commands(&self) -> Vec<Command> {
        self.sent
            .iter()
            .map(|f| protocol::decode(f).expect("gateway sent an undecodable frame"))
            .collect()
    }
}

impl SerialPort for FakeSerial {
    fn send(&mut self, frame: &[u8]) -> Result<(), DriverError> {
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn device_id(&self) -> Result<u64, DriverError> {
        Ok(self.device_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCall {
    Stop,
    Once(u16),
}

#[derive(Default)]
pub struct FakeLed {
    pub calls: Vec<LedCall>,
}

impl Indicator for FakeLed {
    fn blink_stop(&mut self) -> Result<(), DriverError> {
        self.calls.push(LedCall::Stop);
        Ok(())
    }

    fn blink_once(&mut self, duration_ms: u16) -> Result<(), DriverError> {
        self.calls.push(LedCall::Once(duration_ms));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeWatchdog {
    pub feeds: u32,
}

impl Watchdog for FakeWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

pub struct HostBoard;

impl Platform for HostBoard {
    type Radio = FakeRadio;
    type Amplifier = FakeAmplifier;
    type Serial = FakeSerial;
    type Indicator = FakeLed;
    type Watchdog = FakeWatchdog;
}

pub fn board() -> Board<HostBoard> {
    Board {
        radio: FakeRadio {
            address: 0x0000_C0FF_EE12_3456,
            ..Default::default()
        },
        amplifier: FakeAmplifier::default(),
        serial: FakeSerial {
            device_id: 0x1122_3344_5566_7788,
            ..Default::default()
        },
        indicator: FakeLed::default(),
        watchdog: FakeWatchdog::default(),
    }
}

pub fn gateway() -> Gateway<HostBoard> {
    Gateway::new(board(), BoardFeatures::default())
}

pub fn gateway_with(features: BoardFeatures) -> Gateway<HostBoard> {
    Gateway::new(board(), features)
}

pub fn frame(cmd: &Command) -> Vec<u8> {
    let mut buf = [0u8; 64];
    let n = protocol::encode(cmd, &mut buf).expect("encode");
    buf[..n].to_vec()
}

/// Manufacturer-specific advertisement: flags + company id + two bytes.
pub fn adv_with_manufacturer(id: u16) -> Vec<u8> {
    let id = id.to_le_bytes();
    vec![0x02, 0x01, 0x06, 0x05, 0xFF, id[0], id[1], 0x05, 0x12]
}
