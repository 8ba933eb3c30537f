//! Host command engine.
//!
//! Received chunks go through [`Reassembler`]; every complete frame is
//! dispatched here and answered through the [`TransmitSequencer`].
//!
//! | Command                     | Action                              | Reply          |
//! |-----------------------------|-------------------------------------|----------------|
//! | filter enable / filter id   | update manufacturer filter          | ack            |
//! | coded / 1M / 2M PHY         | enable or disable that PHY          | ack            |
//! | channel 37 / 38 / 39        | set one bit of the channel mask     | ack            |
//! | set all                     | every setter above, then restart    | ack            |
//! | LED control                 | stop blink, blink once if non-zero  | ack            |
//! | get device id               | -                                   | device id      |
//! | anything else               | -                                   | failure ack    |

use super::reassembly::Reassembler;
use super::transmit::{Response, TransmitSequencer};
use crate::ble::scanner::ScanOrchestrator;
use crate::ble::{MacAddress, Modulation};
use crate::driver::{Board, Indicator, Platform, Radio, SerialPort, Watchdog};
use crate::error::Error;
use crate::protocol::{AllSettings, Command, DeviceIdentity};

#[derive(Default)]
pub struct CommandEngine {
    reassembler: Reassembler,
    transmitter: TransmitSequencer,
}

impl CommandEngine {
    pub const fn new() -> Self {
        Self {
            reassembler: Reassembler::new(),
            transmitter: TransmitSequencer::new(),
        }
    }

    /// Feed one received chunk and dispatch every command it completes,
    /// in order.  Returns how many were dispatched.
    pub fn on_chunk<P: Platform>(
        &mut self,
        chunk: &[u8],
        scanner: &mut ScanOrchestrator,
        board: &mut Board<P>,
    ) -> usize {
        let commands = self.reassembler.feed(chunk);
        for cmd in commands.iter() {
            debug!("host command {}", cmd);
            self.dispatch(cmd, scanner, board);
        }
        commands.len()
    }

    /// Transmit-complete notification from the UART.
    pub fn on_sent<S: SerialPort>(&mut self, serial: &mut S) {
        self.transmitter.on_sent(serial);
    }

    /// Ask the host to send its configuration.
    pub fn request_config<S: SerialPort>(&mut self, serial: &mut S) -> Result<(), Error> {
        self.transmitter.request(Response::ConfigRequest, serial)
    }

    pub fn transmitter(&self) -> &TransmitSequencer {
        &self.transmitter
    }

    pub fn transmitter_mut(&mut self) -> &mut TransmitSequencer {
        &mut self.transmitter
    }

    pub fn reassembler(&self) -> &Reassembler {
        &self.reassembler
    }

    fn dispatch<P: Platform>(
        &mut self,
        cmd: &Command,
        scanner: &mut ScanOrchestrator,
        board: &mut Board<P>,
    ) {
        let config = scanner.config_mut();
        let success = match *cmd {
            Command::SetFilterEnabled(enabled) => {
                config.set_manufacturer_filter(enabled);
                true
            }
            Command::SetFilterId(id) => {
                config.set_manufacturer_id(id);
                true
            }
            Command::SetCodedPhy(enable) => config.enable_modulation(Modulation::Coded, enable).is_ok(),
            Command::Set1MbitPhy(enable) => {
                config.enable_modulation(Modulation::OneMbit, enable).is_ok()
            }
            Command::Set2MbitPhy(enable) => {
                config.enable_modulation(Modulation::TwoMbit, enable).is_ok()
            }
            Command::SetChannel37(on) => {
                let mut mask = config.channels();
                mask.ch37 = on;
                config.set_channels(mask).is_ok()
            }
            Command::SetChannel38(on) => {
                let mut mask = config.channels();
                mask.ch38 = on;
                config.set_channels(mask).is_ok()
            }
            Command::SetChannel39(on) => {
                let mut mask = config.channels();
                mask.ch39 = on;
                config.set_channels(mask).is_ok()
            }
            Command::SetAll(ref all) => {
                let ok = apply_all(scanner, all);
                self.ack(cmd.tag(), ok, &mut board.serial);
                if ok {
                    match scanner.start(board) {
                        Ok(()) => board.watchdog.feed(),
                        Err(e) => error!("scan restart after set-all failed: {}", e),
                    }
                }
                return;
            }
            Command::LedControl { duration_ms } => {
                let mut ok = board.indicator.blink_stop().is_ok();
                if duration_ms != 0 {
                    ok &= board.indicator.blink_once(duration_ms).is_ok();
                }
                ok
            }
            Command::GetDeviceId => {
                self.send_device_id(cmd.tag(), board);
                return;
            }
            Command::Ack { tag, success } => {
                debug!("host ack for {} ({})", tag, success);
                return;
            }
            Command::Unknown(tag) => {
                warn!("unknown command {}", tag);
                false
            }
            // Gateway-to-host frames make no sense inbound.
            Command::AdvReport(_) | Command::DeviceId(_) | Command::GetAll => false,
        };
        self.ack(cmd.tag(), success, &mut board.serial);
    }

    fn ack<S: SerialPort>(&mut self, tag: u8, success: bool, serial: &mut S) {
        if let Err(e) = self.transmitter.request(Response::Ack { tag, success }, serial) {
            error!("ack {} not sent: {}", tag, e);
        }
    }

    fn send_device_id<P: Platform>(&mut self, tag: u8, board: &mut Board<P>) {
        let identity = board
            .radio
            .address()
            .and_then(|addr| {
                board.serial.device_id().map(|id| DeviceIdentity {
                    id,
                    address: MacAddress::from_u64(addr),
                })
            });

        match identity {
            Ok(identity) => {
                if let Err(e) = self
                    .transmitter
                    .request(Response::DeviceId(identity), &mut board.serial)
                {
                    error!("device id not sent: {}", e);
                }
            }
            Err(e) => {
                error!("device id unavailable: {}", e);
                self.ack(tag, false, &mut board.serial);
            }
        }
    }
}

/// Apply every field of a set-all command.  Each setter runs even if an
/// earlier one failed; returns whether all succeeded.
fn apply_all(scanner: &mut ScanOrchestrator, all: &AllSettings) -> bool {
    let config = scanner.config_mut();
    let mut ok = true;

    config.set_manufacturer_filter(all.filter_enabled);
    config.set_manufacturer_id(all.manufacturer_id);
    ok &= config.set_channels(all.channels).is_ok();
    ok &= config
        .enable_modulation(Modulation::Coded, all.coded_phy)
        .is_ok();
    ok &= config
        .enable_modulation(Modulation::OneMbit, all.one_mbit_phy)
        .is_ok();
    ok &= config
        .enable_modulation(Modulation::TwoMbit, all.two_mbit_phy)
        .is_ok();
    config.set_max_adv_length(all.max_adv_length);

    ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ble::ChannelMask;

    #[test]
    fn apply_all_attempts_every_setter() {
        let mut scanner = ScanOrchestrator::new(crate::config::BoardFeatures {
            coded_phy_supported: false,
            pa_lna: false,
        });
        let all = AllSettings {
            filter_enabled: true,
            manufacturer_id: 0x1234,
            channels: ChannelMask::none(),
            coded_phy: true,
            one_mbit_phy: false,
            two_mbit_phy: true,
            max_adv_length: 20,
        };
        assert!(!apply_all(&mut scanner, &all));

        let cfg = scanner.config();
        // Rejected fields keep their previous value, the rest are applied.
        assert_eq!(cfg.channels(), ChannelMask::all());
        assert!(!cfg.is_modulation_enabled(Modulation::Coded));
        assert!(!cfg.is_modulation_enabled(Modulation::OneMbit));
        assert!(cfg.is_modulation_enabled(Modulation::TwoMbit));
        assert_eq!(cfg.filter(), (true, 0x1234));
        assert_eq!(cfg.max_adv_length(), 20);
    }
}
