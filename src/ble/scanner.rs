//! Scan orchestration - rotates the radio through the enabled PHYs and
//! turns received advertisements into UART reports.
//!
//! ```text
//!            start() ok                 Timeout
//!   Idle ───────────────► Scanning(m) ─────────► start() → Scanning(next m)
//!    ▲                        │
//!    └────────────────────────┘
//!      start() with no PHY enabled
//! ```
//!
//! Every restart is a full teardown: advertising engine and radio are
//! uninitialised and brought back up with the next modulation.  Nothing
//! is reconfigured in place.

use heapless::Vec;

use super::adv_parser;
use super::scan_config::ScanConfiguration;
use super::{Modulation, RadioEvent, ScanParams, ScanResult};
use crate::config::{
    BoardFeatures, ADV_INTERVAL_UNUSED_MS, ADV_POWER_UNUSED_DBM, MAX_ADV_BYTES, MAX_FRAME_LEN,
    UNKNOWN_MANUFACTURER_ID,
};
use crate::driver::{Amplifier, Board, Platform, Radio, SerialPort, Watchdog};
use crate::error::Error;
use crate::protocol::{self, AdvReport, Command};
use crate::scheduler::Task;
use crate::uart::{Response, TransmitSequencer};

/// Radio session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanState {
    Idle,
    Scanning(Modulation),
}

pub struct ScanOrchestrator {
    config: ScanConfiguration,
    state: ScanState,
}

impl ScanOrchestrator {
    pub fn new(features: BoardFeatures) -> Self {
        Self {
            config: ScanConfiguration::new(features),
            state: ScanState::Idle,
        }
    }

    pub fn config(&self) -> &ScanConfiguration {
        &self.config
    }

    /// Setter access for the command engine.
    pub fn config_mut(&mut self) -> &mut ScanConfiguration {
        &mut self.config
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// (Re)start scanning on the next enabled PHY.
    ///
    /// With every PHY disabled this only stops the scan.  Otherwise the
    /// first failing step aborts the rest and its error is returned.
    pub fn start<P: Platform>(&mut self, board: &mut Board<P>) -> Result<(), Error> {
        if !self.config.any_modulation_enabled() {
            info!("no PHY enabled, stopping scan");
            self.state = ScanState::Idle;
            return board.radio.scan_stop().map_err(Error::from);
        }

        board.radio.adv_uninit()?;
        board.radio.uninit()?;
        self.state = ScanState::Idle;

        let modulation = self.config.select_next_modulation();
        if self.config.features().pa_lna {
            board.amplifier.enable_rx()?;
        }
        board.radio.init(modulation)?;

        let params = self.scan_params();
        board.radio.adv_init(&params)?;
        board.radio.scan_start()?;
        board.watchdog.feed();

        self.state = ScanState::Scanning(modulation);
        info!("scanning on {} ({})", modulation, params.channels);
        Ok(())
    }

    /// Stop scanning.  The radio's result is returned unchanged.
    pub fn stop<R: Radio>(&mut self, radio: &mut R) -> Result<(), Error> {
        radio.scan_stop()?;
        self.state = ScanState::Idle;
        Ok(())
    }

    /// Handle a radio event.  Received advertisements are handed back as a
    /// task to run outside the callback.
    pub fn on_radio_event<P: Platform>(
        &mut self,
        event: RadioEvent,
        board: &mut Board<P>,
    ) -> Option<Task> {
        match event {
            RadioEvent::Received(scan) => return Some(Task::Broadcast(scan)),
            RadioEvent::Timeout => {
                if let Err(e) = self.start(board) {
                    error!("scan restart failed: {}", e);
                }
            }
            other => debug!("radio event {}", other),
        }
        None
    }

    /// Relay one advertisement to the host.
    ///
    /// `DataSize` if it is too long for a report, `InvalidData` if the
    /// manufacturer filter rejects it, `Codec` if it cannot be framed.
    pub fn broadcast<S: SerialPort>(
        &self,
        scan: &ScanResult,
        tx: &mut TransmitSequencer,
        serial: &mut S,
    ) -> Result<(), Error> {
        if scan.data.len() > MAX_ADV_BYTES {
            return Err(Error::DataSize);
        }

        let (filter_enabled, wanted) = self.config.filter();
        if filter_enabled {
            match adv_parser::manufacturer_id(&scan.data) {
                Some(id) if id == wanted => {}
                _ => return Err(Error::InvalidData),
            }
        }

        let mut adv = Vec::new();
        adv.extend_from_slice(&scan.data)
            .map_err(|_| Error::DataSize)?;
        let report = Command::AdvReport(AdvReport {
            mac: scan.addr,
            adv,
            rssi: scan.rssi,
            phy: scan.phy,
            channel: scan.channel,
        });

        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = protocol::encode(&report, &mut buf)?;
        let framed = Vec::from_slice(&buf[..len]).map_err(|_| Error::DataSize)?;
        tx.request(Response::Framed(framed), serial)
    }

    fn scan_params(&self) -> ScanParams {
        let (filter_enabled, id) = self.config.filter();
        ScanParams {
            channels: self.config.channels(),
            adv_interval_ms: ADV_INTERVAL_UNUSED_MS,
            adv_power_dbm: ADV_POWER_UNUSED_DBM,
            max_adv_length: self.config.max_adv_length(),
            manufacturer_id: if filter_enabled {
                id
            } else {
                UNKNOWN_MANUFACTURER_ID
            },
        }
    }
}
