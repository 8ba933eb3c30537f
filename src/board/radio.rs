//! SoftDevice observer.
//!
//! `SoftdeviceRadio` tracks the init/uninit sequence the scanner walks
//! through and, on `scan_start`, signals [`radio_task`] which runs the
//! actual `central::scan` until the scan window times out or a new
//! request arrives.

use core::slice;

use ble2uart::ble::{MacAddress, Modulation, RadioEvent, ScanParams, ScanResult};
use ble2uart::config::SCAN_TIMEOUT_SECS;
use ble2uart::driver::Radio;
use ble2uart::error::DriverError;
use defmt::{debug, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use nrf_softdevice::ble::{central, PhySet};
use nrf_softdevice::{raw, Softdevice};

use super::{Inbound, INBOUND};

#[derive(Clone, Copy)]
enum RadioRequest {
    Start {
        modulation: Modulation,
        params: ScanParams,
    },
    Stop,
}

static RADIO_CTRL: Signal<CriticalSectionRawMutex, RadioRequest> = Signal::new();

pub struct SoftdeviceRadio {
    address: u64,
    modulation: Option<Modulation>,
    params: Option<ScanParams>,
    scanning: bool,
}

impl SoftdeviceRadio {
    pub fn new(address: MacAddress) -> Self {
        let b = address.bytes();
        let raw = u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], 0, 0]);
        Self {
            address: raw,
            modulation: None,
            params: None,
            scanning: false,
        }
    }
}

impl Radio for SoftdeviceRadio {
    fn init(&mut self, modulation: Modulation) -> Result<(), DriverError> {
        if self.modulation.is_some() {
            return Err(DriverError::InvalidState);
        }
        self.modulation = Some(modulation);
        Ok(())
    }

    fn uninit(&mut self) -> Result<(), DriverError> {
        self.modulation = None;
        Ok(())
    }

    fn adv_init(&mut self, params: &ScanParams) -> Result<(), DriverError> {
        if self.modulation.is_none() {
            return Err(DriverError::InvalidState);
        }
        self.params = Some(*params);
        Ok(())
    }

    fn adv_uninit(&mut self) -> Result<(), DriverError> {
        if self.scanning {
            RADIO_CTRL.signal(RadioRequest::Stop);
            self.scanning = false;
        }
        self.params = None;
        Ok(())
    }

    fn scan_start(&mut self) -> Result<(), DriverError> {
        let (Some(modulation), Some(params)) = (self.modulation, self.params) else {
            return Err(DriverError::InvalidState);
        };
        RADIO_CTRL.signal(RadioRequest::Start { modulation, params });
        self.scanning = true;
        Ok(())
    }

    fn scan_stop(&mut self) -> Result<(), DriverError> {
        if self.params.is_none() {
            return Err(DriverError::InvalidState);
        }
        RADIO_CTRL.signal(RadioRequest::Stop);
        self.scanning = false;
        Ok(())
    }

    fn address(&self) -> Result<u64, DriverError> {
        Ok(self.address)
    }
}

/// Primary scan PHY.  2 Mbit/s only exists as a secondary PHY, so it is
/// picked up through extended advertising on the 1 Mbit/s primary.
fn scan_phys(modulation: Modulation) -> (PhySet, bool) {
    match modulation {
        Modulation::OneMbit => (PhySet::M1, false),
        Modulation::TwoMbit => (PhySet::M1, true),
        Modulation::Coded => (PhySet::Coded, true),
    }
}

fn to_scan_result(params: &raw::ble_gap_evt_adv_report_t) -> ScanResult {
    let data = unsafe { slice::from_raw_parts(params.data.p_data, params.data.len as usize) };
    let phy_raw = if params.secondary_phy != 0 {
        params.secondary_phy
    } else {
        params.primary_phy
    };
    let phy = Modulation::try_from(phy_raw).unwrap_or(Modulation::OneMbit);
    ScanResult::new(
        MacAddress(params.peer_addr.addr),
        params.rssi,
        data,
        phy,
        params.ch_index,
    )
}

/// Owns the SoftDevice scanner.
///
/// Note: `central::ScanConfig` has no channel mask, so every primary
/// advertising channel is scanned regardless of `ScanParams::channels`.
#[embassy_executor::task]
pub async fn radio_task(sd: &'static Softdevice) -> ! {
    loop {
        let RadioRequest::Start { modulation, params } = RADIO_CTRL.wait().await else {
            continue;
        };
        let (phys, extended) = scan_phys(modulation);
        debug!(
            "radio: scan {} ch {} id {=u16:#x}",
            modulation, params.channels, params.manufacturer_id
        );

        let config = central::ScanConfig {
            active: false,
            extended,
            phys,
            // 10 ms units
            timeout: SCAN_TIMEOUT_SECS * 100,
            ..Default::default()
        };

        let scan = central::scan(sd, &config, |report| {
            let result = to_scan_result(report);
            if INBOUND
                .try_send(Inbound::Radio(RadioEvent::Received(result)))
                .is_err()
            {
                debug!("radio: inbound full, advertisement dropped");
            }
            None::<()>
        });

        match select(scan, RADIO_CTRL.wait()).await {
            Either::First(Err(central::ScanError::Timeout)) => {
                INBOUND.send(Inbound::Radio(RadioEvent::Timeout)).await;
            }
            Either::First(Err(e)) => {
                warn!("radio: scan failed: {:?}", e);
                INBOUND.send(Inbound::Radio(RadioEvent::Timeout)).await;
            }
            Either::First(Ok(())) => {}
            // Scan dropped; handle the new request on the next pass.
            Either::Second(next) => RADIO_CTRL.signal(next),
        }
    }
}
