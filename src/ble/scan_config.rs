//! Scan configuration - the shared record the host edits over UART and
//! the scanner reads every time it reprograms the radio.

use super::{ChannelMask, Modulation};
use crate::config::{BoardFeatures, DEFAULT_MANUFACTURER_ID, MAX_ADV_BYTES};
use crate::error::Error;

/// Scan parameters currently in effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanConfiguration {
    channels: ChannelMask,
    coded_enabled: bool,
    one_mbit_enabled: bool,
    two_mbit_enabled: bool,
    current_modulation: Modulation,
    filter_enabled: bool,
    manufacturer_id: u16,
    max_adv_length: u8,
    features: BoardFeatures,
}

impl ScanConfiguration {
    /// All channels, 1 Mbit/s only, filter off.
    pub fn new(features: BoardFeatures) -> Self {
        Self {
            channels: ChannelMask::all(),
            coded_enabled: false,
            one_mbit_enabled: true,
            two_mbit_enabled: false,
            current_modulation: Modulation::OneMbit,
            filter_enabled: false,
            manufacturer_id: DEFAULT_MANUFACTURER_ID,
            max_adv_length: MAX_ADV_BYTES as u8,
            features,
        }
    }

    /// Replace the channel mask.
    ///
    /// Returns `InvalidParam` and keeps the previous mask if no channel is enabled.
    pub fn set_channels(&mut self, channels: ChannelMask) -> Result<(), Error> {
        if channels.is_empty() {
            return Err(Error::InvalidParam);
        }
        self.channels = channels;
        Ok(())
    }

    pub fn channels(&self) -> ChannelMask {
        self.channels
    }

    /// Enable or disable scanning on one PHY.
    ///
    /// On a board without Long Range support every coded PHY call returns
    /// `NotSupported`, whichever way it asks, and the flag stays unset.
    pub fn enable_modulation(&mut self, modulation: Modulation, enable: bool) -> Result<(), Error> {
        match modulation {
            Modulation::Coded => {
                if !self.features.coded_phy_supported {
                    return Err(Error::NotSupported);
                }
                self.coded_enabled = enable;
            }
            Modulation::OneMbit => self.one_mbit_enabled = enable,
            Modulation::TwoMbit => self.two_mbit_enabled = enable,
        }
        Ok(())
    }

    pub fn is_modulation_enabled(&self, modulation: Modulation) -> bool {
        match modulation {
            Modulation::Coded => self.coded_enabled,
            Modulation::OneMbit => self.one_mbit_enabled,
            Modulation::TwoMbit => self.two_mbit_enabled,
        }
    }

    pub fn any_modulation_enabled(&self) -> bool {
        self.coded_enabled || self.one_mbit_enabled || self.two_mbit_enabled
    }

    pub fn current_modulation(&self) -> Modulation {
        self.current_modulation
    }

    /// Advance `current_modulation` to the next enabled PHY in rotation order.
    ///
    /// If no other PHY is enabled the current one is kept, even if it has
    /// itself been disabled.
    pub fn select_next_modulation(&mut self) -> Modulation {
        let rotation = Modulation::ROTATION;
        let start = rotation
            .iter()
            .position(|&m| m == self.current_modulation)
            .unwrap_or(0);

        for step in 1..rotation.len() {
            let candidate = rotation[(start + step) % rotation.len()];
            if self.is_modulation_enabled(candidate) {
                self.current_modulation = candidate;
                break;
            }
        }
        self.current_modulation
    }

    pub fn set_manufacturer_filter(&mut self, enabled: bool) {
        self.filter_enabled = enabled;
    }

    pub fn set_manufacturer_id(&mut self, id: u16) {
        self.manufacturer_id = id;
    }

    pub fn set_max_adv_length(&mut self, length: u8) {
        self.max_adv_length = length;
    }

    pub fn max_adv_length(&self) -> u8 {
        self.max_adv_length
    }

    /// Snapshot of the manufacturer filter: `(enabled, id)`.
    pub fn filter(&self) -> (bool, u16) {
        (self.filter_enabled, self.manufacturer_id)
    }

    pub fn features(&self) -> BoardFeatures {
        self.features
    }
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        Self::new(BoardFeatures::default())
    }
}
