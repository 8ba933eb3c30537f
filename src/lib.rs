//! ble2uart - BLE advertisement scanner that relays what it hears to a
//! host over a framed UART link.
//!
//! The library holds every piece of logic that does not touch hardware:
//! PHY rotation, the manufacturer filter, the host protocol, frame
//! reassembly and transmit sequencing.  Peripherals sit behind the traits
//! in [`driver`], so the same code runs on the nRF52840 (see `main.rs`,
//! `embedded` feature) and against fakes on the host.
//!
//! Usage: `cargo test` on the host, `cargo run --release --features embedded`
//! with probe-rs attached for the firmware.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible everywhere.
#[macro_use]
mod fmt;

pub mod ble;
pub mod config;
pub mod driver;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod scheduler;
pub mod uart;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports
// ═══════════════════════════════════════════════════════════════════════════

pub use ble::scan_config::ScanConfiguration;
pub use ble::scanner::{ScanOrchestrator, ScanState};
pub use ble::{ChannelMask, MacAddress, Modulation, RadioEvent, ScanParams, ScanResult};
pub use config::BoardFeatures;
pub use driver::{Board, Platform};
pub use error::{DriverError, Error};
pub use gateway::Gateway;
pub use protocol::{CodecError, Command};
pub use scheduler::{Task, TaskQueue};
pub use uart::{CommandEngine, UartEvent};
