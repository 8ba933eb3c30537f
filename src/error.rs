//! Unified error type for ble2uart.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

use crate::protocol::CodecError;

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Validation
    /// Parameter rejected: empty channel mask, unknown modulation, ...
    InvalidParam,

    // Capability
    /// The board cannot do what was asked (e.g. coded PHY without hardware support).
    NotSupported,

    // Resource / state
    /// A collaborator (radio, advertising engine, UART, LED) reported a failure.
    Driver(DriverError),

    /// The deferred work queue is full.
    NoMemory,

    // Data
    /// Advertisement is larger than the codec can carry.
    DataSize,

    /// Advertisement was rejected by the manufacturer filter.
    InvalidData,

    /// Frame could not be encoded or decoded.
    Codec(CodecError),
}

/// Errors reported by the hardware collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Operation not valid in the current driver state (e.g. scan stop before init).
    InvalidState,
    /// Driver is busy with a previous request.
    Busy,
    /// Request did not fit a driver buffer.
    NoMemory,
    /// Raw error code from the SoftDevice or HAL.
    Raw(u32),
}

// Convenience conversions

impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Error::Driver(e)
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Error::Codec(e)
    }
}
