//! Host serial link.
//!
//! - [`reassembly`] rebuilds frames out of arbitrarily chunked reads.
//! - [`transmit`] keeps at most one frame in flight on the UART.
//! - [`command`] dispatches decoded host commands.

pub mod command;
pub mod reassembly;
pub mod transmit;

pub use command::CommandEngine;
pub use reassembly::{Commands, Reassembler, RingBuffer, MAX_FRAMES_PER_FEED};
pub use transmit::{Response, TransmitSequencer};

/// Events the UART driver delivers to the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartEvent<'a> {
    /// Raw bytes read from the host.
    Received(&'a [u8]),
    /// The frame handed to `SerialPort::send` has left the wire.
    Sent,
    Connected,
    Disconnected,
}
