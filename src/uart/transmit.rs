//! Single-in-flight transmit sequencing.
//!
//! Acks, device-id replies, configuration polls and advertisement
//! reports all share one UART.  Only one frame is ever handed to the
//! driver at a time; anything requested meanwhile waits in a short FIFO
//! and goes out on the next `Sent` event.

use heapless::{Deque, Vec};

use crate::config::{MAX_FRAME_LEN, PENDING_RESPONSES};
use crate::driver::SerialPort;
use crate::error::Error;
use crate::protocol::{self, Command, DeviceIdentity};

/// Outbound message waiting for the UART.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    Ack { tag: u8, success: bool },
    DeviceId(DeviceIdentity),
    /// Ask the host for its configuration.
    ConfigRequest,
    /// Already encoded frame (advertisement reports).
    Framed(Vec<u8, MAX_FRAME_LEN>),
}

impl Response {
    fn command(&self) -> Option<Command> {
        match self {
            Response::Ack { tag, success } => Some(Command::Ack {
                tag: *tag,
                success: *success,
            }),
            Response::DeviceId(ident) => Some(Command::DeviceId(*ident)),
            Response::ConfigRequest => Some(Command::GetAll),
            Response::Framed(_) => None,
        }
    }
}

#[derive(Default)]
pub struct TransmitSequencer {
    in_flight: bool,
    pending: Deque<Response, PENDING_RESPONSES>,
}

impl TransmitSequencer {
    pub const fn new() -> Self {
        Self {
            in_flight: false,
            pending: Deque::new(),
        }
    }

    /// Send `response` now, or queue it if a frame is already in flight.
    ///
    /// With the queue full the newest waiting entry is replaced.
    pub fn request<S: SerialPort>(&mut self, response: Response, serial: &mut S) -> Result<(), Error> {
        if !self.in_flight {
            return self.transmit(&response, serial);
        }

        if self.pending.is_full() {
            if let Some(dropped) = self.pending.pop_back() {
                warn!("tx queue full, overwriting {}", dropped);
            }
        }
        // Cannot fail: a slot was just freed if needed.
        let _ = self.pending.push_back(response);
        Ok(())
    }

    /// Transmit-complete notification from the UART.
    ///
    /// Starts the next waiting response, skipping any that fail to go out.
    pub fn on_sent<S: SerialPort>(&mut self, serial: &mut S) {
        self.in_flight = false;
        while let Some(next) = self.pending.pop_front() {
            match self.transmit(&next, serial) {
                Ok(()) => break,
                Err(e) => error!("dropping queued response: {}", e),
            }
        }
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn transmit<S: SerialPort>(&mut self, response: &Response, serial: &mut S) -> Result<(), Error> {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let frame = match response {
            Response::Framed(bytes) => bytes.as_slice(),
            other => {
                let cmd = other.command().ok_or(Error::InvalidData)?;
                let len = protocol::encode(&cmd, &mut buf)?;
                &buf[..len]
            }
        };

        serial.send(frame)?;
        self.in_flight = true;
        Ok(())
    }
}
