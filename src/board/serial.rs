//! Host UART (UARTE0).
//!
//! RX reads until the line goes idle and forwards whatever arrived as one
//! chunk.  TX takes frames from [`TX_FRAMES`] one at a time and reports
//! each completed write back to the gateway.

use ble2uart::config::{Baudrate, MAX_FRAME_LEN, RX_CHUNK_LEN};
use ble2uart::driver::SerialPort;
use ble2uart::error::DriverError;
use defmt::warn;
use embassy_nrf::peripherals::{TIMER1, UARTE0};
use embassy_nrf::uarte::{self, UarteRxWithIdle, UarteTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

use super::{Inbound, INBOUND};

static TX_FRAMES: Channel<CriticalSectionRawMutex, Vec<u8, MAX_FRAME_LEN>, 2> = Channel::new();

pub fn uarte_baudrate(baud: Baudrate) -> uarte::Baudrate {
    match baud {
        Baudrate::Baud9600 => uarte::Baudrate::BAUD9600,
        Baudrate::Baud115200 => uarte::Baudrate::BAUD115200,
    }
}

pub struct HostLink {
    device_id: u64,
}

impl HostLink {
    pub fn new(device_id: u64) -> Self {
        Self { device_id }
    }
}

impl SerialPort for HostLink {
    fn send(&mut self, frame: &[u8]) -> Result<(), DriverError> {
        let frame = Vec::from_slice(frame).map_err(|_| DriverError::NoMemory)?;
        TX_FRAMES.try_send(frame).map_err(|_| DriverError::Busy)
    }

    fn device_id(&self) -> Result<u64, DriverError> {
        Ok(self.device_id)
    }
}

#[embassy_executor::task]
pub async fn uart_rx_task(mut rx: UarteRxWithIdle<'static, UARTE0, TIMER1>) -> ! {
    let mut buf = [0u8; RX_CHUNK_LEN];
    loop {
        match rx.read_until_idle(&mut buf).await {
            Ok(0) => {}
            Ok(n) => {
                // Cannot fail: n <= RX_CHUNK_LEN.
                let chunk = Vec::from_slice(&buf[..n]).unwrap_or_default();
                INBOUND.send(Inbound::UartRx(chunk)).await;
            }
            Err(e) => warn!("uart: rx error {:?}", e),
        }
    }
}

#[embassy_executor::task]
pub async fn uart_tx_task(mut tx: UarteTx<'static, UARTE0>) -> ! {
    loop {
        let frame = TX_FRAMES.receive().await;
        if let Err(e) = tx.write(&frame).await {
            warn!("uart: tx error {:?}", e);
        }
        INBOUND.send(Inbound::UartSent).await;
    }
}
