//! Gateway - ties the scanner, the host command engine and the deferred
//! work queue to one set of board collaborators.
//!
//! Event sources (radio, UART) call `on_*_event`, which only queue work.
//! The main loop then calls [`Gateway::run_pending`] to run it.

use heapless::Vec;

use crate::ble::scanner::ScanOrchestrator;
use crate::ble::{Modulation, RadioEvent};
use crate::config::{BoardFeatures, RX_CHUNK_LEN};
use crate::driver::{Board, Platform, Watchdog};
use crate::error::Error;
use crate::scheduler::{Task, TaskQueue};
use crate::uart::{CommandEngine, UartEvent};

pub struct Gateway<P: Platform> {
    scanner: ScanOrchestrator,
    engine: CommandEngine,
    tasks: TaskQueue,
    board: Board<P>,
}

impl<P: Platform> Gateway<P> {
    pub fn new(board: Board<P>, features: BoardFeatures) -> Self {
        Self {
            scanner: ScanOrchestrator::new(features),
            engine: CommandEngine::new(),
            tasks: TaskQueue::new(),
            board,
        }
    }

    /// Bring-up: enable Long Range (if the board has it) and 2 Mbit/s,
    /// poll the host for its configuration and start scanning.
    pub fn boot(&mut self) -> Result<(), Error> {
        let config = self.scanner.config_mut();
        if config.features().coded_phy_supported {
            config.enable_modulation(Modulation::Coded, true)?;
        }
        config.enable_modulation(Modulation::TwoMbit, true)?;

        if let Err(e) = self.engine.request_config(&mut self.board.serial) {
            warn!("configuration poll not sent: {}", e);
        }

        self.scanner.start(&mut self.board)
    }

    /// Radio callback entry point.
    pub fn on_radio_event(&mut self, event: RadioEvent) {
        if let Some(task) = self.scanner.on_radio_event(event, &mut self.board) {
            self.defer(task);
        }
    }

    /// UART callback entry point.
    pub fn on_uart_event(&mut self, event: UartEvent<'_>) {
        match event {
            UartEvent::Received(bytes) => {
                for chunk in bytes.chunks(RX_CHUNK_LEN) {
                    let mut data: Vec<u8, RX_CHUNK_LEN> = Vec::new();
                    // Cannot fail: chunks are at most RX_CHUNK_LEN long.
                    let _ = data.extend_from_slice(chunk);
                    self.defer(Task::ParseChunk(data));
                }
            }
            UartEvent::Sent => self.engine.on_sent(&mut self.board.serial),
            UartEvent::Connected => info!("host link up"),
            UartEvent::Disconnected => info!("host link down"),
        }
    }

    /// Run every queued task.  Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.tasks.next() {
            self.run(task);
            ran += 1;
        }
        ran
    }

    pub fn scanner(&self) -> &ScanOrchestrator {
        &self.scanner
    }

    pub fn scanner_mut(&mut self) -> &mut ScanOrchestrator {
        &mut self.scanner
    }

    pub fn engine(&self) -> &CommandEngine {
        &self.engine
    }

    pub fn board(&self) -> &Board<P> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board<P> {
        &mut self.board
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    fn defer(&mut self, task: Task) {
        if let Err(e) = self.tasks.submit(task) {
            warn!("deferred queue full, task dropped: {}", e);
        }
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::Broadcast(scan) => {
                let tx = self.engine.transmitter_mut();
                match self.scanner.broadcast(&scan, tx, &mut self.board.serial) {
                    Ok(()) => self.board.watchdog.feed(),
                    Err(Error::InvalidData) => trace!("advertisement from {} filtered", scan.addr),
                    Err(e) => debug!("advertisement from {} dropped: {}", scan.addr, e),
                }
            }
            Task::ParseChunk(bytes) => {
                self.engine
                    .on_chunk(&bytes, &mut self.scanner, &mut self.board);
            }
        }
    }
}
