//! Deferred work queue.
//!
//! Radio and UART callbacks only record what happened; the work itself
//! (broadcasting a result, parsing received bytes) is queued here and run
//! later from the main loop, one task at a time.

use heapless::{Deque, Vec};

use crate::ble::ScanResult;
use crate::config::{RX_CHUNK_LEN, SCHED_QUEUE_SIZE};
use crate::error::Error;

/// Work deferred out of an event callback.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Task {
    /// Relay a received advertisement to the host.
    Broadcast(ScanResult),
    /// Run bytes from the host through frame reassembly.
    ParseChunk(Vec<u8, RX_CHUNK_LEN>),
}

/// Bounded FIFO of deferred tasks.
#[derive(Default)]
pub struct TaskQueue {
    queue: Deque<Task, SCHED_QUEUE_SIZE>,
}

impl TaskQueue {
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
        }
    }

    /// Queue a task.  `NoMemory` if the queue is full; the task is dropped.
    pub fn submit(&mut self, task: Task) -> Result<(), Error> {
        self.queue.push_back(task).map_err(|_| Error::NoMemory)
    }

    /// Next task in submission order.
    pub fn next(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
