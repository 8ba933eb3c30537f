//! Frame reassembly across UART reads.
//!
//! The UART hands us whatever the DMA buffer held when the line went
//! idle, so one frame can arrive in several pieces.  Pieces that do not
//! decode on their own are carried over in a small ring buffer until the
//! rest shows up.  One read can also hold several frames back to back.

use heapless::Vec;

use crate::config::{REASSEMBLY_CAPACITY, SCRATCH_CAPACITY};
use crate::protocol::{self, Command, HEADER_LEN, TRAILER_LEN};

/// Fixed-capacity byte ring.  `N` must be a power of two.
pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    /// Next slot to read (free-running).
    head: usize,
    /// Next slot to write (free-running).
    tail: usize,
}

impl<const N: usize> RingBuffer<N> {
    const MASK: usize = {
        assert!(N.is_power_of_two());
        N - 1
    };

    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            head: 0,
            tail: 0,
        }
    }

    /// Append one byte.  Refused (and handed back) when the ring is full.
    pub fn push(&mut self, byte: u8) -> Result<(), u8> {
        if self.is_full() {
            return Err(byte);
        }
        self.buf[self.tail & Self::MASK] = byte;
        self.tail = self.tail.wrapping_add(1);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.buf[self.head & Self::MASK];
        self.head = self.head.wrapping_add(1);
        Some(byte)
    }

    pub fn len(&self) -> usize {
        self.tail.wrapping_sub(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Drop everything buffered.
    pub fn clear(&mut self) {
        self.head = self.tail;
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Most commands one `feed` can return: a scratch buffer full of the
/// shortest frames.
pub const MAX_FRAMES_PER_FEED: usize = SCRATCH_CAPACITY / (HEADER_LEN + TRAILER_LEN);

/// Commands completed by one chunk, in arrival order.
pub type Commands = Vec<Command, MAX_FRAMES_PER_FEED>;

/// Decode every frame in `bytes`, skipping bytes that do not start one.
///
/// Returns the offset just past the last decoded frame.
fn extract(bytes: &[u8], out: &mut Commands) -> usize {
    let mut pos = 0;
    let mut consumed = 0;
    while pos < bytes.len() {
        match protocol::decode_prefix(&bytes[pos..]) {
            Ok((cmd, len)) => {
                if out.push(cmd).is_err() {
                    // The rest stays for the next feed.
                    break;
                }
                pos += len;
                consumed = pos;
            }
            Err(_) => pos += 1,
        }
    }
    consumed
}

/// Turns a stream of chunks into decoded commands.
#[derive(Default)]
pub struct Reassembler {
    carry: RingBuffer<REASSEMBLY_CAPACITY>,
}

impl Reassembler {
    pub const fn new() -> Self {
        Self {
            carry: RingBuffer::new(),
        }
    }

    /// Feed one received chunk, returning every command it completes.
    ///
    /// Frames found in the chunk on its own win and discard any
    /// carry-over.  Otherwise the chunk is appended to the carry-over and
    /// the whole carry-over is searched; if that finds nothing either the
    /// bytes stay buffered, in order, for the next chunk.  Bytes after the
    /// last decoded frame are kept as the start of the next one.
    pub fn feed(&mut self, chunk: &[u8]) -> Commands {
        let mut commands = Commands::new();
        let used = extract(chunk, &mut commands);
        if !commands.is_empty() {
            if !self.carry.is_empty() {
                debug!("discarding {} stale carry-over bytes", self.carry.len());
                self.carry.clear();
            }
            self.carry_over(&chunk[used..]);
            return commands;
        }

        trace!("chunk ({} bytes) holds no complete frame", chunk.len());
        self.carry_over(chunk);

        // The scratch holds the largest frame; anything older cannot
        // belong to a decodable frame.
        while self.carry.len() > SCRATCH_CAPACITY {
            let _ = self.carry.pop();
        }

        let mut scratch: Vec<u8, SCRATCH_CAPACITY> = Vec::new();
        while let Some(byte) = self.carry.pop() {
            // Cannot fail: the ring was trimmed to the scratch capacity.
            let _ = scratch.push(byte);
        }

        let used = extract(&scratch, &mut commands);
        if commands.is_empty() {
            debug!("carry-over ({} bytes) incomplete", scratch.len());
            self.carry_over(&scratch);
        } else {
            self.carry_over(&scratch[used..]);
        }
        commands
    }

    /// Append to the carry-over, dropping what does not fit.
    fn carry_over(&mut self, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            if self.carry.push(byte).is_err() {
                warn!("carry-over full, dropped {} bytes", bytes.len() - i);
                break;
            }
        }
    }

    /// Bytes currently carried over.
    pub fn buffered(&self) -> usize {
        self.carry.len()
    }
}
