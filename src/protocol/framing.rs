//! Delimiter-based frame accumulation
//!
//! Both serial protocols are delimiter-terminated: host frames end in a
//! zero byte (COBS), transceiver lines end in `\n`. The accumulator buffers
//! bytes until the delimiter arrives and hands back the completed frame.

use crate::config::protocol::{FRAME_DELIMITER, LINE_DELIMITER, MAX_FRAME_SIZE, MAX_LINE_LEN};
use heapless::Vec;

/// Accumulates incoming bytes and extracts complete delimited frames.
///
/// A frame longer than `N` is discarded in full: bytes are dropped until the
/// next delimiter so that the tail of an oversized frame never surfaces as a
/// frame of its own.
pub struct DelimitedAccumulator<const N: usize> {
    buffer: Vec<u8, N>,
    delimiter: u8,
    overflowed: bool,
}

/// Accumulator for zero-delimited COBS frames from the host
pub type FrameAccumulator = DelimitedAccumulator<MAX_FRAME_SIZE>;

/// Accumulator for `\n`-terminated lines from the transceiver
pub type LineAccumulator = DelimitedAccumulator<MAX_LINE_LEN>;

impl FrameAccumulator {
    /// Create an accumulator for COBS frames.
    pub fn frames() -> Self {
        Self::new(FRAME_DELIMITER)
    }
}

impl LineAccumulator {
    /// Create an accumulator for AT response lines.
    pub fn lines() -> Self {
        Self::new(LINE_DELIMITER)
    }
}

impl<const N: usize> DelimitedAccumulator<N> {
    /// Create a new empty accumulator splitting on `delimiter`.
    pub fn new(delimiter: u8) -> Self {
        Self {
            buffer: Vec::new(),
            delimiter,
            overflowed: false,
        }
    }

    /// Push a byte into the accumulator.
    ///
    /// Returns `Some(frame)` when a complete frame is detected (delimiter received).
    /// Returns `None` if more bytes are needed, if the frame was empty, or if
    /// the frame overflowed the buffer.
    pub fn push(&mut self, byte: u8) -> Option<Vec<u8, N>> {
        if byte == self.delimiter {
            if core::mem::take(&mut self.overflowed) {
                log::warn!("discarding oversized frame");
                self.buffer.clear();
                return None;
            }

            if self.buffer.is_empty() {
                // Empty frame or leading delimiter, ignore
                return None;
            }

            return Some(core::mem::take(&mut self.buffer));
        }

        if self.overflowed {
            return None;
        }

        if self.buffer.push(byte).is_err() {
            self.buffer.clear();
            self.overflowed = true;
        }

        None
    }

    /// Reset the accumulator, discarding any partial frame.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Returns true if the buffer is empty (no partial frame in progress).
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the current number of bytes in the buffer.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::frames()
    }
}
