//! Line reader for the AT dialect
//!
//! Pulls whatever bytes the link has pending, assembles them into CR-LF
//! terminated lines and hands back one line per call.

use crate::config::protocol::{MAX_LINE_LEN, READ_CHUNK};
use crate::protocol::framing::LineAccumulator;
use crate::serial::traits::{SerialError, SerialLink};
use heapless::{Deque, Vec};

/// One response line with the trailing CR-LF stripped
pub type Line = Vec<u8, MAX_LINE_LEN>;

/// Serial line reader
///
/// Bytes read past the end of a line are kept for the next call, so several
/// lines arriving in one read are returned one at a time.
pub struct LineReader {
    accumulator: LineAccumulator,
    backlog: Deque<u8, READ_CHUNK>,
}

impl LineReader {
    /// Create a new line reader
    pub fn new() -> Self {
        Self {
            accumulator: LineAccumulator::lines(),
            backlog: Deque::new(),
        }
    }

    /// Return the next complete line, or `None` if the link has no full line pending
    ///
    /// Never waits for data: an idle link yields `Ok(None)` immediately.
    pub async fn try_read_line<S: SerialLink>(
        &mut self,
        link: &mut S,
    ) -> Result<Option<Line>, SerialError> {
        loop {
            while let Some(byte) = self.backlog.pop_front() {
                if let Some(mut line) = self.accumulator.push(byte) {
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    if !line.is_empty() {
                        return Ok(Some(line));
                    }
                }
            }

            let mut read_buf = [0u8; READ_CHUNK];
            let bytes_read = link.read(&mut read_buf).await?;
            if bytes_read == 0 {
                return Ok(None);
            }

            // Backlog is drained at this point, so a full chunk always fits
            for &byte in &read_buf[..bytes_read] {
                self.backlog
                    .push_back(byte)
                    .map_err(|_| SerialError::Overflow)?;
            }
        }
    }

    /// Reset the reader state, discarding any partial line
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.backlog.clear();
    }
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::traits::mock::MockSerialLink;

    #[test]
    fn test_idle_link_yields_none() {
        let mut reader = LineReader::new();
        let mut link = MockSerialLink::new();

        futures::executor::block_on(async {
            assert_eq!(reader.try_read_line(&mut link).await, Ok(None));
        });
    }

    #[test]
    fn test_line_stripped_of_crlf() {
        let mut reader = LineReader::new();
        let mut link = MockSerialLink::new();

        futures::executor::block_on(async {
            link.queue_rx_data(b"OK V3.0.0.14.H\r\n");

            let line = reader.try_read_line(&mut link).await.unwrap().unwrap();
            assert_eq!(line.as_slice(), b"OK V3.0.0.14.H");
        });
    }

    #[test]
    fn test_several_lines_in_one_read() {
        let mut reader = LineReader::new();
        let mut link = MockSerialLink::new();

        futures::executor::block_on(async {
            link.queue_rx_data(b"Work Mode: LoRaP2P\r\nList End\r\n");

            let first = reader.try_read_line(&mut link).await.unwrap().unwrap();
            assert_eq!(first.as_slice(), b"Work Mode: LoRaP2P");

            let second = reader.try_read_line(&mut link).await.unwrap().unwrap();
            assert_eq!(second.as_slice(), b"List End");

            assert_eq!(reader.try_read_line(&mut link).await, Ok(None));
        });
    }

    #[test]
    fn test_line_split_across_reads() {
        let mut reader = LineReader::new();
        let mut link = MockSerialLink::new();

        futures::executor::block_on(async {
            link.queue_rx_data(b"at+recv=0,0,0:");
            link.queue_gap();
            link.queue_rx_data(b"41\r\n");

            // First half arrives, then the link goes quiet
            assert_eq!(reader.try_read_line(&mut link).await, Ok(None));

            let line = reader.try_read_line(&mut link).await.unwrap().unwrap();
            assert_eq!(line.as_slice(), b"at+recv=0,0,0:41");
        });
    }

    #[test]
    fn test_blank_lines_skipped() {
        let mut reader = LineReader::new();
        let mut link = MockSerialLink::new();

        futures::executor::block_on(async {
            link.queue_rx_data(b"\r\n\r\nOK\r\n");

            let line = reader.try_read_line(&mut link).await.unwrap().unwrap();
            assert_eq!(line.as_slice(), b"OK");
        });
    }

    #[test]
    fn test_read_error_propagates() {
        let mut reader = LineReader::new();
        let mut link = MockSerialLink::new();

        futures::executor::block_on(async {
            link.set_next_read_error(SerialError::ReadError);
            assert_eq!(
                reader.try_read_line(&mut link).await,
                Err(SerialError::ReadError)
            );
        });
    }

    #[test]
    fn test_reset_discards_partial_line() {
        let mut reader = LineReader::new();
        let mut link = MockSerialLink::new();

        futures::executor::block_on(async {
            link.queue_rx_data(b"garbage");
            assert_eq!(reader.try_read_line(&mut link).await, Ok(None));

            reader.reset();
            link.queue_rx_data(b"OK\r\n");
            let line = reader.try_read_line(&mut link).await.unwrap().unwrap();
            assert_eq!(line.as_slice(), b"OK");
        });
    }
}
