//! Serial link traits for abstraction and testability
//!
//! These traits define the interface to the UART wired to the transceiver,
//! allowing the actual hardware driver to be swapped with a mock for testing.

use core::future::Future;

/// Errors that can occur during serial operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SerialError {
    /// The link could not be opened
    #[error("serial link could not be opened")]
    OpenFailed,
    /// Read error on the link
    #[error("serial read failed")]
    ReadError,
    /// Write error on the link
    #[error("serial write failed")]
    WriteError,
    /// Buffer overflow
    #[error("serial buffer overflow")]
    Overflow,
    /// The link was torn down underneath the caller
    #[error("serial link closed")]
    Closed,
}

/// Abstract half-duplex serial link
///
/// Reads never wait for data to arrive: when nothing is pending, `read`
/// returns `Ok(0)` and the caller decides whether to try again.
pub trait SerialLink {
    /// Read pending bytes into buffer
    ///
    /// Returns the number of bytes actually read, 0 if nothing is pending.
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, SerialError>>;

    /// Write all bytes from buffer
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<(), SerialError>>;

    /// Flush the write buffer
    fn flush(&mut self) -> impl Future<Output = Result<(), SerialError>>;
}

/// Opens and releases serial links
///
/// A connector hands out one link per `open` and takes it back on `release`,
/// so a session can be stopped and started again on the same peripheral.
pub trait SerialConnector {
    type Link: SerialLink;

    /// Open the link on `port` at `baud_rate`
    fn open(
        &mut self,
        port: u8,
        baud_rate: u32,
    ) -> impl Future<Output = Result<Self::Link, SerialError>>;

    /// Release a link previously returned by `open`
    fn release(&mut self, link: Self::Link) -> impl Future<Output = Result<(), SerialError>>;
}

#[cfg(test)]
pub mod mock {
    //! Mock serial link for testing

    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::string::String;
    use std::vec::Vec;

    /// One scripted outcome for a `read()` call
    #[derive(Debug, Clone)]
    enum RxEvent {
        /// Bytes delivered by the read
        Data(Vec<u8>),
        /// A read that finds nothing pending
        Gap,
    }

    #[derive(Default)]
    struct MockLinkState {
        rx: VecDeque<RxEvent>,
        /// Reply batches released one per written command line
        replies: VecDeque<Vec<RxEvent>>,
        tx: Vec<u8>,
        next_read_error: Option<SerialError>,
        next_write_error: Option<SerialError>,
        reads: usize,
    }

    /// Mock serial link for unit testing
    ///
    /// Clones share state, so a test keeps one handle while the session owns
    /// another.
    #[derive(Clone, Default)]
    pub struct MockSerialLink {
        state: Rc<RefCell<MockLinkState>>,
    }

    impl MockSerialLink {
        /// Create a new mock link
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue bytes to be returned by a future read()
        pub fn queue_rx_data(&self, data: &[u8]) {
            self.state
                .borrow_mut()
                .rx
                .push_back(RxEvent::Data(data.to_vec()));
        }

        /// Queue a read that finds nothing pending
        pub fn queue_gap(&self) {
            self.state.borrow_mut().rx.push_back(RxEvent::Gap);
        }

        /// Script the lines the device answers to the next command written
        pub fn reply(&self, lines: &[&str]) {
            let batch = lines
                .iter()
                .map(|line| RxEvent::Data(line.as_bytes().to_vec()))
                .collect();
            self.state.borrow_mut().replies.push_back(batch);
        }

        /// Script an answer with gaps in front of each line
        pub fn reply_after_gaps(&self, gaps: usize, lines: &[&str]) {
            let mut batch = Vec::new();
            for line in lines {
                batch.extend(std::iter::repeat(RxEvent::Gap).take(gaps));
                batch.push(RxEvent::Data(line.as_bytes().to_vec()));
            }
            self.state.borrow_mut().replies.push_back(batch);
        }

        /// Script no answer at all to the next command written
        pub fn reply_silence(&self) {
            self.state.borrow_mut().replies.push_back(Vec::new());
        }

        /// Everything written so far, split into CR-LF terminated lines
        pub fn written_lines(&self) -> Vec<String> {
            let state = self.state.borrow();
            String::from_utf8_lossy(&state.tx)
                .split_terminator("\r\n")
                .map(String::from)
                .collect()
        }

        /// Number of live handles sharing this link's state
        pub fn handle_count(&self) -> usize {
            Rc::strong_count(&self.state)
        }

        /// Number of read() calls made
        pub fn read_count(&self) -> usize {
            self.state.borrow().reads
        }

        /// Set an error to be returned by the next read() call
        pub fn set_next_read_error(&self, error: SerialError) {
            self.state.borrow_mut().next_read_error = Some(error);
        }

        /// Set an error to be returned by the next write() call
        pub fn set_next_write_error(&self, error: SerialError) {
            self.state.borrow_mut().next_write_error = Some(error);
        }
    }

    impl SerialLink for MockSerialLink {
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
            let mut state = self.state.borrow_mut();
            state.reads += 1;

            if let Some(error) = state.next_read_error.take() {
                return Err(error);
            }

            match state.rx.pop_front() {
                None | Some(RxEvent::Gap) => Ok(0),
                Some(RxEvent::Data(mut data)) => {
                    let count = core::cmp::min(buf.len(), data.len());
                    buf[..count].copy_from_slice(&data[..count]);
                    if count < data.len() {
                        let rest = data.split_off(count);
                        state.rx.push_front(RxEvent::Data(rest));
                    }
                    Ok(count)
                }
            }
        }

        async fn write(&mut self, data: &[u8]) -> Result<(), SerialError> {
            let mut state = self.state.borrow_mut();

            if let Some(error) = state.next_write_error.take() {
                return Err(error);
            }

            state.tx.extend_from_slice(data);

            // Every completed command line releases the next scripted reply
            for _ in data.iter().filter(|&&byte| byte == b'\n') {
                if let Some(batch) = state.replies.pop_front() {
                    state.rx.extend(batch);
                }
            }

            Ok(())
        }

        async fn flush(&mut self) -> Result<(), SerialError> {
            Ok(())
        }
    }

    /// Mock connector handing out clones of one shared mock link
    #[derive(Clone, Default)]
    pub struct MockConnector {
        link: MockSerialLink,
        opened: Rc<Cell<usize>>,
        released: Rc<Cell<usize>>,
        last_open: Rc<Cell<Option<(u8, u32)>>>,
        next_open_error: Rc<Cell<Option<SerialError>>>,
        next_release_error: Rc<Cell<Option<SerialError>>>,
    }

    impl MockConnector {
        /// Create a connector for the given link
        pub fn new(link: MockSerialLink) -> Self {
            Self {
                link,
                ..Self::default()
            }
        }

        /// Number of successful open() calls
        pub fn open_count(&self) -> usize {
            self.opened.get()
        }

        /// Number of release() calls
        pub fn release_count(&self) -> usize {
            self.released.get()
        }

        /// Port and baud rate of the last open() call
        pub fn last_open(&self) -> Option<(u8, u32)> {
            self.last_open.get()
        }

        /// Set an error to be returned by the next open() call
        pub fn set_next_open_error(&self, error: SerialError) {
            self.next_open_error.set(Some(error));
        }

        /// Set an error to be returned by the next release() call
        pub fn set_next_release_error(&self, error: SerialError) {
            self.next_release_error.set(Some(error));
        }
    }

    impl SerialConnector for MockConnector {
        type Link = MockSerialLink;

        async fn open(&mut self, port: u8, baud_rate: u32) -> Result<MockSerialLink, SerialError> {
            self.last_open.set(Some((port, baud_rate)));
            if let Some(error) = self.next_open_error.take() {
                return Err(error);
            }
            self.opened.set(self.opened.get() + 1);
            Ok(self.link.clone())
        }

        async fn release(&mut self, _link: MockSerialLink) -> Result<(), SerialError> {
            self.released.set(self.released.get() + 1);
            match self.next_release_error.take() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_mock_read_nothing_pending() {
            let mut link = MockSerialLink::new();

            futures::executor::block_on(async {
                let mut buf = [0u8; 8];
                assert_eq!(link.read(&mut buf).await, Ok(0));
            });
        }

        #[test]
        fn test_mock_partial_read() {
            let mut link = MockSerialLink::new();

            futures::executor::block_on(async {
                link.queue_rx_data(&[0x01, 0x02, 0x03, 0x04, 0x05]);

                let mut buf = [0u8; 2];
                assert_eq!(link.read(&mut buf).await, Ok(2));
                assert_eq!(&buf, &[0x01, 0x02]);

                let mut buf = [0u8; 10];
                assert_eq!(link.read(&mut buf).await, Ok(3));
                assert_eq!(&buf[..3], &[0x03, 0x04, 0x05]);
            });
        }

        #[test]
        fn test_mock_reply_released_by_command_line() {
            let mut link = MockSerialLink::new();

            futures::executor::block_on(async {
                link.reply(&["OK\r\n"]);

                let mut buf = [0u8; 8];
                assert_eq!(link.read(&mut buf).await, Ok(0));

                link.write(b"at+version\r\n").await.unwrap();
                assert_eq!(link.read(&mut buf).await, Ok(4));
                assert_eq!(&buf[..4], b"OK\r\n");
                assert_eq!(link.written_lines(), vec!["at+version".to_string()]);
            });
        }

        #[test]
        fn test_mock_read_error_cleared() {
            let mut link = MockSerialLink::new();

            futures::executor::block_on(async {
                link.set_next_read_error(SerialError::ReadError);

                let mut buf = [0u8; 4];
                assert_eq!(link.read(&mut buf).await, Err(SerialError::ReadError));

                link.queue_rx_data(&[0x01]);
                assert_eq!(link.read(&mut buf).await, Ok(1));
            });
        }
    }
}
