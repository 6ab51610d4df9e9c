//! Error types for the transceiver driver.
//!
//! Every fallible driver operation returns one of these; nothing is retried
//! behind the caller's back beyond the attempt budget of a single poll.

use crate::radio::checksum::Checksum;
use crate::radio::session::SessionState;
use crate::serial::traits::SerialError;

/// A received line or outgoing payload does not fit the message envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FramingError {
    /// The line does not carry the received-message prefix
    #[error("missing receive prefix")]
    MissingPrefix,
    /// No colon separates the header from the payload
    #[error("missing payload delimiter")]
    MissingDelimiter,
    /// The payload section is not valid hex
    #[error("payload is not valid hex")]
    InvalidHex,
    /// The decoded payload is not valid UTF-8
    #[error("payload is not valid UTF-8")]
    InvalidText,
    /// The payload exceeds the maximum message size
    #[error("payload too large")]
    PayloadTooLarge,
}

/// A payload failed its checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// The sender marked the payload with the "00" sentinel
    #[error("sender flagged checksum as unavailable")]
    Sentinel,
    /// Checksum expected but the payload is too short to carry one
    #[error("checksum missing")]
    Missing,
    /// Recomputed checksum differs from the received one
    #[error("checksum mismatch: computed {expected}, received {received}")]
    Mismatch {
        expected: Checksum,
        received: Checksum,
    },
}

/// Failure to encode or decode a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),
    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),
}

/// Errors reported by [`DeviceSession`](crate::radio::session::DeviceSession) operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No answer within budget to a control command
    #[error("module did not answer")]
    LinkUnresponsive,
    /// The module did not acknowledge the switch to P2P mode
    #[error("mode switch not acknowledged")]
    ModeSwitchFailed,
    /// The module did not acknowledge the radio configuration
    #[error("radio configuration rejected")]
    ConfigRejected,
    /// Repeat `iteration` (1-based) of a send was not acknowledged
    #[error("send not acknowledged on repeat {iteration}")]
    SendFailed { iteration: u8 },
    #[error("framing error: {0}")]
    Framing(FramingError),
    #[error("integrity error: {0}")]
    Integrity(IntegrityError),
    /// Operation attempted without an open link
    #[error("serial handle closed")]
    HandleClosed,
    /// Operation not legal in the current state
    #[error("session not ready (state {0:?})")]
    NotReady(SessionState),
    /// `start()` called on a session that is not closed
    #[error("session already started")]
    AlreadyStarted,
    /// No complete line was pending on the link
    #[error("no message pending")]
    NoMessage,
    /// Hard error from the serial link
    #[error("serial link error: {0}")]
    Link(#[from] SerialError),
}

impl From<FrameError> for SessionError {
    fn from(error: FrameError) -> Self {
        match error {
            FrameError::Framing(e) => SessionError::Framing(e),
            FrameError::Integrity(e) => SessionError::Integrity(e),
        }
    }
}

/// A convenience `Result` alias for session operations.
pub type Result<T> = core::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_maps_into_session_error() {
        let e: SessionError = FrameError::from(IntegrityError::Sentinel).into();
        assert_eq!(e, SessionError::Integrity(IntegrityError::Sentinel));

        let e: SessionError = FrameError::from(FramingError::MissingPrefix).into();
        assert_eq!(e, SessionError::Framing(FramingError::MissingPrefix));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            SessionError::SendFailed { iteration: 2 }.to_string(),
            "send not acknowledged on repeat 2"
        );
        assert_eq!(
            IntegrityError::Mismatch {
                expected: Checksum::Valid(42),
                received: Checksum::Valid(7),
            }
            .to_string(),
            "checksum mismatch: computed 42, received 07"
        );
        assert_eq!(
            SessionError::Link(SerialError::WriteError).to_string(),
            "serial link error: serial write failed"
        );
    }
}
