//! Message framing for the AT send/receive commands
//!
//! # Wire format
//!
//! Outgoing:
//! ```text
//! at+send=lorap2p:<hex payload>[<checksum digits>]\r\n
//! ```
//!
//! Incoming (unsolicited):
//! ```text
//! at+recv=<a>,<b>,<c>:<hex payload>[<checksum digits>]\r\n
//! ```
//!
//! The payload is the UTF-8 text hex encoded in lowercase. When integrity is
//! enabled, two decimal checksum digits follow the hex text; they are
//! computed over the lowercase hex encoding of the text (see
//! [`checksum`](crate::radio::checksum)), whatever case the sender used.

use crate::config::protocol::{MAX_HEX_LEN, MAX_LINE_LEN, MAX_PAYLOAD_LEN};
use crate::radio::checksum::{self, Checksum};
use crate::radio::dialect::{find_token_end, CommandSet, Rak811P2p, LINE_TERMINATOR};
use crate::radio::error::{FrameError, FramingError, IntegrityError};
use core::marker::PhantomData;
use heapless::String;

/// A complete command line, CR-LF included
pub type WireLine = String<MAX_LINE_LEN>;

/// Plaintext of one radio message
pub type MessageText = String<MAX_PAYLOAD_LEN>;

/// One radio message, built for a single send or produced by a single receive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Plaintext payload, checksum stripped
    pub text: MessageText,
    /// Checksum carried with the payload, when integrity was in use
    pub checksum: Option<Checksum>,
}

/// Encodes outgoing payloads and decodes received lines for a dialect
pub struct MessageFramer<S: CommandSet = Rak811P2p> {
    _dialect: PhantomData<S>,
}

impl<S: CommandSet> MessageFramer<S> {
    /// Create a new framer
    pub fn new() -> Self {
        Self {
            _dialect: PhantomData,
        }
    }

    /// Build the send command for `plaintext`
    ///
    /// With `checksum` set, its two digits follow the hex text; a
    /// [`Checksum::Unavailable`] goes out as the `00` sentinel.
    pub fn encode_outgoing(
        &self,
        plaintext: &str,
        checksum: Option<Checksum>,
    ) -> Result<WireLine, FramingError> {
        let payload = plaintext.as_bytes();
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FramingError::PayloadTooLarge);
        }

        let mut hex_buf = [0u8; MAX_HEX_LEN];
        let hex_len = payload.len() * 2;
        hex::encode_to_slice(payload, &mut hex_buf[..hex_len])
            .map_err(|_| FramingError::InvalidHex)?;

        let mut line = WireLine::new();
        line.push_str(S::SEND_PREFIX)
            .map_err(|_| FramingError::PayloadTooLarge)?;
        for &byte in &hex_buf[..hex_len] {
            line.push(char::from(byte))
                .map_err(|_| FramingError::PayloadTooLarge)?;
        }
        if let Some(checksum) = checksum {
            for digit in checksum.to_digits() {
                line.push(char::from(digit))
                    .map_err(|_| FramingError::PayloadTooLarge)?;
            }
        }
        line.push_str(LINE_TERMINATOR)
            .map_err(|_| FramingError::PayloadTooLarge)?;

        Ok(line)
    }

    /// Decode a received line into a message
    ///
    /// Checks, in order: the receive prefix, the colon ahead of the payload,
    /// then (with `checksum_enabled`) the sentinel, the hex body, and finally
    /// the recomputed checksum.
    pub fn decode_incoming(
        &self,
        raw_line: &str,
        checksum_enabled: bool,
    ) -> Result<Message, FrameError> {
        let raw = raw_line.as_bytes();

        if find_token_end(raw, S::RECV_PREFIX.as_bytes()).is_none() {
            return Err(FramingError::MissingPrefix.into());
        }

        let colon = raw
            .iter()
            .position(|&byte| byte == b':')
            .ok_or(FramingError::MissingDelimiter)?;
        let section = trim_line_end(&raw[colon + 1..]);

        let (hex_body, claimed) = if checksum_enabled {
            if section.len() < 2 {
                return Err(IntegrityError::Missing.into());
            }
            let (body, digits) = section.split_at(section.len() - 2);
            if digits == Checksum::SENTINEL {
                return Err(IntegrityError::Sentinel.into());
            }
            let claimed = Checksum::from_digits(digits).ok_or(IntegrityError::Missing)?;
            (body, Some(claimed))
        } else {
            (section, None)
        };

        let text = decode_hex_text(hex_body)?;

        if let Some(received) = claimed {
            let expected = checksum::compute(text.as_bytes());
            if expected != received {
                return Err(IntegrityError::Mismatch { expected, received }.into());
            }
        }

        Ok(Message {
            text,
            checksum: claimed,
        })
    }
}

impl<S: CommandSet> Default for MessageFramer<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip any trailing CR/LF left on a line
fn trim_line_end(mut bytes: &[u8]) -> &[u8] {
    while let [rest @ .., b'\r' | b'\n'] = bytes {
        bytes = rest;
    }
    bytes
}

fn decode_hex_text(hex_body: &[u8]) -> Result<MessageText, FramingError> {
    if hex_body.len() > MAX_PAYLOAD_LEN * 2 {
        return Err(FramingError::PayloadTooLarge);
    }
    if hex_body.len() % 2 != 0 {
        return Err(FramingError::InvalidHex);
    }

    let mut bytes = [0u8; MAX_PAYLOAD_LEN];
    let len = hex_body.len() / 2;
    hex::decode_to_slice(hex_body, &mut bytes[..len]).map_err(|_| FramingError::InvalidHex)?;

    let text = core::str::from_utf8(&bytes[..len]).map_err(|_| FramingError::InvalidText)?;
    let mut out = MessageText::new();
    out.push_str(text)
        .map_err(|_| FramingError::PayloadTooLarge)?;
    Ok(out)
}
