//! Command parser for host frames
//!
//! Parses binary protocol frames into Command structs.

use crate::commands::serialiser::cobs_decode;
use crate::commands::types::{
    Command, CommandId, Response, ResponseStatus, SEND_FLAG_CHECKSUM, SEND_HEADER_LEN,
};
use crate::config::protocol::{MAX_PAYLOAD_LEN, PROTOCOL_VERSION};
use crate::radio::message::MessageText;
use crc::{Crc, CRC_16_XMODEM};

const CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Parser for binary protocol commands
pub struct CommandParser;

impl CommandParser {
    /// Create a new command parser
    pub fn new() -> Self {
        Self
    }

    /// Decode one delimited COBS frame and parse it
    ///
    /// `frame` is the frame body with its zero delimiter stripped. Returns
    /// `None` for frames too damaged to answer (bad COBS, no command byte);
    /// otherwise the command, or the error response to send back.
    pub fn parse_frame(&self, frame: &[u8]) -> Option<Result<Command, Response>> {
        let decoded = match cobs_decode(frame) {
            Some(decoded) => decoded,
            None => {
                log::debug!("dropping frame with invalid COBS encoding");
                return None;
            }
        };

        let command_id = *decoded.get(1)?;
        Some(
            self.parse(&decoded)
                .map_err(|status| Response::error_raw(status, command_id)),
        )
    }

    /// Parse a COBS-decoded frame into a command
    ///
    /// Frame format: [version: u8][cmd_id: u8][length: u16 LE][payload][crc16: u16 LE]
    /// Minimum frame size: 1 (ver) + 1 (cmd) + 2 (length) + 0 (payload) + 2 (crc) = 6 bytes
    pub fn parse(&self, data: &[u8]) -> Result<Command, ResponseStatus> {
        if data.len() < 6 {
            return Err(ResponseStatus::InvalidLength);
        }

        let version = data[0];
        let command_id_byte = data[1];
        let length = u16::from_le_bytes([data[2], data[3]]) as usize;

        if version != PROTOCOL_VERSION {
            return Err(ResponseStatus::InvalidVersion);
        }

        let expected_len = 4 + length + 2;
        if data.len() < expected_len {
            return Err(ResponseStatus::InvalidLength);
        }

        let payload = &data[4..4 + length];
        let received_crc = u16::from_le_bytes([data[4 + length], data[5 + length]]);

        // CRC covers version + command_id + length + payload
        let calculated_crc = Self::calculate_crc(&data[..4 + length]);
        if calculated_crc != received_crc {
            return Err(ResponseStatus::CrcError);
        }

        let command = match CommandId::from_byte(command_id_byte) {
            Some(CommandId::GetVersion) => Self::bare(payload, Command::GetVersion)?,
            Some(CommandId::GetStatus) => Self::bare(payload, Command::GetStatus)?,
            Some(CommandId::Restart) => Self::bare(payload, Command::Restart)?,
            Some(CommandId::GetConfig) => Self::bare(payload, Command::GetConfig)?,
            Some(CommandId::Send) => Self::parse_send(payload)?,
            None => return Err(ResponseStatus::InvalidCommand),
        };
        Ok(command)
    }

    fn bare(payload: &[u8], command: Command) -> Result<Command, ResponseStatus> {
        if !payload.is_empty() {
            return Err(ResponseStatus::InvalidLength);
        }
        Ok(command)
    }

    /// Send payload: `[flags][repeat][interval_ms u16 LE][text...]`
    fn parse_send(payload: &[u8]) -> Result<Command, ResponseStatus> {
        if payload.len() <= SEND_HEADER_LEN || payload.len() > SEND_HEADER_LEN + MAX_PAYLOAD_LEN {
            return Err(ResponseStatus::InvalidLength);
        }

        let flags = payload[0];
        let repeat = payload[1];
        let interval_ms = u16::from_le_bytes([payload[2], payload[3]]);

        if flags & !SEND_FLAG_CHECKSUM != 0 || repeat == 0 {
            return Err(ResponseStatus::InvalidPayload);
        }

        let text = core::str::from_utf8(&payload[SEND_HEADER_LEN..])
            .map_err(|_| ResponseStatus::InvalidPayload)?;
        let mut message = MessageText::new();
        message
            .push_str(text)
            .map_err(|_| ResponseStatus::InvalidLength)?;

        Ok(Command::Send {
            text: message,
            checksum: flags & SEND_FLAG_CHECKSUM != 0,
            repeat,
            interval_ms,
        })
    }

    /// Calculate CRC-16-XMODEM
    fn calculate_crc(data: &[u8]) -> u16 {
        CRC.checksum(data)
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculate CRC-16-XMODEM for external use (e.g., building response frames)
pub fn calculate_crc(data: &[u8]) -> u16 {
    CommandParser::calculate_crc(data)
}
