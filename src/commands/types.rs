//! Command and response types for the host protocol
//!
//! # Protocol Format
//!
//! All frames use COBS encoding with a zero byte delimiter:
//! ```text
//! [COBS-encoded payload][0x00]
//! ```
//!
//! The payload format (before COBS encoding):
//! ```text
//! [version: u8][id: u8][length: u16 LE][payload: [u8; length]][crc16: u16 LE]
//! ```
//!
//! - `version`: Protocol version (currently 1)
//! - `id`: Command or response identifier
//! - `length`: Payload length in bytes (little-endian)
//! - `crc16`: CRC-16-XMODEM checksum over all preceding bytes
//!
//! # CRC Calculation
//!
//! Uses CRC-16-XMODEM (polynomial 0x1021, init 0x0000) over:
//! `[version][id][length_lo][length_hi][payload...]`

use crate::radio::message::{Message, MessageText};
use crate::radio::session::ModuleVersion;
use crate::radio::settings::RadioConfig;

/// Bit 0 of the Send flags byte: append a checksum to the payload
pub const SEND_FLAG_CHECKSUM: u8 = 0x01;

/// Size of the fixed Send header ahead of the text
pub const SEND_HEADER_LEN: usize = 4;

/// Command IDs for the host protocol
///
/// Commands are sent from the host to the device. Each command has a specific
/// payload format and expected response.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
    /// Get firmware version (0x01)
    ///
    /// - Payload: None (length = 0)
    /// - Response: [`Response::Version`]
    GetVersion = 0x01,

    /// Query the transceiver status (0x02)
    ///
    /// - Payload: None (length = 0)
    /// - Response: [`Response::Ready`] once the module lists its status
    GetStatus = 0x02,

    /// Stop and start the transceiver session (0x03)
    ///
    /// - Payload: None (length = 0)
    /// - Response: [`Response::Ready`] once the module is configured again
    Restart = 0x03,

    /// Get the radio configuration in use (0x04)
    ///
    /// - Payload: None (length = 0)
    /// - Response: [`Response::Config`]
    GetConfig = 0x04,

    /// Transmit a text message (0x10)
    ///
    /// - Payload: `[flags: u8][repeat: u8][interval_ms: u16 LE][text...]`
    /// - Response: [`Response::TxComplete`] after every repeat was acknowledged
    Send = 0x10,
}

impl CommandId {
    /// Try to convert a byte to a CommandId
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::GetVersion),
            0x02 => Some(Self::GetStatus),
            0x03 => Some(Self::Restart),
            0x04 => Some(Self::GetConfig),
            0x10 => Some(Self::Send),
            _ => None,
        }
    }
}

/// Parsed command with associated data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GetVersion,
    GetStatus,
    Restart,
    GetConfig,

    /// Transmit `text`, `repeat` times, `interval_ms` apart
    Send {
        text: MessageText,
        checksum: bool,
        repeat: u8,
        interval_ms: u16,
    },
}

impl Command {
    /// Get the command ID for this command
    pub fn id(&self) -> CommandId {
        match self {
            Command::GetVersion => CommandId::GetVersion,
            Command::GetStatus => CommandId::GetStatus,
            Command::Restart => CommandId::Restart,
            Command::GetConfig => CommandId::GetConfig,
            Command::Send { .. } => CommandId::Send,
        }
    }
}

/// Response status codes
///
/// Used in [`Response::Error`] to indicate why a command failed.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Command executed successfully (0x00)
    Success = 0x00,

    /// Unknown or invalid command ID (0x01)
    InvalidCommand = 0x01,

    /// Payload length invalid for the command (0x02)
    ///
    /// Examples: non-zero payload for GetVersion, empty text for Send
    InvalidLength = 0x02,

    /// CRC-16 checksum mismatch (0x03)
    CrcError = 0x03,

    /// Protocol version not supported (0x04)
    InvalidVersion = 0x04,

    /// Payload present but malformed (0x05)
    ///
    /// Examples: zero repeat count, text that is not UTF-8
    InvalidPayload = 0x05,

    /// Transceiver rejected or mangled the operation (0x10)
    RadioError = 0x10,

    /// Transceiver did not answer in time (0x11)
    Timeout = 0x11,

    /// Transceiver session is not ready (0x12)
    NotReady = 0x12,

    /// A send repeat was not acknowledged (0x13)
    SendFailed = 0x13,
}

/// Response to a command
///
/// Responses are sent from the device to the host. They use the same frame
/// format as commands but with response IDs instead of command IDs.
///
/// # Response IDs
///
/// | ID   | Response   | Description                    |
/// |------|------------|--------------------------------|
/// | 0x01 | Version    | Firmware version               |
/// | 0x02 | Ready      | Transceiver ready + module fw  |
/// | 0x04 | Config     | Radio configuration            |
/// | 0x10 | TxComplete | Send acknowledged              |
/// | 0x11 | Message    | Received radio message         |
/// | 0xFF | Error      | Error with status code         |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Version response (ID: 0x01)
    ///
    /// Payload: `[major: u8][minor: u8][patch: u8]`
    Version { major: u8, minor: u8, patch: u8 },

    /// Transceiver ready (ID: 0x02)
    ///
    /// Payload: `[module firmware version...]`, empty if the module never answered
    Ready { module_version: ModuleVersion },

    /// Radio configuration (ID: 0x04)
    ///
    /// Payload: `[freq: u32 LE][sf: u8][bw code: u8][coding rate: u8][preamble: u16 LE][power: u8]`
    Config(RadioConfig),

    /// Send acknowledged for every repeat (ID: 0x10)
    ///
    /// Payload: None (length = 0)
    TxComplete,

    /// Received radio message (ID: 0x11) - Unsolicited
    ///
    /// Payload: `[checksummed: u8][text...]`
    Message { text: MessageText, checksummed: bool },

    /// Error response (ID: 0xFF)
    ///
    /// Payload: `[status: u8][original_command_id: u8]`
    Error {
        status: ResponseStatus,
        original_command_id: u8,
    },
}

impl Response {
    /// Create an error response for a given command
    pub fn error(status: ResponseStatus, command_id: CommandId) -> Self {
        Self::Error {
            status,
            original_command_id: command_id as u8,
        }
    }

    /// Create an error response with raw command ID (for unknown commands)
    pub fn error_raw(status: ResponseStatus, original_command_id: u8) -> Self {
        Self::Error {
            status,
            original_command_id,
        }
    }
}

impl From<Message> for Response {
    fn from(message: Message) -> Self {
        Self::Message {
            text: message.text,
            checksummed: message.checksum.is_some(),
        }
    }
}
