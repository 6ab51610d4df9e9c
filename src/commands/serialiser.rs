//! Response serialiser with COBS encoding
//!
//! Serialises Response structs into COBS-encoded frames for transmission.

use crate::commands::parser::calculate_crc;
use crate::commands::types::Response;
use crate::config::protocol::{MAX_FRAME_SIZE, PROTOCOL_VERSION};
use heapless::Vec;

/// Response IDs (mirrors command IDs for responses)
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum ResponseId {
    Version = 0x01,
    Ready = 0x02,
    Config = 0x04,
    TxComplete = 0x10,
    Message = 0x11,
    Error = 0xFF,
}

/// Serialiser for response frames
pub struct ResponseSerialiser;

impl ResponseSerialiser {
    /// Create a new response serialiser
    pub fn new() -> Self {
        Self
    }

    /// Serialise a response to a COBS-encoded frame
    ///
    /// Returns the complete frame including COBS encoding and zero delimiter.
    pub fn serialise(&self, response: &Response) -> Vec<u8, MAX_FRAME_SIZE> {
        let raw = self.build_raw_frame(response);
        cobs_encode(&raw)
    }

    /// Build the raw (unencoded) frame with CRC
    ///
    /// Frame format: [version: u8][resp_id: u8][length: u16 LE][payload][crc16: u16 LE]
    fn build_raw_frame(&self, response: &Response) -> Vec<u8, MAX_FRAME_SIZE> {
        let mut payload: Vec<u8, MAX_FRAME_SIZE> = Vec::new();

        let id = match response {
            Response::Version {
                major,
                minor,
                patch,
            } => {
                let _ = payload.extend_from_slice(&[*major, *minor, *patch]);
                ResponseId::Version
            }
            Response::Ready { module_version } => {
                let _ = payload.extend_from_slice(module_version.as_bytes());
                ResponseId::Ready
            }
            Response::Config(config) => {
                let _ = payload.extend_from_slice(&config.frequency_hz.to_le_bytes());
                let _ = payload.push(config.spreading_factor);
                let _ = payload.push(config.bandwidth.code());
                let _ = payload.push(config.coding_rate);
                let _ = payload.extend_from_slice(&config.preamble_len.to_le_bytes());
                let _ = payload.push(config.tx_power_dbm);
                ResponseId::Config
            }
            Response::TxComplete => ResponseId::TxComplete,
            Response::Message { text, checksummed } => {
                let _ = payload.push(u8::from(*checksummed));
                let _ = payload.extend_from_slice(text.as_bytes());
                ResponseId::Message
            }
            Response::Error {
                status,
                original_command_id,
            } => {
                let _ = payload.push(*status as u8);
                let _ = payload.push(*original_command_id);
                ResponseId::Error
            }
        };

        let mut frame: Vec<u8, MAX_FRAME_SIZE> = Vec::new();
        let _ = frame.push(PROTOCOL_VERSION);
        let _ = frame.push(id as u8);
        let _ = frame.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        let _ = frame.extend_from_slice(&payload);

        let crc = calculate_crc(&frame);
        let _ = frame.extend_from_slice(&crc.to_le_bytes());

        frame
    }
}

impl Default for ResponseSerialiser {
    fn default() -> Self {
        Self::new()
    }
}

/// COBS encode a buffer using corncobs, zero delimiter included
fn cobs_encode(data: &[u8]) -> Vec<u8, MAX_FRAME_SIZE> {
    let mut output: Vec<u8, MAX_FRAME_SIZE> = Vec::new();
    output.resize(corncobs::max_encoded_len(data.len()), 0).ok();
    let len = corncobs::encode_buf(data, &mut output);
    output.truncate(len);
    output
}

/// COBS decode a frame whose zero delimiter was already stripped
pub fn cobs_decode(frame: &[u8]) -> Option<Vec<u8, MAX_FRAME_SIZE>> {
    // corncobs expects the delimiter
    let mut encoded: Vec<u8, { MAX_FRAME_SIZE + 1 }> = Vec::new();
    encoded.extend_from_slice(frame).ok()?;
    encoded.push(0x00).ok()?;

    let mut output: Vec<u8, MAX_FRAME_SIZE> = Vec::new();
    output.resize(frame.len(), 0).ok()?;
    let len = corncobs::decode_buf(&encoded, &mut output).ok()?;
    output.truncate(len);
    Some(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::{CommandId, ResponseStatus};
    use crate::config::protocol::FRAME_DELIMITER;
    use crate::radio::message::MessageText;
    use crate::radio::session::ModuleVersion;
    use crate::radio::settings::RadioConfig;

    fn decode(encoded: &[u8]) -> Vec<u8, MAX_FRAME_SIZE> {
        assert_eq!(encoded[encoded.len() - 1], FRAME_DELIMITER);
        cobs_decode(&encoded[..encoded.len() - 1]).expect("Should decode")
    }

    #[test]
    fn test_serialise_version() {
        let serialiser = ResponseSerialiser::new();
        let response = Response::Version {
            major: 0,
            minor: 1,
            patch: 0,
        };

        let decoded = decode(&serialiser.serialise(&response));

        // [version][resp_id][length LE][major][minor][patch][crc LE]
        assert_eq!(decoded[0], PROTOCOL_VERSION);
        assert_eq!(decoded[1], ResponseId::Version as u8);
        assert_eq!(&decoded[2..4], &[3, 0]);
        assert_eq!(&decoded[4..7], &[0, 1, 0]);
        assert_eq!(decoded.len(), 9);
    }

    #[test]
    fn test_serialise_ready() {
        let serialiser = ResponseSerialiser::new();
        let mut module_version = ModuleVersion::new();
        module_version.push_str("V3.0.0.14.H").unwrap();

        let decoded = decode(&serialiser.serialise(&Response::Ready { module_version }));

        assert_eq!(decoded[1], ResponseId::Ready as u8);
        assert_eq!(&decoded[2..4], &[11, 0]);
        assert_eq!(&decoded[4..15], b"V3.0.0.14.H");

        let decoded = decode(&serialiser.serialise(&Response::Ready {
            module_version: ModuleVersion::new(),
        }));
        assert_eq!(&decoded[2..4], &[0, 0]);
    }

    #[test]
    fn test_serialise_config() {
        let serialiser = ResponseSerialiser::new();
        let config = RadioConfig {
            frequency_hz: 868_100_000,
            ..RadioConfig::default()
        };

        let decoded = decode(&serialiser.serialise(&Response::Config(config)));

        assert_eq!(decoded[1], ResponseId::Config as u8);
        assert_eq!(u16::from_le_bytes([decoded[2], decoded[3]]), 10);
        assert_eq!(
            u32::from_le_bytes([decoded[4], decoded[5], decoded[6], decoded[7]]),
            868_100_000
        );
        // sf, bandwidth code, coding rate, preamble LE, power
        assert_eq!(&decoded[8..14], &[7, 0, 1, 5, 0, 5]);
    }

    #[test]
    fn test_serialise_message() {
        let serialiser = ResponseSerialiser::new();
        let mut text = MessageText::new();
        text.push_str("Hello").unwrap();

        let decoded = decode(&serialiser.serialise(&Response::Message {
            text,
            checksummed: true,
        }));

        assert_eq!(decoded[1], ResponseId::Message as u8);
        assert_eq!(u16::from_le_bytes([decoded[2], decoded[3]]), 6);
        assert_eq!(decoded[4], 1);
        assert_eq!(&decoded[5..10], b"Hello");
    }

    #[test]
    fn test_serialise_error() {
        let serialiser = ResponseSerialiser::new();
        let response = Response::error(ResponseStatus::SendFailed, CommandId::Send);

        let decoded = decode(&serialiser.serialise(&response));

        // [version][resp_id][length LE][status][cmd_id][crc LE]
        assert_eq!(decoded[1], ResponseId::Error as u8);
        assert_eq!(decoded[4], ResponseStatus::SendFailed as u8);
        assert_eq!(decoded[5], CommandId::Send as u8);
    }

    #[test]
    fn test_crc_trails_frame() {
        let serialiser = ResponseSerialiser::new();
        let decoded = decode(&serialiser.serialise(&Response::TxComplete));

        let (body, crc) = decoded.split_at(decoded.len() - 2);
        assert_eq!(calculate_crc(body).to_le_bytes(), [crc[0], crc[1]]);
    }

    #[test]
    fn test_cobs_encoding_has_no_inner_zeros() {
        let data_with_zeros = [0x01, 0x00, 0x02, 0x00, 0x03];
        let encoded = cobs_encode(&data_with_zeros);

        assert_eq!(encoded[encoded.len() - 1], 0x00, "Should end with zero");
        for &byte in &encoded[..encoded.len() - 1] {
            assert_ne!(byte, 0, "COBS encoded data should not contain zeros");
        }

        assert_eq!(decode(&encoded).as_slice(), &data_with_zeros);
    }
}
