//! AT command dialects
//!
//! A [`CommandSet`] names the command strings and success tokens a firmware
//! family understands. The session is generic over it, so a different AT
//! firmware only needs a new set of constants.

/// Line terminator appended to every command
pub const LINE_TERMINATOR: &str = "\r\n";

/// Command strings and response tokens of one AT firmware dialect
///
/// Commands are given without the trailing CR-LF.
pub trait CommandSet {
    /// Query the firmware version
    const VERSION_QUERY: &'static str;
    /// Switch the module into point-to-point mode
    const MODE_SWITCH: &'static str;
    /// Prefix of the radio configuration command, followed by the config fragment
    const CONFIG_PREFIX: &'static str;
    /// Query the module status
    const STATUS_QUERY: &'static str;
    /// Prefix of the send command, followed by the hex payload
    const SEND_PREFIX: &'static str;
    /// Prefix marking an unsolicited received-message line
    const RECV_PREFIX: &'static str;
    /// Token acknowledging a command
    const ACK_TOKEN: &'static str;
    /// Token terminating the multi-line status output
    const STATUS_END_TOKEN: &'static str;
}

/// RAK811 AT firmware (V3) in LoRa P2P mode
#[derive(Debug, Clone, Copy, Default)]
pub struct Rak811P2p;

impl CommandSet for Rak811P2p {
    const VERSION_QUERY: &'static str = "at+version";
    const MODE_SWITCH: &'static str = "at+set_config=lora:work_mode:1";
    const CONFIG_PREFIX: &'static str = "at+set_config=lorap2p:";
    const STATUS_QUERY: &'static str = "at+get_config=lora:status";
    const SEND_PREFIX: &'static str = "at+send=lorap2p:";
    const RECV_PREFIX: &'static str = "at+recv=";
    const ACK_TOKEN: &'static str = "OK";
    const STATUS_END_TOKEN: &'static str = "List End";
}

/// Case-insensitive substring search over ASCII text
pub fn contains_token(haystack: &[u8], token: &[u8]) -> bool {
    if token.is_empty() {
        return true;
    }
    haystack
        .windows(token.len())
        .any(|window| window.eq_ignore_ascii_case(token))
}

/// Byte offset just past the first case-insensitive occurrence of `token`
pub fn find_token_end(haystack: &[u8], token: &[u8]) -> Option<usize> {
    if token.is_empty() {
        return Some(0);
    }
    haystack
        .windows(token.len())
        .position(|window| window.eq_ignore_ascii_case(token))
        .map(|start| start + token.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_case_insensitive() {
        assert!(contains_token(b"...ok", b"OK"));
        assert!(contains_token(b"OK V3.0.0.14.H", b"ok"));
        assert!(contains_token(b"LIST END", b"List End"));
        assert!(!contains_token(b"ERROR: 2", b"OK"));
        assert!(!contains_token(b"O", b"OK"));
    }

    #[test]
    fn test_find_token_end() {
        assert_eq!(find_token_end(b"OK V3.0", b"ok"), Some(2));
        assert_eq!(find_token_end(b"AT+RECV=0,0,0:41", b"at+recv="), Some(8));
        assert_eq!(find_token_end(b"nothing", b"OK"), None);
    }
}
