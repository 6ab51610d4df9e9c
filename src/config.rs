//! Hardware and protocol configuration constants for the ESP32-S3 driving a RAK811

/// UART wired to the RAK811 module
pub mod uart {
    /// UART peripheral number (UART1 on the ESP32-S3)
    pub const PORT: u8 = 1;
    pub const TX_PIN: u8 = 17;
    pub const RX_PIN: u8 = 18;
    /// Factory baud rate of the RAK811 AT firmware
    pub const BAUD_RATE: u32 = 115_200;
    /// How long a single link read may stay idle before it reports "nothing pending"
    pub const READ_IDLE_TIMEOUT_MS: u64 = 5;
}

/// Default point-to-point radio configuration
pub mod radio_defaults {
    /// EU ISM band frequency
    pub const FREQUENCY_HZ: u32 = 868_500_000;
    pub const BANDWIDTH_KHZ: u32 = 125;
    pub const SPREADING_FACTOR: u8 = 7;
    /// Coding rate index (1 = 4/5)
    pub const CODING_RATE: u8 = 1;
    pub const PREAMBLE_LEN: u16 = 5;
    pub const TX_POWER_DBM: u8 = 5;
}

/// Response polling
pub mod timing {
    /// Delay before each line read while waiting for a response
    pub const POLL_INTERVAL_MS: u32 = 20;

    /// Attempts allowed for the version query
    pub const VERSION_ATTEMPTS: u16 = 5;
    /// Attempts allowed for the work mode switch
    pub const MODE_SWITCH_ATTEMPTS: u16 = 10;
    /// Attempts allowed for the radio parameter push
    pub const CONFIG_ATTEMPTS: u16 = 10;
    /// Status output spans many lines before the list terminator
    pub const STATUS_ATTEMPTS: u16 = 40;
    /// Attempts allowed for a send acknowledgement
    pub const SEND_ACK_ATTEMPTS: u16 = 5;
}

/// Gateway behaviour of the firmware binary
pub mod gateway {
    /// Verify the checksum suffix on received messages
    pub const USE_CHECKSUM: bool = true;
    /// Pause between receive polls
    pub const RX_POLL_INTERVAL_MS: u64 = 80;
    /// Back-off before retrying a failed session start
    pub const START_RETRY_DELAY_MS: u64 = 2_000;
}

/// Log output
pub mod logging {
    pub const MAX_LEVEL: log::LevelFilter = log::LevelFilter::Info;
}

/// Protocol constants
pub mod protocol {
    /// Frame delimiter for COBS encoding
    pub const FRAME_DELIMITER: u8 = 0x00;

    /// Line delimiter of the AT dialect (lines end in CR-LF)
    pub const LINE_DELIMITER: u8 = b'\n';

    /// Maximum host frame size
    pub const MAX_FRAME_SIZE: usize = 512;

    /// Maximum plaintext payload of a single radio message
    pub const MAX_PAYLOAD_LEN: usize = 120;

    /// Hex-encoded payload plus the two checksum digits
    pub const MAX_HEX_LEN: usize = MAX_PAYLOAD_LEN * 2 + 2;

    /// Maximum length of one AT line, command or response
    pub const MAX_LINE_LEN: usize = MAX_HEX_LEN + 64;

    /// Bytes requested from the link per read
    pub const READ_CHUNK: usize = 64;

    /// Maximum length of the version string reported by the module
    pub const MAX_VERSION_LEN: usize = 32;

    /// Host protocol version (increment when message format changes)
    pub const PROTOCOL_VERSION: u8 = 1;

    /// Firmware version
    pub const VERSION_MAJOR: u8 = 0;
    pub const VERSION_MINOR: u8 = 1;
    pub const VERSION_PATCH: u8 = 0;
}
