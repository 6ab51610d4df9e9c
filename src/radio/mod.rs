//! RAK811 LoRa P2P driver over the AT command set

pub mod checksum;
pub mod dialect;
pub mod error;
pub mod matcher;
pub mod message;
pub mod session;
pub mod settings;

#[cfg(test)]
pub mod mock;

pub use checksum::Checksum;
pub use dialect::{CommandSet, Rak811P2p};
pub use error::{FrameError, FramingError, IntegrityError, SessionError};
pub use matcher::{PollOutcome, ResponseMatcher};
pub use message::{Message, MessageFramer};
pub use session::{AttemptBudgets, DeviceSession, ModuleVersion, SessionOptions, SessionState};
pub use settings::{Bandwidth, ConfigurationValidator, RadioConfig, RawRadioConfig};
