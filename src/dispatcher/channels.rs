//! Channels between the host serial tasks and the radio task
//!
//! The serial reader is the only producer of commands and the radio task
//! the only consumer. Responses flow the other way: the radio task answers
//! commands and relays received messages, the serial reader reports frames
//! it could not parse, and the serial writer drains them all.

use crate::commands::types::{Command, Response};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

/// Channel capacity for incoming commands
pub const COMMAND_CHANNEL_SIZE: usize = 8;

/// Channel capacity for outgoing responses
pub const RESPONSE_CHANNEL_SIZE: usize = 8;

pub type CommandSender = Sender<'static, CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE>;
pub type CommandReceiver = Receiver<'static, CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE>;
pub type ResponseSender = Sender<'static, CriticalSectionRawMutex, Response, RESPONSE_CHANNEL_SIZE>;
pub type ResponseReceiver = Receiver<'static, CriticalSectionRawMutex, Response, RESPONSE_CHANNEL_SIZE>;

/// Commands parsed from host frames
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Command responses and unsolicited messages bound for the host
pub static RESPONSE_CHANNEL: Channel<CriticalSectionRawMutex, Response, RESPONSE_CHANNEL_SIZE> =
    Channel::new();
