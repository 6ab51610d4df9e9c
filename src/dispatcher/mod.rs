//! Command dispatch and, on the device, the channels feeding it

#[cfg(feature = "embedded")]
pub mod channels;
pub mod handler;

#[cfg(feature = "embedded")]
pub use channels::{
    CommandReceiver, CommandSender, ResponseReceiver, ResponseSender, COMMAND_CHANNEL,
    RESPONSE_CHANNEL,
};
pub use handler::{status_for, CommandDispatcher};
