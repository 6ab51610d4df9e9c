#![cfg_attr(not(test), no_std)]

pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod protocol;
pub mod radio;
pub mod serial;

// These modules depend on embassy/esp-hal, only available with the embedded feature
#[cfg(feature = "embedded")]
pub mod logger;
#[cfg(feature = "embedded")]
pub mod tasks;
