//! Embassy tasks module
//!
//! Contains all async tasks for the firmware, organised by functionality.

pub mod radio;
pub mod serial;

pub use radio::radio_task;
pub use serial::{serial_reader_task, serial_writer_task};
