pub mod framing;

pub use framing::{DelimitedAccumulator, FrameAccumulator, LineAccumulator};
