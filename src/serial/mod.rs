pub mod reader;
pub mod traits;
#[cfg(feature = "embedded")]
pub mod uart;

pub use reader::{Line, LineReader};
pub use traits::{SerialConnector, SerialError, SerialLink};
