//! SWire ISP over a plain UART adapter.

pub mod config;
pub mod constants;
pub mod error;
pub mod flashing;
pub mod format;
pub mod protocol;
pub mod transport;

pub use self::config::Config;
pub use self::error::{Error, Result};
pub use self::flashing::{FlashState, Flashing};
pub use self::protocol::{encode, RegisterWrite};
pub use self::transport::Transport;
