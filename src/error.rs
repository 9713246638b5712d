//! Error types for SWire flashing
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The serial device could not be opened
    #[error("failed to open serial port {port}: {source}")]
    TransportOpen {
        port: String,
        source: serialport::Error,
    },

    #[error("failed to enumerate serial ports: {0}")]
    PortScan(#[source] serialport::Error),

    /// A burst could not be written to the serial device
    #[error("serial write failed: {0}")]
    TransportWrite(#[source] std::io::Error),

    /// DTR/RTS could not be driven
    #[error("failed to drive control lines: {0}")]
    ControlLines(#[source] serialport::Error),

    #[error("failed to read firmware {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("firmware is {0} bytes, larger than the 24-bit address space")]
    ImageTooLarge(usize),

    #[error("page program of {0} bytes exceeds the flash FIFO depth")]
    PageTooLarge(usize),

    /// The software SWire receiver rejected a packet
    #[error("malformed SWire packet: {0}")]
    MalformedPacket(&'static str),
}
