//! Abstract Device transport interface.
use std::{thread, time::Duration};

use crate::error::Result;
use crate::protocol::RegisterWrite;

pub use self::serial::SerialTransport;

mod serial;

/// Abstraction of the transport layer.
///
/// Writes are blocking: `send_raw` returns only once the bytes have left the
/// host, so consecutive register writes reach the target in call order.
pub trait Transport {
    fn send_raw(&mut self, raw: &[u8]) -> Result<()>;

    /// Drive DTR and RTS. `true` asserts the line.
    fn set_control_lines(&mut self, dtr: bool, rts: bool) -> Result<()>;

    /// Release the device. Called exactly once, at the end of a session.
    fn close(self) -> Result<()>
    where
        Self: Sized;

    /// Wait for the target to finish an operation it cannot report on.
    fn settle(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    /// Pulse the target's reset through the adapter's control lines.
    fn reset_pulse(&mut self, duration: Duration) -> Result<()> {
        log::debug!("DTR, RTS on ({} ms)", duration.as_millis());
        self.set_control_lines(true, true)?;
        self.settle(duration);
        log::debug!("RTS off");
        self.set_control_lines(true, false)
    }

    fn write_register(&mut self, write: RegisterWrite) -> Result<()> {
        log::trace!("=> {:?}", write);
        self.send_raw(&write.into_raw())
    }
}
