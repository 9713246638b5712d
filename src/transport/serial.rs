//! Serial Transportation.
use std::{io::Write, time::Duration};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use super::Transport;
use crate::error::{Error, Result};

const SERIAL_TIMEOUT_MS: u64 = 1000;

pub struct SerialTransport {
    serial_port: Box<dyn SerialPort>,
}

impl SerialTransport {
    pub fn scan_ports() -> Result<Vec<String>> {
        let ports = serialport::available_ports().map_err(Error::PortScan)?;
        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }

    /// Open `port` at `baud_rate`, 8N1, with both control lines asserted.
    pub fn open(port: &str, baud_rate: u32) -> Result<Self> {
        log::info!("Opening serial port: \"{}\" @ {} baud", port, baud_rate);
        let serial_port = serialport::new(port, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(SERIAL_TIMEOUT_MS))
            .open()
            .map_err(|source| Error::TransportOpen {
                port: port.to_string(),
                source,
            })?;

        let mut transport = SerialTransport { serial_port };
        transport.set_control_lines(true, true)?;
        Ok(transport)
    }
}

impl Transport for SerialTransport {
    fn send_raw(&mut self, raw: &[u8]) -> Result<()> {
        self.serial_port
            .write_all(raw)
            .map_err(Error::TransportWrite)?;
        self.serial_port.flush().map_err(Error::TransportWrite)?;
        Ok(())
    }

    fn set_control_lines(&mut self, dtr: bool, rts: bool) -> Result<()> {
        self.serial_port
            .write_data_terminal_ready(dtr)
            .map_err(Error::ControlLines)?;
        self.serial_port
            .write_request_to_send(rts)
            .map_err(Error::ControlLines)?;
        Ok(())
    }

    fn close(mut self) -> Result<()> {
        self.serial_port.flush().map_err(Error::TransportWrite)?;
        drop(self.serial_port);
        log::info!("Serial port closed");
        Ok(())
    }
}
