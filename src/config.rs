//! Session configuration
use std::time::Duration;

use crate::constants::{BAUD_RATE, DEFAULT_ACTIVATION_MS, DEFAULT_PORT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Serial device of the UART adapter
    pub port: String,
    pub baud_rate: u32,
    /// How long to flood the target with CPU stop commands
    pub activation_duration: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT.to_string(),
            baud_rate: BAUD_RATE,
            activation_duration: Duration::from_millis(DEFAULT_ACTIVATION_MS),
        }
    }
}

impl Config {
    pub fn new(port: impl Into<String>, activation_ms: u64) -> Self {
        Config {
            port: port.into(),
            activation_duration: Duration::from_millis(activation_ms),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 921600);
        assert_eq!(config.activation_duration, Duration::from_secs(1));
    }

    #[test]
    fn test_baud_rate_is_not_configurable() {
        let config = Config::new("COM3", 2500);
        assert_eq!(config.port, "COM3");
        assert_eq!(config.baud_rate, BAUD_RATE);
        assert_eq!(config.activation_duration, Duration::from_millis(2500));
    }
}
