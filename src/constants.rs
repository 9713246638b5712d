use std::time::Duration;

/// Each SWire byte is sent as a burst of this many UART bytes.
pub const FRAME_LEN: usize = 10;
/// Sync command, 3 address bytes, write flag.
pub const HEADER_LEN: usize = 5;

/// UART byte that the target samples as a SWire `1`.
pub const BIT_ONE: u8 = 0x80;
/// UART byte that the target samples as a SWire `0`.
pub const BIT_ZERO: u8 = 0xfe;

pub const SWIRE_SYNC: u8 = 0x5a;
pub const SWIRE_WRITE: u8 = 0x00;

pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
/// Must match the SWire sampling window of the target.
pub const BAUD_RATE: u32 = 921600;
pub const DEFAULT_ACTIVATION_MS: u64 = 1000;

pub const SECTOR_SIZE: u32 = 4096;
/// Flash controller FIFO depth.
pub const PAGE_SIZE: usize = 256;
/// Addresses are sent as 24 bits.
pub const MAX_IMAGE_SIZE: usize = 1 << 24;

pub mod registers {
    pub const SPI_DATA: u32 = 0x0c;
    pub const SPI_CNS: u32 = 0x0d;
    pub const MCU_CTRL: u32 = 0x6f;
    pub const SWS_SPEED: u32 = 0xb2;
    pub const SWS_EXT_MODE: u32 = 0xb3;
    pub const CPU_CTRL: u32 = 0x0602;

    pub const CNS_LOW: u8 = 0x00;
    pub const CNS_HIGH: u8 = 0x01;
    pub const EXT_MODE_FIFO: u8 = 0x80;
    pub const EXT_MODE_NORMAL: u8 = 0x00;
    pub const MCU_SOFT_RESET: u8 = 0x20;
    pub const CPU_STOP: u8 = 0x05;
    pub const SWS_SPEED_FAST: u8 = 55;
}

pub mod opcodes {
    pub const WRITE_ENABLE: u8 = 0x06;
    pub const WAKE_UP: u8 = 0xab;
    pub const WRITE_STATUS: u8 = 0x01;
    pub const ERASE_ALL: u8 = 0x60;
    pub const SECTOR_ERASE: u8 = 0x20;
    pub const PAGE_PROGRAM: u8 = 0x02;
}

pub mod timing {
    use super::Duration;

    pub const RESET_PULSE: Duration = Duration::from_millis(100);
    pub const SECTOR_ERASE: Duration = Duration::from_millis(300);
    pub const PAGE_PROGRAM: Duration = Duration::from_millis(10);
    pub const CHIP_ERASE: Duration = Duration::from_millis(3500);
}
