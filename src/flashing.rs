//! Chip flashing logic.
//!
//! The flash die sits behind an SPI controller that is reachable from the
//! SWire register bus: bytes written to [`SPI_DATA`] are clocked out to the
//! flash, and [`SPI_CNS`] drives its chip select. Writing two bytes to
//! `SPI_DATA` lets the second one land in `SPI_CNS`, which is how a command
//! and the closing chip-select-high are sent in a single packet.
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

use crate::constants::registers::*;
use crate::constants::{opcodes, timing, MAX_IMAGE_SIZE, PAGE_SIZE, SECTOR_SIZE};
use crate::error::{Error, Result};
use crate::protocol::RegisterWrite;
use crate::transport::{SerialTransport, Transport};
use crate::Config;

/// What the flash controller is doing, as far as the host can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashState {
    Idle,
    /// Chip select held low, command bytes in flight
    CmdAsserted,
    /// FIFO page transfer in flight
    Programming,
}

pub struct Flashing<T: Transport> {
    transport: T,
    state: FlashState,
    activation_time: Duration,
}

impl Flashing<SerialTransport> {
    pub fn new_from_serial(config: &Config) -> Result<Self> {
        let transport = SerialTransport::open(&config.port, config.baud_rate)?;
        Ok(Flashing::new(transport, config.activation_duration))
    }
}

impl<T: Transport> Flashing<T> {
    pub fn new(transport: T, activation_time: Duration) -> Self {
        Flashing {
            transport,
            state: FlashState::Idle,
            activation_time,
        }
    }

    pub fn state(&self) -> FlashState {
        self.state
    }

    /// Halt the CPU and prepare the flash for commands.
    ///
    /// The target may still be booting when the first stop commands arrive,
    /// so they are repeated until the activation time has passed.
    pub fn activate(&mut self) -> Result<()> {
        self.transport.reset_pulse(timing::RESET_PULSE)?;
        self.soft_reset()?;

        log::info!(
            "Activate ({:.1} sec)...",
            self.activation_time.as_secs_f32()
        );
        let cpu_stop = RegisterWrite::new(CPU_CTRL, [CPU_STOP]).into_raw();
        let deadline = Instant::now() + self.activation_time;
        let mut sent = 0u32;
        loop {
            self.transport.send_raw(&cpu_stop)?;
            sent += 1;
            if Instant::now() >= deadline {
                break;
            }
        }
        log::debug!("sent {} CPU stop commands", sent);

        self.write(SWS_SPEED, &[SWS_SPEED_FAST])?;
        self.transport.send_raw(&cpu_stop)?;
        self.wake_up()
    }

    pub fn write_enable(&mut self) -> Result<()> {
        self.byte_cmd(opcodes::WRITE_ENABLE)
    }

    /// Release the flash from deep power-down.
    pub fn wake_up(&mut self) -> Result<()> {
        self.byte_cmd(opcodes::WAKE_UP)
    }

    /// Clear all block protection bits of the status register.
    ///
    /// Needs a preceding [`write_enable`](Self::write_enable).
    pub fn unlock(&mut self) -> Result<()> {
        log::debug!("Flash unlock");
        self.cns_low()?;
        self.write(SPI_DATA, &[opcodes::WRITE_STATUS])?;
        self.write(SPI_DATA, &[0x00])?;
        self.write(SPI_DATA, &[0x00, CNS_HIGH])?;
        self.state = FlashState::Idle;
        Ok(())
    }

    /// Needs a preceding [`write_enable`](Self::write_enable).
    pub fn erase_all(&mut self) -> Result<()> {
        log::debug!("Flash erase all");
        self.byte_cmd(opcodes::ERASE_ALL)
    }

    /// Write all of `data` to the single register `address`.
    ///
    /// In FIFO mode the SWire bus does not advance the address after each
    /// byte, so a whole flash command can be pushed through `SPI_DATA` in one
    /// packet.
    pub fn write_fifo(&mut self, address: u32, data: &[u8]) -> Result<()> {
        self.write(SWS_EXT_MODE, &[EXT_MODE_FIFO])?;
        self.write(address, data)?;
        self.write(SWS_EXT_MODE, &[EXT_MODE_NORMAL])
    }

    pub fn sector_erase(&mut self, address: u32) -> Result<()> {
        log::debug!("Flash sector erase at {:#08x}", address);
        self.write_enable()?;
        self.cns_low()?;
        self.write(SPI_DATA, &[opcodes::SECTOR_ERASE])?;
        self.write(SPI_DATA, &[(address >> 16) as u8])?;
        self.write(SPI_DATA, &[(address >> 8) as u8])?;
        self.write(SPI_DATA, &[address as u8, CNS_HIGH])?;
        self.state = FlashState::Idle;
        // no busy polling, the erase time is fixed
        self.transport.settle(timing::SECTOR_ERASE);
        Ok(())
    }

    pub fn program_page(&mut self, address: u32, data: &[u8]) -> Result<()> {
        if data.len() > PAGE_SIZE {
            return Err(Error::PageTooLarge(data.len()));
        }
        log::debug!("Flash write {} bytes at {:#08x}", data.len(), address);

        let mut block = Vec::with_capacity(4 + data.len());
        block.extend_from_slice(&[
            opcodes::PAGE_PROGRAM,
            (address >> 16) as u8,
            (address >> 8) as u8,
            address as u8,
        ]);
        block.extend_from_slice(data);

        self.write_enable()?;
        self.cns_low()?;
        self.state = FlashState::Programming;
        self.write_fifo(SPI_DATA, &block)?;
        self.cns_high()?;
        self.transport.settle(timing::PAGE_PROGRAM);
        Ok(())
    }

    pub fn soft_reset(&mut self) -> Result<()> {
        log::info!("Soft Reset MCU");
        self.write(MCU_CTRL, &[MCU_SOFT_RESET])
    }

    /// Unlock the whole flash and wait for the status write to finish.
    pub fn unprotect(&mut self) -> Result<()> {
        log::info!("Flash unlock ({:.1} sec)...", timing::CHIP_ERASE.as_secs_f32());
        self.write_enable()?;
        self.unlock()?;
        self.transport.settle(timing::CHIP_ERASE);
        Ok(())
    }

    /// Erase the whole flash and wait for the erase to finish.
    pub fn erase_chip(&mut self) -> Result<()> {
        log::info!(
            "Flash Erase All ({:.1} sec)...",
            timing::CHIP_ERASE.as_secs_f32()
        );
        self.write_enable()?;
        self.erase_all()?;
        self.transport.settle(timing::CHIP_ERASE);
        Ok(())
    }

    /// Write `image` from address 0, erasing each sector before its first
    /// page, then reset the MCU.
    ///
    /// Pages are written in ascending order, so a sector is only ever
    /// entered once and is erased exactly once.
    pub fn flash(&mut self, image: &[u8]) -> Result<()> {
        if image.len() > MAX_IMAGE_SIZE {
            return Err(Error::ImageTooLarge(image.len()));
        }
        log::info!("Write {} bytes in to Flash...", image.len());
        let started = Instant::now();

        let pb = ProgressBar::new(image.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );

        let mut address = 0u32;
        for page in image.chunks(PAGE_SIZE) {
            if address % SECTOR_SIZE == 0 {
                pb.set_message(format!("erase {:#08x}", address));
                self.sector_erase(address)?;
            }
            pb.set_message(format!("write {:#08x}", address));
            self.program_page(address, page)?;
            address += page.len() as u32;
            pb.inc(page.len() as u64);
        }
        pb.finish_and_clear();

        log::info!(
            "Done ({:.3} sec).",
            started.elapsed().as_secs_f32()
        );
        log::warn!("Flash contents are not read back, the write is unverified");
        self.soft_reset()
    }

    /// Release the transport, consuming the session.
    pub fn close(self) -> Result<()> {
        self.transport.close()
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        self.transport
            .write_register(RegisterWrite::new(address, data))
    }

    fn cns_low(&mut self) -> Result<()> {
        self.write(SPI_CNS, &[CNS_LOW])?;
        self.state = FlashState::CmdAsserted;
        Ok(())
    }

    fn cns_high(&mut self) -> Result<()> {
        self.write(SPI_CNS, &[CNS_HIGH])?;
        self.state = FlashState::Idle;
        Ok(())
    }

    /// Single-byte flash command, chip select raised in the same packet.
    fn byte_cmd(&mut self, cmd: u8) -> Result<()> {
        self.cns_low()?;
        self.write(SPI_DATA, &[cmd, CNS_HIGH])?;
        self.state = FlashState::Idle;
        Ok(())
    }
}
