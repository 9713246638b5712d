//! Firmware file loading
//!
//! Images are raw binaries, written to flash verbatim from address 0.
use std::path::Path;

use crate::constants::{MAX_IMAGE_SIZE, PAGE_SIZE, SECTOR_SIZE};
use crate::error::{Error, Result};

pub fn read_firmware_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let p = path.as_ref();
    log::info!("Loading file {}", p.display());
    let raw = std::fs::read(p).map_err(|source| Error::ImageRead {
        path: p.to_path_buf(),
        source,
    })?;
    if raw.len() > MAX_IMAGE_SIZE {
        return Err(Error::ImageTooLarge(raw.len()));
    }
    if raw.is_empty() {
        log::warn!("{} is empty, nothing will be written", p.display());
    }
    log::info!(
        "Firmware size: {} bytes ({} sectors, {} pages)",
        raw.len(),
        raw.len().div_ceil(SECTOR_SIZE as usize),
        raw.len().div_ceil(PAGE_SIZE)
    );
    Ok(raw)
}
