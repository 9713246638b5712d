//! SWire over UART bit-stream encoding
//!
//! A SWire byte is sent as a burst of 10 UART bytes, one UART byte per SWire
//! bit. The target only measures the low time of each UART byte, so `0x80`
//! (start bit plus seven zeros) reads as a SWire `1` and `0xfe` (start bit
//! plus one zero) reads as a SWire `0`.
//!
//! Layout of one burst:
//!
//! | byte  | meaning                                            |
//! |-------|----------------------------------------------------|
//! | 0     | start marker, `1` for the command byte, else `0`   |
//! | 1..=8 | data bits, MSB first                               |
//! | 9     | stop marker, always `0`                            |
//!
//! A register write packet is `0x5a`, three address bytes, a write flag,
//! the data bytes and finally a stop command of ten `1` symbols.
use std::fmt;

use crate::constants::{BIT_ONE, BIT_ZERO, FRAME_LEN, HEADER_LEN, SWIRE_SYNC, SWIRE_WRITE};
use crate::error::{Error, Result};

/// A single write to the target's register bus.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RegisterWrite {
    pub address: u32,
    pub data: Vec<u8>,
}

impl fmt::Debug for RegisterWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#08x}] {}", self.address, hex::encode(&self.data))
    }
}

impl RegisterWrite {
    pub fn new(address: u32, data: impl Into<Vec<u8>>) -> Self {
        RegisterWrite {
            address,
            data: data.into(),
        }
    }

    pub fn into_raw(self) -> Vec<u8> {
        encode(self.address, &self.data)
    }

    /// Software model of the target's SWire receiver.
    ///
    /// Recovers the register write from a packet produced by [`encode`].
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        if raw.is_empty() || raw.len() % FRAME_LEN != 0 {
            return Err(Error::MalformedPacket(
                "length is not a whole number of frames",
            ));
        }
        let (body, terminator) = raw.split_at(raw.len() - FRAME_LEN);
        if terminator.iter().any(|&b| b != BIT_ONE) {
            return Err(Error::MalformedPacket("missing stop command"));
        }
        if body.len() < HEADER_LEN * FRAME_LEN {
            return Err(Error::MalformedPacket("truncated header"));
        }

        let mut bytes = Vec::with_capacity(body.len() / FRAME_LEN);
        for (i, frame) in body.chunks_exact(FRAME_LEN).enumerate() {
            let (command, byte) = read_frame(frame)?;
            if command != (i == 0) {
                return Err(Error::MalformedPacket("unexpected start marker"));
            }
            bytes.push(byte);
        }

        if bytes[0] != SWIRE_SYNC {
            return Err(Error::MalformedPacket("missing sync byte"));
        }
        if bytes[4] != SWIRE_WRITE {
            return Err(Error::MalformedPacket("not a write packet"));
        }
        let address =
            (u32::from(bytes[1]) << 16) | (u32::from(bytes[2]) << 8) | u32::from(bytes[3]);
        Ok(RegisterWrite {
            address,
            data: bytes.split_off(HEADER_LEN),
        })
    }
}

/// Encode a write of `data` to register `address` as a UART byte stream.
///
/// Only the low 24 bits of `address` are sent. Empty `data` gives an
/// address-only packet.
pub fn encode(address: u32, data: &[u8]) -> Vec<u8> {
    let header = [
        SWIRE_SYNC,
        (address >> 16) as u8,
        (address >> 8) as u8,
        address as u8,
        SWIRE_WRITE,
    ];

    let mut buf = vec![0u8; (HEADER_LEN + data.len() + 1) * FRAME_LEN];
    let frames = buf.chunks_exact_mut(FRAME_LEN);
    for (i, (frame, &byte)) in frames.zip(header.iter().chain(data)).enumerate() {
        let start = if i == 0 { BIT_ONE } else { BIT_ZERO };
        write_frame(frame, start, byte);
    }

    // stop command: a `1` start bit followed by 0xff
    let stop = buf.len() - FRAME_LEN;
    buf[stop..].fill(BIT_ONE);
    buf
}

fn write_frame(frame: &mut [u8], start: u8, byte: u8) {
    frame[0] = start;
    for (n, symbol) in frame[1..FRAME_LEN - 1].iter_mut().enumerate() {
        *symbol = if byte & (0x80 >> n) != 0 {
            BIT_ONE
        } else {
            BIT_ZERO
        };
    }
    frame[FRAME_LEN - 1] = BIT_ZERO;
}

/// Returns whether the frame carries a command start bit, and its byte.
fn read_frame(frame: &[u8]) -> Result<(bool, u8)> {
    let mut bits = frame.iter().map(|&symbol| match symbol {
        BIT_ONE => Ok(true),
        BIT_ZERO => Ok(false),
        _ => Err(Error::MalformedPacket("unknown bit symbol")),
    });

    let mut next = || {
        bits.next()
            .unwrap_or_else(|| Err(Error::MalformedPacket("short frame")))
    };
    let command = next()?;
    let mut byte = 0u8;
    for _ in 0..8 {
        byte = (byte << 1) | u8::from(next()?);
    }
    if next()? {
        return Err(Error::MalformedPacket("bad stop marker"));
    }
    Ok((command, byte))
}
