// src/segment/visible_record.rs
use crate::error::{IndexError, Result};
use byteorder::{BigEndian, ByteOrder};

/// Visible Record header: length, 0xFF, format version 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRecordHeader {
    pub position: u64,
    pub length: u16,
}

impl VisibleRecordHeader {
    pub const SIZE: usize = 4;
    pub const PADDING: u8 = 0xFF;
    pub const VERSION: u8 = 1;

    pub fn parse(bytes: &[u8; Self::SIZE], position: u64) -> Result<Self> {
        let length = BigEndian::read_u16(&bytes[0..2]);
        if bytes[2] != Self::PADDING || bytes[3] != Self::VERSION {
            return Err(IndexError::InvalidVisibleRecord {
                position,
                reason: format!("expected 0x{:02x}{:02x} after the length but found 0x{:02x}{:02x}",
                    Self::PADDING, Self::VERSION, bytes[2], bytes[3]),
            });
        }
        // Must hold at least one segment header.
        if (length as usize) < Self::SIZE * 2 {
            return Err(IndexError::InvalidVisibleRecord {
                position,
                reason: format!("length {} is too short", length),
            });
        }
        Ok(VisibleRecordHeader { position, length })
    }

    pub fn as_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8, 0, Self::PADDING, Self::VERSION];
        BigEndian::write_u16(&mut bytes[0..2], self.length);
        bytes
    }

    /// File position one past the end of this Visible Record.
    pub fn end(&self) -> u64 {
        self.position + self.length as u64
    }
}
