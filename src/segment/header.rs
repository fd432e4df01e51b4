// src/segment/header.rs
use crate::error::{IndexError, Result};
use byteorder::{BigEndian, ByteOrder};

/// Logical Record Segment attribute bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentAttributes(u8);

impl SegmentAttributes {
    pub const EXPLICITLY_FORMATTED: u8 = 1 << 7;
    pub const HAS_PREDECESSOR: u8 = 1 << 6;
    pub const HAS_SUCCESSOR: u8 = 1 << 5;
    pub const ENCRYPTED: u8 = 1 << 4;
    pub const HAS_ENCRYPTION_PACKET: u8 = 1 << 3;
    pub const HAS_CHECKSUM: u8 = 1 << 2;
    pub const HAS_TRAILING_LENGTH: u8 = 1 << 1;
    pub const HAS_PADDING: u8 = 1 << 0;

    pub fn new(flags: u8) -> Self {
        SegmentAttributes(flags)
    }

    pub fn empty() -> Self {
        SegmentAttributes(0)
    }

    pub fn is_eflr(&self) -> bool {
        self.0 & Self::EXPLICITLY_FORMATTED != 0
    }

    pub fn has_predecessor(&self) -> bool {
        self.0 & Self::HAS_PREDECESSOR != 0
    }

    pub fn has_successor(&self) -> bool {
        self.0 & Self::HAS_SUCCESSOR != 0
    }

    pub fn is_encrypted(&self) -> bool {
        self.0 & Self::ENCRYPTED != 0
    }

    pub fn has_encryption_packet(&self) -> bool {
        self.0 & Self::HAS_ENCRYPTION_PACKET != 0
    }

    pub fn has_checksum(&self) -> bool {
        self.0 & Self::HAS_CHECKSUM != 0
    }

    pub fn has_trailing_length(&self) -> bool {
        self.0 & Self::HAS_TRAILING_LENGTH != 0
    }

    pub fn has_padding(&self) -> bool {
        self.0 & Self::HAS_PADDING != 0
    }

    fn set(&mut self, bit: u8, value: bool) {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    pub fn set_eflr(&mut self, value: bool) {
        self.set(Self::EXPLICITLY_FORMATTED, value);
    }

    pub fn set_predecessor(&mut self, value: bool) {
        self.set(Self::HAS_PREDECESSOR, value);
    }

    pub fn set_successor(&mut self, value: bool) {
        self.set(Self::HAS_SUCCESSOR, value);
    }

    pub fn set_encrypted(&mut self, value: bool) {
        self.set(Self::ENCRYPTED, value);
    }

    pub fn set_checksum(&mut self, value: bool) {
        self.set(Self::HAS_CHECKSUM, value);
    }

    pub fn set_trailing_length(&mut self, value: bool) {
        self.set(Self::HAS_TRAILING_LENGTH, value);
    }

    pub fn set_padding(&mut self, value: bool) {
        self.set(Self::HAS_PADDING, value);
    }

    pub fn raw_value(&self) -> u8 {
        self.0
    }
}

/// Logical Record Segment Header (LRSH)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    pub position: u64,
    /// Length of the whole segment including this header and any trailer.
    pub length: u16,
    pub attributes: SegmentAttributes,
    pub lr_type: u8,
}

impl SegmentHeader {
    pub const SIZE: usize = 4;
    /// Segments are padded to an even length of at least this.
    pub const MIN_LENGTH: u16 = 16;

    pub fn parse(bytes: &[u8; Self::SIZE], position: u64) -> Result<Self> {
        let length = BigEndian::read_u16(&bytes[0..2]);
        if (length as usize) < Self::SIZE {
            return Err(IndexError::InvalidSegment {
                position,
                reason: format!("length {} is shorter than the segment header", length),
            });
        }
        Ok(SegmentHeader {
            position,
            length,
            attributes: SegmentAttributes::new(bytes[2]),
            lr_type: bytes[3],
        })
    }

    pub fn body_length(&self) -> usize {
        self.length as usize - Self::SIZE
    }

    /// Length of the segment body once the trailer has been removed.
    ///
    /// The trailer is read from the end: trailing length, then checksum, then
    /// padding whose last byte is the pad count.
    pub fn logical_data_length(&self, body: &[u8]) -> Result<usize> {
        let truncated = |reason: &str| IndexError::InvalidSegment {
            position: self.position,
            reason: reason.to_string(),
        };
        let mut len = body.len();
        if self.attributes.has_trailing_length() {
            len = len.checked_sub(2).ok_or_else(|| truncated("no room for trailing length"))?;
        }
        if self.attributes.has_checksum() {
            len = len.checked_sub(2).ok_or_else(|| truncated("no room for checksum"))?;
        }
        if self.attributes.has_padding() {
            let pad = match len.checked_sub(1) {
                Some(last) => body[last] as usize,
                None => return Err(truncated("no room for padding")),
            };
            if pad == 0 || pad > len {
                return Err(truncated("pad count exceeds segment body"));
            }
            len -= pad;
        }
        Ok(len)
    }
}
