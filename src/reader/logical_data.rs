// src/reader/logical_data.rs
use bytes::Bytes;
use std::fmt;

/// Where a Logical Record starts: the Visible Record containing its first
/// segment, and the segment header itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalRecordPosition {
    pub vr_position: u64,
    pub lrsh_position: u64,
}

impl LogicalRecordPosition {
    pub fn new(vr_position: u64, lrsh_position: u64) -> Self {
        LogicalRecordPosition {
            vr_position,
            lrsh_position,
        }
    }
}

impl fmt::Display for LogicalRecordPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VR: 0x{:08x} LRSH: 0x{:08x}", self.vr_position, self.lrsh_position)
    }
}

/// A Logical Record reassembled from its segments with trailers removed.
#[derive(Debug, Clone)]
pub struct LogicalData {
    pub position: LogicalRecordPosition,
    pub lr_type: u8,
    pub is_eflr: bool,
    pub is_encrypted: bool,
    pub data: Bytes,
}
