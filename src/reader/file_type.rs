// src/reader/file_type.rs
use crate::error::Result;
use crate::segment::StorageUnitLabel;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Binary file types the indexer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFileType {
    Rp66v1,
    Unknown,
}

impl BinaryFileType {
    pub fn from_bytes(header: &[u8]) -> Self {
        if StorageUnitLabel::parse(header).is_ok() {
            BinaryFileType::Rp66v1
        } else {
            BinaryFileType::Unknown
        }
    }
}

impl fmt::Display for BinaryFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryFileType::Rp66v1 => write!(f, "RP66V1"),
            BinaryFileType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Sniffs the file type from the leading bytes.
pub fn detect_file_type(path: impl AsRef<Path>) -> Result<BinaryFileType> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(StorageUnitLabel::SIZE);
    file.take(StorageUnitLabel::SIZE as u64).read_to_end(&mut header)?;
    Ok(BinaryFileType::from_bytes(&header))
}
