// src/segment/storage_unit_label.rs
use crate::error::{IndexError, Result};

/// The 80 byte Storage Unit Label at the start of every RP66V1 file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageUnitLabel {
    pub sequence_number: u32,
    pub dlis_version: Vec<u8>,
    pub storage_unit_structure: Vec<u8>,
    pub maximum_record_length: u32,
    /// Always 60 bytes, space padded.
    pub storage_set_identifier: Vec<u8>,
}

impl StorageUnitLabel {
    pub const SIZE: usize = 80;
    pub const DLIS_VERSION: &'static [u8; 5] = b"V1.00";
    pub const STORAGE_UNIT_STRUCTURE: &'static [u8; 6] = b"RECORD";
    pub const IDENTIFIER_LENGTH: usize = 60;
    const MAX_SEQUENCE_NUMBER: u32 = 9999;
    const MAX_RECORD_LENGTH: u32 = 99999;

    /// Builds a label from its fields, checking the same constraints as [`parse`](Self::parse).
    pub fn new(
        sequence_number: u32,
        dlis_version: &[u8],
        storage_unit_structure: &[u8],
        maximum_record_length: u32,
        storage_set_identifier: &[u8],
    ) -> Result<Self> {
        if sequence_number == 0 || sequence_number > Self::MAX_SEQUENCE_NUMBER {
            return Err(IndexError::InvalidStorageUnitLabel(format!(
                "sequence number {} must be in 1..={}",
                sequence_number,
                Self::MAX_SEQUENCE_NUMBER
            )));
        }
        if dlis_version != Self::DLIS_VERSION {
            return Err(IndexError::InvalidStorageUnitLabel(format!(
                "DLIS version {:?} is not {:?}",
                String::from_utf8_lossy(dlis_version),
                String::from_utf8_lossy(Self::DLIS_VERSION)
            )));
        }
        if storage_unit_structure != Self::STORAGE_UNIT_STRUCTURE {
            return Err(IndexError::InvalidStorageUnitLabel(format!(
                "storage unit structure {:?} is not {:?}",
                String::from_utf8_lossy(storage_unit_structure),
                String::from_utf8_lossy(Self::STORAGE_UNIT_STRUCTURE)
            )));
        }
        if maximum_record_length > Self::MAX_RECORD_LENGTH {
            return Err(IndexError::InvalidStorageUnitLabel(format!(
                "maximum record length {} does not fit in five digits",
                maximum_record_length
            )));
        }
        if storage_set_identifier.len() > Self::IDENTIFIER_LENGTH {
            return Err(IndexError::InvalidStorageUnitLabel(format!(
                "storage set identifier is {} bytes, maximum is {}",
                storage_set_identifier.len(),
                Self::IDENTIFIER_LENGTH
            )));
        }
        let mut identifier = storage_set_identifier.to_vec();
        identifier.resize(Self::IDENTIFIER_LENGTH, b' ');
        Ok(StorageUnitLabel {
            sequence_number,
            dlis_version: dlis_version.to_vec(),
            storage_unit_structure: storage_unit_structure.to_vec(),
            maximum_record_length,
            storage_set_identifier: identifier,
        })
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(IndexError::InvalidStorageUnitLabel(format!(
                "needs {} bytes but got {}",
                Self::SIZE,
                bytes.len()
            )));
        }
        let sequence_number = parse_digits(&bytes[0..4], "sequence number")?;
        let maximum_record_length = parse_digits(&bytes[15..20], "maximum record length")?;
        Self::new(
            sequence_number,
            &bytes[4..9],
            &bytes[9..15],
            maximum_record_length,
            &bytes[20..80],
        )
    }

    /// The 80 byte on-disk form; numbers are right justified with spaces.
    pub fn as_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [b' '; Self::SIZE];
        copy_field(&mut bytes[0..4], format!("{:>4}", self.sequence_number).as_bytes());
        copy_field(&mut bytes[4..9], &self.dlis_version);
        copy_field(&mut bytes[9..15], &self.storage_unit_structure);
        copy_field(&mut bytes[15..20], format!("{:>5}", self.maximum_record_length).as_bytes());
        copy_field(&mut bytes[20..80], &self.storage_set_identifier);
        bytes
    }
}

/// Fields are public so may have been resized; excess is dropped, shortfall stays blank.
fn copy_field(dest: &mut [u8], src: &[u8]) {
    let n = dest.len().min(src.len());
    dest[..n].copy_from_slice(&src[..n]);
}

fn parse_digits(field: &[u8], name: &str) -> Result<u32> {
    let text = std::str::from_utf8(field)
        .map_err(|_| IndexError::InvalidStorageUnitLabel(format!("{} is not ASCII", name)))?;
    text.trim()
        .parse::<u32>()
        .map_err(|_| IndexError::InvalidStorageUnitLabel(format!("{} {:?} is not a number", name, text)))
}
