// src/utils/string_encoding.rs
use crate::error::{IndexError, Result};

/// RP66V1 text is bytes; Latin-1 maps every byte to exactly one char so
/// identifiers survive a trip through XML unchanged.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

pub fn encode_latin1(s: &str) -> Result<Vec<u8>> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| IndexError::Decode(format!("character {:?} is not Latin-1", c))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_round_trip() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        assert_eq!(encode_latin1(&decode_latin1(&bytes)).unwrap(), bytes);
        assert!(encode_latin1("\u{263A}").is_err());
    }
}
