// src/index/reconstruction.rs
use crate::error::{IndexError, Result};

/// Ascending file positions of every Visible Record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleRecordPositions(Vec<u64>);

impl VisibleRecordPositions {
    pub fn new(positions: Vec<u64>) -> Result<Self> {
        if let Some(pair) = positions.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(IndexError::Decode(format!(
                "Visible Record positions are not ascending: 0x{:x} then 0x{:x}",
                pair[0], pair[1]
            )));
        }
        Ok(VisibleRecordPositions(positions))
    }

    /// The Visible Record containing `lrsh_position`, i.e. the greatest
    /// Visible Record position not exceeding it.
    ///
    /// ```
    /// use rp66v1_index::index::VisibleRecordPositions;
    ///
    /// let vrs = VisibleRecordPositions::new(vec![0x50, 0xe048, 0x16044]).unwrap();
    /// assert_eq!(vrs.owning_visible_record(0xe100).unwrap(), 0xe048);
    /// assert!(vrs.owning_visible_record(0x10).is_err());
    /// ```
    pub fn owning_visible_record(&self, lrsh_position: u64) -> Result<u64> {
        let index = self.0.partition_point(|&vr| vr <= lrsh_position);
        match index {
            0 => Err(IndexError::PositionNotFound(lrsh_position)),
            i => Ok(self.0[i - 1]),
        }
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owning_visible_record() {
        let vrs = VisibleRecordPositions::new(vec![0x50, 0xe048, 0x16044]).unwrap();
        assert_eq!(vrs.owning_visible_record(0xe100).unwrap(), 0xe048);
        assert_eq!(vrs.owning_visible_record(0x54).unwrap(), 0x50);
        // Exact match is its own owner
        assert_eq!(vrs.owning_visible_record(0xe048).unwrap(), 0xe048);
        assert_eq!(vrs.owning_visible_record(0x16044 + 100).unwrap(), 0x16044);
        assert!(matches!(
            vrs.owning_visible_record(0x10),
            Err(IndexError::PositionNotFound(0x10))
        ));
    }

    #[test]
    fn test_empty_and_unordered() {
        let vrs = VisibleRecordPositions::default();
        assert!(matches!(vrs.owning_visible_record(0x50), Err(IndexError::PositionNotFound(_))));
        assert!(VisibleRecordPositions::new(vec![0x50, 0x50]).is_err());
        assert!(VisibleRecordPositions::new(vec![0x100, 0x50]).is_err());
    }
}
