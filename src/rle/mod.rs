// src/rle/mod.rs
//! Run length encoding of ordered numeric sequences.
//!
//! File positions, frame numbers and X axis samples in a RP66V1 file are
//! mostly regular, so they compress into a handful of runs of
//! `(datum, stride, repeat)`:
//!
//! ```
//! use rp66v1_index::rle::{Rle, RleItem};
//!
//! let rle: Rle<i64> = [5, 7, 9, 11, 20].into_iter().collect();
//! assert_eq!(rle.items(), &[RleItem::with_stride(5, 2, 3), RleItem::new(20)]);
//! assert_eq!(rle.num_values(), 5);
//! assert_eq!(rle.values().collect::<Vec<_>>(), vec![5, 7, 9, 11, 20]);
//! ```

mod item;
mod value;

pub use item::RleItem;
pub use value::{parse_integer, Radix, RleValue};

use crate::error::{IndexError, Result};

/// A run length encoded sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Rle<T> {
    items: Vec<RleItem<T>>,
}

impl<T: RleValue> Default for Rle<T> {
    fn default() -> Self {
        Rle::new()
    }
}

impl<T: RleValue> Rle<T> {
    pub fn new() -> Self {
        Rle { items: Vec::new() }
    }

    /// Build from items that have already been encoded, for example when
    /// reading an index back.
    pub fn from_items(items: Vec<RleItem<T>>) -> Self {
        Rle { items }
    }

    /// Encode a sequence that must contain at least one value.
    pub fn try_from_non_empty(values: impl IntoIterator<Item = T>) -> Result<Self> {
        let rle: Rle<T> = values.into_iter().collect();
        if rle.is_empty() {
            return Err(IndexError::EmptySequence);
        }
        Ok(rle)
    }

    /// Append a value, extending the last run if it continues its stride.
    pub fn push(&mut self, value: T) {
        if let Some(last) = self.items.last_mut() {
            if last.try_extend(value) {
                return;
            }
        }
        self.items.push(RleItem::new(value));
    }

    pub fn items(&self) -> &[RleItem<T>] {
        &self.items
    }

    /// Number of runs, the compressed length.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of values the runs expand to, saturating at `u64::MAX`.
    pub fn num_values(&self) -> u64 {
        self.checked_num_values().unwrap_or(u64::MAX)
    }

    /// Total number of values, `None` if it does not fit a `u64`.
    pub fn checked_num_values(&self) -> Option<u64> {
        self.items
            .iter()
            .try_fold(0u64, |total, item| total.checked_add(item.num_values()?))
    }

    /// Lazily expand every run in order. Each call starts from the beginning.
    pub fn values(&self) -> impl Iterator<Item = T> + '_ {
        self.items.iter().flat_map(RleItem::values)
    }

    /// Value at `index` in the expanded sequence without expanding it.
    pub fn get(&self, mut index: u64) -> Option<T> {
        for item in &self.items {
            if index <= item.repeat {
                return item.get(index);
            }
            index -= item.repeat + 1;
        }
        None
    }

    /// The first value whose last value can not be represented, if any.
    /// Runs built with [`Rle::push`] never overflow, runs read from text can.
    pub fn first_overflow(&self) -> Option<&RleItem<T>> {
        self.items.iter().find(|item| item.last().is_none())
    }
}

impl<T: RleValue> FromIterator<T> for Rle<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut rle = Rle::new();
        rle.extend(iter);
        rle
    }
}

impl<T: RleValue> Extend<T> for Rle<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}
