// src/rle/item.rs
use crate::rle::RleValue;

/// One run: `repeat + 1` values starting at `datum` and stepping by `stride`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RleItem<T> {
    pub datum: T,
    pub stride: T,
    pub repeat: u64,
}

impl<T: RleValue> RleItem<T> {
    /// A single value run. The stride stays undefined (zero) until a second value arrives.
    pub fn new(datum: T) -> Self {
        RleItem {
            datum,
            stride: T::ZERO,
            repeat: 0,
        }
    }

    pub fn with_stride(datum: T, stride: T, repeat: u64) -> Self {
        RleItem { datum, stride, repeat }
    }

    /// Number of values this run expands to, `None` if that is not a `u64`.
    pub fn num_values(&self) -> Option<u64> {
        self.repeat.checked_add(1)
    }

    /// The last value of the run, `None` if it is not representable.
    pub fn last(&self) -> Option<T> {
        self.datum.advance(self.stride, self.repeat)
    }

    /// Value at `index` within the run.
    pub fn get(&self, index: u64) -> Option<T> {
        if index > self.repeat {
            return None;
        }
        self.datum.advance(self.stride, index)
    }

    /// Try to extend this run with `value`, returns false if it breaks the run.
    ///
    /// The check is against the value the run would reconstruct rather than
    /// the raw difference, so floating point runs expand bit for bit.
    pub(crate) fn try_extend(&mut self, value: T) -> bool {
        if self.repeat == 0 {
            match self.datum.stride_to(value) {
                Some(stride) if self.datum.advance(stride, 1).is_some_and(|next| next.same(value)) => {
                    self.stride = stride;
                    self.repeat = 1;
                    true
                }
                _ => false,
            }
        } else {
            match self.datum.advance(self.stride, self.repeat + 1) {
                Some(next) if next.same(value) => {
                    self.repeat += 1;
                    true
                }
                _ => false,
            }
        }
    }

    /// Expand the run.
    pub fn values(&self) -> impl Iterator<Item = T> + '_ {
        (0..=self.repeat).map_while(move |i| self.datum.advance(self.stride, i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value_item() {
        let item = RleItem::new(20i64);
        assert_eq!(item.num_values(), Some(1));
        assert_eq!(item.stride, 0);
        assert_eq!(item.last(), Some(20));
        assert_eq!(item.values().collect::<Vec<_>>(), vec![20]);
    }

    #[test]
    fn test_extend_fixes_stride() {
        let mut item = RleItem::new(5i64);
        assert!(item.try_extend(7));
        assert_eq!(item.stride, 2);
        assert!(item.try_extend(9));
        assert!(!item.try_extend(12));
        assert_eq!(item.repeat, 2);
        assert_eq!(item.get(2), Some(9));
        assert_eq!(item.get(3), None);
    }

    #[test]
    fn test_float_extend_is_exact() {
        let mut item = RleItem::new(0.1f64);
        // 0.1 + (0.3 - 0.1) is not 0.3 in binary floating point
        let accepted = item.try_extend(0.3);
        if accepted {
            assert_eq!(item.values().last(), Some(0.3));
        } else {
            assert_eq!(item.repeat, 0);
        }
    }

    #[test]
    fn test_nan_never_extends() {
        let mut item = RleItem::new(1.0f64);
        assert!(!item.try_extend(f64::NAN));
        let mut item = RleItem::new(f64::NAN);
        assert!(!item.try_extend(f64::NAN));
    }

    #[test]
    fn test_signed_zero_kept() {
        let mut item = RleItem::new(0.0f64);
        assert!(!item.try_extend(-0.0));
        let item = RleItem::new(-0.0f64);
        assert_eq!(item.get(0).map(f64::to_bits), Some((-0.0f64).to_bits()));
    }

    #[test]
    fn test_num_values_at_limit() {
        assert_eq!(RleItem::with_stride(0i64, 0, u64::MAX).num_values(), None);
        assert_eq!(RleItem::with_stride(0i64, 0, u64::MAX - 1).num_values(), Some(u64::MAX));
    }
}
