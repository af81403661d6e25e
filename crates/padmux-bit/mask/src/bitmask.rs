use std::fmt;
use std::marker::PhantomData;

use crate::Bitable;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitmask<T: Bitable>(pub u64, PhantomData<T>);

impl<T: Bitable> Bitmask<T> {
    /// Create an empty bitmask.
    pub const fn empty() -> Self {
        Self(0, PhantomData)
    }

    /// Create a new bitmask from a raw value.
    /// Bits that no `T` maps to are kept but never yielded by [`Bitmask::iter`].
    pub const fn from_value(value: u64) -> Self {
        Self(value, PhantomData)
    }

    /// Raw mask value.
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Check if the bitmask contains a specific value.
    #[inline]
    pub fn contains(&self, bit: T) -> bool {
        (self.0 & bit.bit()) != 0
    }

    /// Insert a value to the bitmask.
    #[inline]
    pub fn insert(&mut self, bit: T) {
        self.0 |= bit.bit();
    }

    /// Check if the bitmask is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Values present in `self` but not in `other`.
    #[inline]
    #[must_use]
    pub fn difference(&self, other: &Bitmask<T>) -> Bitmask<T> {
        Self(self.0 & !other.0, PhantomData)
    }

    /// Count the number of bits set in the bitmask.
    #[inline]
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate over contained values in ascending bit order.
    pub fn iter(&self) -> Iter<T> {
        Iter {
            rest: self.0,
            _marker: PhantomData,
        }
    }
}

impl<T: Bitable> Default for Bitmask<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Bitable> FromIterator<T> for Bitmask<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut mask = Self::empty();
        for value in iter {
            mask.insert(value);
        }
        mask
    }
}

impl<T: Bitable> IntoIterator for Bitmask<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Bitable + fmt::Debug> fmt::Debug for Bitmask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Iterator over the values of a [`Bitmask`].
pub struct Iter<T: Bitable> {
    rest: u64,
    _marker: PhantomData<T>,
}

impl<T: Bitable> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while self.rest != 0 {
            let index = self.rest.trailing_zeros();
            self.rest &= self.rest - 1;
            if let Some(value) = T::from_index(index) {
                return Some(value);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::Bitmask;
    use crate::Bitable;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestFlag {
        A = 0,
        B = 1,
        C = 2,
        D = 12,
    }

    impl Bitable for TestFlag {
        fn bit(&self) -> u64 {
            1u64 << (*self as u64)
        }

        fn index(&self) -> u32 {
            *self as u32
        }

        fn from_index(index: u32) -> Option<Self> {
            match index {
                0 => Some(TestFlag::A),
                1 => Some(TestFlag::B),
                2 => Some(TestFlag::C),
                12 => Some(TestFlag::D),
                _ => None,
            }
        }
    }

    #[test]
    fn empty_creates_no_bits_set() {
        let mask = Bitmask::<TestFlag>::empty();
        assert!(!mask.contains(TestFlag::A));
        assert!(!mask.contains(TestFlag::B));
        assert!(!mask.contains(TestFlag::C));
        assert!(!mask.contains(TestFlag::D));
    }

    #[test]
    fn insert_handles_duplicates() {
        let mut mask = Bitmask::empty();
        mask.insert(TestFlag::B);
        mask.insert(TestFlag::B);
        mask.insert(TestFlag::D);
        assert!(!mask.contains(TestFlag::A));
        assert!(mask.contains(TestFlag::B));
        assert!(mask.contains(TestFlag::D));
        assert_eq!(mask.value(), 0x1002);
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn iter_yields_known_values_in_bit_order() {
        // bit 5 has no variant and must be skipped
        let mask = Bitmask::<TestFlag>::from_value(0x1000 | 0x20 | 0x4 | 0x1);
        let values: Vec<_> = mask.iter().collect();
        assert_eq!(values, vec![TestFlag::A, TestFlag::C, TestFlag::D]);
    }

    #[test]
    fn difference_keeps_only_new_values() {
        let now: Bitmask<TestFlag> = [TestFlag::A, TestFlag::C].into_iter().collect();
        let before: Bitmask<TestFlag> = [TestFlag::A].into_iter().collect();
        assert_eq!(now.difference(&before).iter().collect::<Vec<_>>(), vec![TestFlag::C]);
        assert!(before.difference(&now).is_empty());
    }

    #[test]
    fn collects_from_iterator() {
        let mask: Bitmask<TestFlag> = [TestFlag::B, TestFlag::D].into_iter().collect();
        assert_eq!(mask.value(), 0x1002);
    }
}
