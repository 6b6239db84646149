//! Fixed-length array slots.

use crate::mask::ChangeMask;
use crate::value::SlotValue;

/// `N` values behind a base bit `BASE`; element `i` owns bit `BASE + 1 + i`.
///
/// The base bit is set whenever an element bit is, so writers can skip the
/// whole run with one test.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateFieldArray<T, const N: usize, const BASE: u32> {
    values: [T; N],
}

impl<T: Default, const N: usize, const BASE: u32> Default for UpdateFieldArray<T, N, BASE> {
    fn default() -> Self {
        Self {
            values: std::array::from_fn(|_| T::default()),
        }
    }
}

impl<T, const N: usize, const BASE: u32> UpdateFieldArray<T, N, BASE> {
    /// Base ("any element changed") bit.
    pub const BASE_BIT: u32 = BASE;
    pub const LEN: usize = N;

    #[must_use]
    pub const fn from_values(values: [T; N]) -> Self {
        Self { values }
    }

    /// Bit owned by element `index`.
    #[must_use]
    pub const fn element_bit(index: usize) -> u32 {
        BASE + 1 + index as u32
    }

    #[must_use]
    pub fn get(&self, index: usize) -> &T {
        &self.values[index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Stores `value` at `index`, marking it if it differs.
    pub fn set<const B: usize>(&mut self, index: usize, value: T, mask: &mut ChangeMask<B>) -> bool
    where
        T: PartialEq,
    {
        if self.values[index] == value {
            return false;
        }
        self.values[index] = value;
        Self::mark(index, mask);
        true
    }

    /// Marks element `index` and the base bit.
    pub fn mark<const B: usize>(index: usize, mask: &mut ChangeMask<B>) {
        debug_assert!(index < N, "array index {index} out of range {N}");
        mask.set(BASE);
        mask.set(Self::element_bit(index));
    }

    /// Marks element `index` and hands it out for in-place changes.
    pub fn modify<const B: usize>(&mut self, index: usize, mask: &mut ChangeMask<B>) -> &mut T {
        Self::mark(index, mask);
        &mut self.values[index]
    }

    /// Iterates the elements whose bit is set in `mask`.
    ///
    /// Yields nothing without touching element bits when the base bit is clear.
    pub fn changed<'a, const B: usize>(
        &'a self,
        mask: &'a ChangeMask<B>,
    ) -> impl Iterator<Item = (usize, &'a T)> + 'a {
        let len = if mask.get(BASE) { N } else { 0 };
        self.values[..len]
            .iter()
            .enumerate()
            .filter(move |(index, _)| mask.get(Self::element_bit(*index)))
    }
}

impl<T: SlotValue, const N: usize, const BASE: u32> UpdateFieldArray<T, N, BASE> {
    pub fn clear_nested_changes(&mut self) {
        for value in &mut self.values {
            value.clear_nested_changes();
        }
    }

    pub fn mark_nested_changes(&mut self) {
        for value in &mut self.values {
            value.mark_nested_changes();
        }
    }
}
