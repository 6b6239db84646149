//! Single-value slots.

use std::ops::Deref;

use crate::mask::ChangeMask;
use crate::value::SlotValue;

/// A single value owning bit `BIT` of its record's mask, inside the group
/// whose umbrella bit is `GROUP`.
///
/// Mutations go through the record, which passes its mask in, so a slot can
/// never be changed without marking both bits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateField<T, const GROUP: u32, const BIT: u32> {
    value: T,
}

impl<T, const GROUP: u32, const BIT: u32> UpdateField<T, GROUP, BIT> {
    /// Umbrella bit of the owning group.
    pub const GROUP_BIT: u32 = GROUP;
    /// Bit owned by this slot.
    pub const MASK_BIT: u32 = BIT;

    #[must_use]
    pub const fn new(value: T) -> Self {
        Self { value }
    }

    #[must_use]
    pub const fn get(&self) -> &T {
        &self.value
    }

    /// Stores `value` and marks the slot if it differs from the current one.
    ///
    /// Returns `true` if the slot was marked.
    pub fn set<const B: usize>(&mut self, value: T, mask: &mut ChangeMask<B>) -> bool
    where
        T: PartialEq,
    {
        if self.value == value {
            return false;
        }
        self.value = value;
        Self::mark(mask);
        true
    }

    /// Marks the slot unconditionally.
    pub fn mark<const B: usize>(mask: &mut ChangeMask<B>) {
        mask.set(GROUP);
        mask.set(BIT);
    }

    /// Marks the slot and hands out the value for in-place changes.
    ///
    /// Used for nested records, which track their own fields.
    pub fn modify<const B: usize>(&mut self, mask: &mut ChangeMask<B>) -> &mut T {
        Self::mark(mask);
        &mut self.value
    }
}

impl<T: SlotValue, const GROUP: u32, const BIT: u32> UpdateField<T, GROUP, BIT> {
    pub fn clear_nested_changes(&mut self) {
        self.value.clear_nested_changes();
    }

    pub fn mark_nested_changes(&mut self) {
        self.value.mark_nested_changes();
    }
}

impl<T, const GROUP: u32, const BIT: u32> Deref for UpdateField<T, GROUP, BIT> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}
