//! Variable-length collections with per-index change tracking.

use bitstream::BitWriter;
use schema::UpdateFieldFlags;

use crate::mask::ChangeMask;
use crate::record::UpdateRecord;
use crate::value::{SlotValue, WireValue};

/// Default bit width of sizes and indices in dynamic update masks.
pub const DEFAULT_SIZE_BITS: u32 = 32;

/// An ordered collection owning bit `BIT` (inside group `GROUP`) of its
/// record's mask, with one change flag per index.
///
/// Structural changes shift elements: after a removal or insertion at `k`,
/// every index from `k` to the end is flagged and shifted nested records are
/// fully re-marked, so the receiver rewrites the whole tail. No flag from
/// before the shift is assumed to still describe the same element.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicUpdateField<T, const GROUP: u32, const BIT: u32> {
    values: Vec<T>,
    changed: Vec<u32>,
}

impl<T, const GROUP: u32, const BIT: u32> Default for DynamicUpdateField<T, GROUP, BIT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const GROUP: u32, const BIT: u32> DynamicUpdateField<T, GROUP, BIT> {
    /// Umbrella bit of the owning group.
    pub const GROUP_BIT: u32 = GROUP;
    /// Bit owned by the collection.
    pub const MASK_BIT: u32 = BIT;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: Vec::new(),
            changed: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    #[must_use]
    pub fn has_changed(&self, index: usize) -> bool {
        self.changed
            .get(index / 32)
            .is_some_and(|block| block & (1 << (index % 32)) != 0)
    }

    #[must_use]
    pub fn is_any_changed(&self) -> bool {
        self.changed.iter().any(|block| *block != 0)
    }

    /// Indices flagged as changed, ascending.
    pub fn changed_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.values.len()).filter(move |index| self.has_changed(*index))
    }

    /// Marks the collection's bits in the parent mask.
    pub fn mark<const B: usize>(mask: &mut ChangeMask<B>) {
        mask.set(GROUP);
        mask.set(BIT);
    }

    /// Marks index `index` and hands the element out for in-place changes.
    ///
    /// Panics if `index` is out of bounds.
    pub fn modify<const B: usize>(&mut self, index: usize, mask: &mut ChangeMask<B>) -> &mut T {
        assert!(index < self.values.len(), "dynamic index {index} out of range");
        self.flag(index);
        Self::mark(mask);
        &mut self.values[index]
    }

    /// Removes every element.
    pub fn clear<const B: usize>(&mut self, mask: &mut ChangeMask<B>) {
        self.values.clear();
        self.changed.clear();
        Self::mark(mask);
    }

    /// Resets every per-index flag without touching nested state.
    pub fn clear_index_flags(&mut self) {
        self.changed.clear();
        self.changed.resize(self.values.len().div_ceil(32), 0);
    }

    fn flag(&mut self, index: usize) {
        let block = index / 32;
        if self.changed.len() <= block {
            self.changed.resize(block + 1, 0);
        }
        self.changed[block] |= 1 << (index % 32);
    }

    fn truncate_flags(&mut self) {
        let len = self.values.len();
        self.changed.truncate(len.div_ceil(32));
        if len % 32 != 0 {
            if let Some(last) = self.changed.last_mut() {
                *last &= (1 << (len % 32)) - 1;
            }
        }
    }
}

impl<T: SlotValue, const GROUP: u32, const BIT: u32> DynamicUpdateField<T, GROUP, BIT> {
    /// Appends `value`, returning its index.
    pub fn push<const B: usize>(&mut self, mut value: T, mask: &mut ChangeMask<B>) -> usize {
        value.mark_nested_changes();
        self.values.push(value);
        let index = self.values.len() - 1;
        self.flag(index);
        Self::mark(mask);
        index
    }

    /// Inserts `value` at `index`, shifting later elements.
    pub fn insert<const B: usize>(&mut self, index: usize, value: T, mask: &mut ChangeMask<B>) {
        self.values.insert(index, value);
        self.mark_tail(index);
        Self::mark(mask);
    }

    /// Replaces the element at `index`, marking it if it differs.
    ///
    /// Panics if `index` is out of bounds.
    pub fn set<const B: usize>(&mut self, index: usize, mut value: T, mask: &mut ChangeMask<B>) -> bool
    where
        T: PartialEq,
    {
        if self.values[index] == value {
            return false;
        }
        value.mark_nested_changes();
        self.values[index] = value;
        self.flag(index);
        Self::mark(mask);
        true
    }

    /// Removes the element at `index`, shifting later elements.
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove<const B: usize>(&mut self, index: usize, mask: &mut ChangeMask<B>) -> T {
        let removed = self.values.remove(index);
        self.truncate_flags();
        self.mark_tail(index);
        Self::mark(mask);
        removed
    }

    /// Removes the first element equal to `value`, if any.
    pub fn remove_value<const B: usize>(&mut self, value: &T, mask: &mut ChangeMask<B>) -> Option<T>
    where
        T: PartialEq,
    {
        let index = self.values.iter().position(|v| v == value)?;
        Some(self.remove(index, mask))
    }

    /// Resets every per-index flag and the nested state of every element.
    pub fn clear_changes(&mut self) {
        self.clear_index_flags();
        for value in &mut self.values {
            value.clear_nested_changes();
        }
    }

    /// Flags every index and fully re-marks every element.
    pub fn mark_nested_changes(&mut self) {
        self.mark_tail(0);
    }

    fn mark_tail(&mut self, from: usize) {
        for index in from..self.values.len() {
            self.values[index].mark_nested_changes();
            self.flag(index);
        }
    }
}

impl<T, const GROUP: u32, const BIT: u32> DynamicUpdateField<T, GROUP, BIT> {
    /// Writes the update mask in one of its two present shapes.
    ///
    /// `size:size_bits` then a full-rewrite bit. With `ignore_nested` the bit
    /// is 1 and every element follows. Otherwise it is 0 and the changed
    /// indices follow as `count:size_bits` and `count` indices of `size_bits`.
    /// A collection whose parent bit is clear writes nothing at all.
    pub fn write_update_mask(&self, data: &mut BitWriter, size_bits: u32, ignore_nested: bool) {
        data.write_bits(self.values.len() as u64, size_bits);
        if data.write_bit(ignore_nested) {
            return;
        }
        data.write_bits(self.changed_indices().count() as u64, size_bits);
        for index in self.changed_indices() {
            data.write_bits(index as u64, size_bits);
        }
    }
}

impl<T: WireValue, const GROUP: u32, const BIT: u32> DynamicUpdateField<T, GROUP, BIT> {
    /// Writes the size as `u32` followed by every element.
    pub fn write_create_values(&self, data: &mut BitWriter) {
        data.write_u32(self.values.len() as u32);
        for value in &self.values {
            value.write(data);
        }
    }

    /// Writes the elements selected by [`write_update_mask`](Self::write_update_mask).
    pub fn write_update_values(&self, data: &mut BitWriter, ignore_nested: bool) {
        for (index, value) in self.values.iter().enumerate() {
            if ignore_nested || self.has_changed(index) {
                value.write(data);
            }
        }
    }
}

impl<T, const GROUP: u32, const BIT: u32> DynamicUpdateField<T, GROUP, BIT> {
    /// Writes the size as `u32` followed by the create form of every element.
    pub fn write_create_records<V: ?Sized>(&self, data: &mut BitWriter, flags: UpdateFieldFlags, view: &V)
    where
        T: UpdateRecord<V>,
    {
        data.write_u32(self.values.len() as u32);
        for value in &self.values {
            value.write_create(data, flags, view);
        }
    }

    /// Writes the update form of the elements selected by
    /// [`write_update_mask`](Self::write_update_mask).
    pub fn write_update_records<V: ?Sized>(
        &self,
        data: &mut BitWriter,
        flags: UpdateFieldFlags,
        ignore_nested: bool,
        view: &V,
    ) where
        T: UpdateRecord<V>,
    {
        for (index, value) in self.values.iter().enumerate() {
            if ignore_nested || self.has_changed(index) {
                value.write_update(data, flags, ignore_nested, view);
            }
        }
    }
}
