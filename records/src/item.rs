//! Equipment appearance shown on unit and player models.

use bitstream::BitWriter;
use fields::{AllowedMask, ChangeMask, SlotValue, UpdateField, UpdateFieldFlags, UpdateRecord};
use schema::{RecordLayout, Section, Slot};

pub const LAYOUT: RecordLayout = RecordLayout::new(
    "VisibleItem",
    &[Section::group(
        "visible_item",
        &[
            Slot::scalar("item_id"),
            Slot::scalar("secondary_item_modified_appearance_id"),
            Slot::scalar("item_appearance_mod_id"),
            Slot::scalar("item_visual"),
        ],
    )],
);
pub const BLOCKS: usize = LAYOUT.block_count();
const ALLOWED: AllowedMask<BLOCKS> = AllowedMask::from_layout(&LAYOUT);

pub mod bit {
    use super::LAYOUT;

    pub const VISIBLE_ITEM: u32 = LAYOUT.bit_of("visible_item");
    pub const ITEM_ID: u32 = LAYOUT.bit_of("item_id");
    pub const SECONDARY_APPEARANCE: u32 = LAYOUT.bit_of("secondary_item_modified_appearance_id");
    pub const APPEARANCE_MOD: u32 = LAYOUT.bit_of("item_appearance_mod_id");
    pub const ITEM_VISUAL: u32 = LAYOUT.bit_of("item_visual");
}

/// One visible equipment slot.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleItem {
    changes: ChangeMask<BLOCKS>,
    item_id: UpdateField<i32, { bit::VISIBLE_ITEM }, { bit::ITEM_ID }>,
    secondary_item_modified_appearance_id:
        UpdateField<i32, { bit::VISIBLE_ITEM }, { bit::SECONDARY_APPEARANCE }>,
    item_appearance_mod_id: UpdateField<u16, { bit::VISIBLE_ITEM }, { bit::APPEARANCE_MOD }>,
    item_visual: UpdateField<u16, { bit::VISIBLE_ITEM }, { bit::ITEM_VISUAL }>,
}

impl Default for VisibleItem {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibleItem {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            changes: ChangeMask::for_layout(&LAYOUT),
            item_id: UpdateField::new(0),
            secondary_item_modified_appearance_id: UpdateField::new(0),
            item_appearance_mod_id: UpdateField::new(0),
            item_visual: UpdateField::new(0),
        }
    }

    /// Shorthand for an item shown with its default appearance.
    #[must_use]
    pub fn with_item(item_id: i32) -> Self {
        let mut item = Self::new();
        item.set_item_id(item_id);
        item
    }

    /// Returns `true` if any field changed since the last clear.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }

    #[must_use]
    pub const fn changes(&self) -> &ChangeMask<BLOCKS> {
        &self.changes
    }

    scalar_accessors! {
        item_id, set_item_id: i32;
        secondary_item_modified_appearance_id, set_secondary_item_modified_appearance_id: i32;
        item_appearance_mod_id, set_item_appearance_mod_id: u16;
        item_visual, set_item_visual: u16;
    }
}

impl SlotValue for VisibleItem {
    fn clear_nested_changes(&mut self) {
        self.changes.reset_all();
    }

    fn mark_nested_changes(&mut self) {
        self.changes.set_all();
    }
}

impl<V: ?Sized> UpdateRecord<V> for VisibleItem {
    fn write_create(&self, data: &mut BitWriter, _flags: UpdateFieldFlags, _view: &V) {
        data.write_i32(self.item_id());
        data.write_i32(self.secondary_item_modified_appearance_id());
        data.write_u16(self.item_appearance_mod_id());
        data.write_u16(self.item_visual());
    }

    fn write_update(
        &self,
        data: &mut BitWriter,
        flags: UpdateFieldFlags,
        ignore_nested: bool,
        _view: &V,
    ) {
        let mask = ALLOWED.filter(&self.changes, flags, ignore_nested);
        mask.write_header(data);
        data.flush_bits();
        if mask.get(bit::VISIBLE_ITEM) {
            if mask.get(bit::ITEM_ID) {
                data.write_i32(self.item_id());
            }
            if mask.get(bit::SECONDARY_APPEARANCE) {
                data.write_i32(self.secondary_item_modified_appearance_id());
            }
            if mask.get(bit::APPEARANCE_MOD) {
                data.write_u16(self.item_appearance_mod_id());
            }
            if mask.get(bit::ITEM_VISUAL) {
                data.write_u16(self.item_visual());
            }
        }
    }

    fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }
}
