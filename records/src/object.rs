//! Fields every replicated object carries.

use bitstream::BitWriter;
use fields::{AllowedMask, ChangeMask, SlotValue, UpdateField, UpdateFieldFlags, UpdateRecord};
use schema::{RecordLayout, Section, Slot};

use crate::projection;
use crate::view::ViewContext;

pub const LAYOUT: RecordLayout = RecordLayout::new(
    "ObjectData",
    &[Section::group(
        "object",
        &[
            Slot::scalar("entry_id"),
            Slot::scalar("dynamic_flags"),
            Slot::scalar("scale"),
        ],
    )],
);
pub const BLOCKS: usize = LAYOUT.block_count();
const ALLOWED: AllowedMask<BLOCKS> = AllowedMask::from_layout(&LAYOUT);

pub mod bit {
    use super::LAYOUT;

    pub const OBJECT: u32 = LAYOUT.bit_of("object");
    pub const ENTRY_ID: u32 = LAYOUT.bit_of("entry_id");
    pub const DYNAMIC_FLAGS: u32 = LAYOUT.bit_of("dynamic_flags");
    pub const SCALE: u32 = LAYOUT.bit_of("scale");
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectData {
    changes: ChangeMask<BLOCKS>,
    entry_id: UpdateField<i32, { bit::OBJECT }, { bit::ENTRY_ID }>,
    dynamic_flags: UpdateField<u32, { bit::OBJECT }, { bit::DYNAMIC_FLAGS }>,
    scale: UpdateField<f32, { bit::OBJECT }, { bit::SCALE }>,
}

impl Default for ObjectData {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectData {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            changes: ChangeMask::for_layout(&LAYOUT),
            entry_id: UpdateField::new(0),
            dynamic_flags: UpdateField::new(0),
            scale: UpdateField::new(1.0),
        }
    }

    #[must_use]
    pub const fn changes(&self) -> &ChangeMask<BLOCKS> {
        &self.changes
    }

    scalar_accessors! {
        entry_id, set_entry_id: i32;
        /// Stored flags; receivers get [`projection::dynamic_flags`] of them.
        dynamic_flags, set_dynamic_flags: u32;
        scale, set_scale: f32;
    }
}

impl SlotValue for ObjectData {
    fn clear_nested_changes(&mut self) {
        self.changes.reset_all();
    }

    fn mark_nested_changes(&mut self) {
        self.changes.set_all();
    }
}

impl UpdateRecord<ViewContext<'_>> for ObjectData {
    fn write_create(&self, data: &mut BitWriter, _flags: UpdateFieldFlags, view: &ViewContext<'_>) {
        data.write_i32(self.entry_id());
        data.write_u32(projection::dynamic_flags(self.dynamic_flags(), view));
        data.write_f32(self.scale());
    }

    fn write_update(
        &self,
        data: &mut BitWriter,
        flags: UpdateFieldFlags,
        ignore_nested: bool,
        view: &ViewContext<'_>,
    ) {
        let mask = ALLOWED.filter(&self.changes, flags, ignore_nested);
        mask.write_header(data);
        data.flush_bits();
        if mask.get(bit::OBJECT) {
            if mask.get(bit::ENTRY_ID) {
                data.write_i32(self.entry_id());
            }
            if mask.get(bit::DYNAMIC_FLAGS) {
                data.write_u32(projection::dynamic_flags(self.dynamic_flags(), view));
            }
            if mask.get(bit::SCALE) {
                data.write_f32(self.scale());
            }
        }
    }

    fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }

    fn has_visible_changes(&self, flags: UpdateFieldFlags) -> bool {
        ALLOWED.admits_any(&self.changes, flags)
    }
}
