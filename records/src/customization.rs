//! Character appearance choices.

use bitstream::BitWriter;
use fields::{AllowedMask, ChangeMask, SlotValue, UpdateField, UpdateFieldFlags, UpdateRecord};
use schema::{RecordLayout, Section, Slot};

pub const LAYOUT: RecordLayout = RecordLayout::new(
    "ChrCustomizationChoice",
    &[Section::group(
        "customization",
        &[Slot::scalar("option_id"), Slot::scalar("choice_id")],
    )],
);
pub const BLOCKS: usize = LAYOUT.block_count();
const ALLOWED: AllowedMask<BLOCKS> = AllowedMask::from_layout(&LAYOUT);

pub mod bit {
    use super::LAYOUT;

    pub const CUSTOMIZATION: u32 = LAYOUT.bit_of("customization");
    pub const OPTION_ID: u32 = LAYOUT.bit_of("option_id");
    pub const CHOICE_ID: u32 = LAYOUT.bit_of("choice_id");
}

/// One `(option, choice)` pair of a character's appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct ChrCustomizationChoice {
    changes: ChangeMask<BLOCKS>,
    option_id: UpdateField<u32, { bit::CUSTOMIZATION }, { bit::OPTION_ID }>,
    choice_id: UpdateField<u32, { bit::CUSTOMIZATION }, { bit::CHOICE_ID }>,
}

impl Default for ChrCustomizationChoice {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl ChrCustomizationChoice {
    #[must_use]
    pub const fn new(option_id: u32, choice_id: u32) -> Self {
        Self {
            changes: ChangeMask::for_layout(&LAYOUT),
            option_id: UpdateField::new(option_id),
            choice_id: UpdateField::new(choice_id),
        }
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }

    scalar_accessors! {
        option_id, set_option_id: u32;
        choice_id, set_choice_id: u32;
    }
}

impl SlotValue for ChrCustomizationChoice {
    fn clear_nested_changes(&mut self) {
        self.changes.reset_all();
    }

    fn mark_nested_changes(&mut self) {
        self.changes.set_all();
    }
}

impl<V: ?Sized> UpdateRecord<V> for ChrCustomizationChoice {
    fn write_create(&self, data: &mut BitWriter, _flags: UpdateFieldFlags, _view: &V) {
        data.write_u32(self.option_id());
        data.write_u32(self.choice_id());
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
        if mask.get(bit::CUSTOMIZATION) {
            if mask.get(bit::OPTION_ID) {
                data.write_u32(self.option_id());
            }
            if mask.get(bit::CHOICE_ID) {
                data.write_u32(self.choice_id());
            }
        }
    }

    fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }
}
