//! Passive spells applied to a unit.

use bitstream::BitWriter;
use fields::{AllowedMask, ChangeMask, SlotValue, UpdateField, UpdateFieldFlags, UpdateRecord};
use schema::{RecordLayout, Section, Slot};

pub const LAYOUT: RecordLayout = RecordLayout::new(
    "PassiveSpellHistory",
    &[Section::group(
        "passive_spell",
        &[Slot::scalar("spell_id"), Slot::scalar("aura_spell_id")],
    )],
);
pub const BLOCKS: usize = LAYOUT.block_count();
const ALLOWED: AllowedMask<BLOCKS> = AllowedMask::from_layout(&LAYOUT);

pub mod bit {
    use super::LAYOUT;

    pub const PASSIVE_SPELL: u32 = LAYOUT.bit_of("passive_spell");
    pub const SPELL_ID: u32 = LAYOUT.bit_of("spell_id");
    pub const AURA_SPELL_ID: u32 = LAYOUT.bit_of("aura_spell_id");
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassiveSpellHistory {
    changes: ChangeMask<BLOCKS>,
    spell_id: UpdateField<i32, { bit::PASSIVE_SPELL }, { bit::SPELL_ID }>,
    aura_spell_id: UpdateField<i32, { bit::PASSIVE_SPELL }, { bit::AURA_SPELL_ID }>,
}

impl Default for PassiveSpellHistory {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl PassiveSpellHistory {
    #[must_use]
    pub const fn new(spell_id: i32, aura_spell_id: i32) -> Self {
        Self {
            changes: ChangeMask::for_layout(&LAYOUT),
            spell_id: UpdateField::new(spell_id),
            aura_spell_id: UpdateField::new(aura_spell_id),
        }
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }

    scalar_accessors! {
        spell_id, set_spell_id: i32;
        aura_spell_id, set_aura_spell_id: i32;
    }
}

impl SlotValue for PassiveSpellHistory {
    fn clear_nested_changes(&mut self) {
        self.changes.reset_all();
    }

    fn mark_nested_changes(&mut self) {
        self.changes.set_all();
    }
}

impl<V: ?Sized> UpdateRecord<V> for PassiveSpellHistory {
    fn write_create(&self, data: &mut BitWriter, _flags: UpdateFieldFlags, _view: &V) {
        data.write_i32(self.spell_id());
        data.write_i32(self.aura_spell_id());
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
        if mask.get(bit::PASSIVE_SPELL) {
            if mask.get(bit::SPELL_ID) {
                data.write_i32(self.spell_id());
            }
            if mask.get(bit::AURA_SPELL_ID) {
                data.write_i32(self.aura_spell_id());
            }
        }
    }

    fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }
}
