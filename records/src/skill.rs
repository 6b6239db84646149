//! Profession and weapon skills of the active player.
//!
//! Seven parallel arrays of [`MAX_SKILLS`] entries give the record well over
//! a thousand mask bits, so its header uses more than one block-mask word.

use bitstream::BitWriter;
use fields::{AllowedMask, ChangeMask, SlotValue, UpdateFieldArray, UpdateFieldFlags, UpdateRecord};
use schema::{RecordLayout, Section, Slot};

/// Skill slots per player.
pub const MAX_SKILLS: usize = 256;

const LEN: u32 = MAX_SKILLS as u32;

pub const LAYOUT: RecordLayout = RecordLayout::new(
    "SkillInfo",
    &[
        Section::array(Slot::scalar("skill_line_id"), LEN),
        Section::array(Slot::scalar("skill_step"), LEN),
        Section::array(Slot::scalar("skill_rank"), LEN),
        Section::array(Slot::scalar("skill_starting_rank"), LEN),
        Section::array(Slot::scalar("skill_max_rank"), LEN),
        Section::array(Slot::scalar("skill_temp_bonus"), LEN),
        Section::array(Slot::scalar("skill_perm_bonus"), LEN),
    ],
);
pub const BLOCKS: usize = LAYOUT.block_count();
const ALLOWED: AllowedMask<BLOCKS> = AllowedMask::from_layout(&LAYOUT);

pub mod bit {
    use super::LAYOUT;

    pub const SKILL_LINE_ID: u32 = LAYOUT.bit_of("skill_line_id");
    pub const SKILL_STEP: u32 = LAYOUT.bit_of("skill_step");
    pub const SKILL_RANK: u32 = LAYOUT.bit_of("skill_rank");
    pub const SKILL_STARTING_RANK: u32 = LAYOUT.bit_of("skill_starting_rank");
    pub const SKILL_MAX_RANK: u32 = LAYOUT.bit_of("skill_max_rank");
    pub const SKILL_TEMP_BONUS: u32 = LAYOUT.bit_of("skill_temp_bonus");
    pub const SKILL_PERM_BONUS: u32 = LAYOUT.bit_of("skill_perm_bonus");
}

/// One row across the seven skill arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SkillEntry {
    pub line_id: u16,
    pub step: u16,
    pub rank: u16,
    pub starting_rank: u16,
    pub max_rank: u16,
    pub temp_bonus: u16,
    pub perm_bonus: u16,
}

type SkillArray<const BASE: u32> = UpdateFieldArray<u16, MAX_SKILLS, BASE>;

#[derive(Debug, Clone, PartialEq)]
pub struct SkillInfo {
    changes: ChangeMask<BLOCKS>,
    skill_line_id: SkillArray<{ bit::SKILL_LINE_ID }>,
    skill_step: SkillArray<{ bit::SKILL_STEP }>,
    skill_rank: SkillArray<{ bit::SKILL_RANK }>,
    skill_starting_rank: SkillArray<{ bit::SKILL_STARTING_RANK }>,
    skill_max_rank: SkillArray<{ bit::SKILL_MAX_RANK }>,
    skill_temp_bonus: SkillArray<{ bit::SKILL_TEMP_BONUS }>,
    skill_perm_bonus: SkillArray<{ bit::SKILL_PERM_BONUS }>,
}

impl Default for SkillInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillInfo {
    #[must_use]
    pub fn new() -> Self {
        Self {
            changes: ChangeMask::for_layout(&LAYOUT),
            skill_line_id: SkillArray::default(),
            skill_step: SkillArray::default(),
            skill_rank: SkillArray::default(),
            skill_starting_rank: SkillArray::default(),
            skill_max_rank: SkillArray::default(),
            skill_temp_bonus: SkillArray::default(),
            skill_perm_bonus: SkillArray::default(),
        }
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

    /// Reads slot `slot` across all seven arrays.
    #[must_use]
    pub fn entry(&self, slot: usize) -> SkillEntry {
        SkillEntry {
            line_id: *self.skill_line_id.get(slot),
            step: *self.skill_step.get(slot),
            rank: *self.skill_rank.get(slot),
            starting_rank: *self.skill_starting_rank.get(slot),
            max_rank: *self.skill_max_rank.get(slot),
            temp_bonus: *self.skill_temp_bonus.get(slot),
            perm_bonus: *self.skill_perm_bonus.get(slot),
        }
    }

    /// Stores `entry` in slot `slot`, marking only the columns that differ.
    pub fn set_entry(&mut self, slot: usize, entry: SkillEntry) {
        let changes = &mut self.changes;
        self.skill_line_id.set(slot, entry.line_id, changes);
        self.skill_step.set(slot, entry.step, changes);
        self.skill_rank.set(slot, entry.rank, changes);
        self.skill_starting_rank.set(slot, entry.starting_rank, changes);
        self.skill_max_rank.set(slot, entry.max_rank, changes);
        self.skill_temp_bonus.set(slot, entry.temp_bonus, changes);
        self.skill_perm_bonus.set(slot, entry.perm_bonus, changes);
    }

    /// Slot holding skill line `line_id`.
    #[must_use]
    pub fn find(&self, line_id: u16) -> Option<usize> {
        if line_id == 0 {
            return None;
        }
        self.skill_line_id.iter().position(|line| *line == line_id)
    }

    /// First slot without a skill line.
    #[must_use]
    pub fn free_slot(&self) -> Option<usize> {
        self.skill_line_id.iter().position(|line| *line == 0)
    }

    /// Current rank in `line_id` including bonuses, if the skill is known.
    #[must_use]
    pub fn rank_of(&self, line_id: u16) -> Option<u32> {
        let entry = self.entry(self.find(line_id)?);
        Some(u32::from(entry.rank) + u32::from(entry.temp_bonus) + u32::from(entry.perm_bonus))
    }
}

impl SlotValue for SkillInfo {
    fn clear_nested_changes(&mut self) {
        self.changes.reset_all();
    }

    fn mark_nested_changes(&mut self) {
        self.changes.set_all();
    }
}

impl<V: ?Sized> UpdateRecord<V> for SkillInfo {
    fn write_create(&self, data: &mut BitWriter, _flags: UpdateFieldFlags, _view: &V) {
        for column in self.columns() {
            for value in column {
                data.write_u16(*value);
            }
        }
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
        write_changed(data, &self.skill_line_id, &mask);
        write_changed(data, &self.skill_step, &mask);
        write_changed(data, &self.skill_rank, &mask);
        write_changed(data, &self.skill_starting_rank, &mask);
        write_changed(data, &self.skill_max_rank, &mask);
        write_changed(data, &self.skill_temp_bonus, &mask);
        write_changed(data, &self.skill_perm_bonus, &mask);
    }

    fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }
}

fn write_changed<const BASE: u32>(
    data: &mut BitWriter,
    column: &SkillArray<BASE>,
    mask: &ChangeMask<BLOCKS>,
) {
    for (_, value) in column.changed(mask) {
        data.write_u16(*value);
    }
}

impl SkillInfo {
    fn columns(&self) -> [std::slice::Iter<'_, u16>; 7] {
        [
            self.skill_line_id.iter(),
            self.skill_step.iter(),
            self.skill_rank.iter(),
            self.skill_starting_rank.iter(),
            self.skill_max_rank.iter(),
            self.skill_temp_bonus.iter(),
            self.skill_perm_bonus.iter(),
        ]
    }
}
