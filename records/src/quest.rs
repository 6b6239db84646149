//! Quest log entries, shared with party members.

use bitstream::BitWriter;
use fields::{
    AllowedMask, ChangeMask, SlotValue, UpdateField, UpdateFieldArray, UpdateFieldFlags,
    UpdateRecord,
};
use schema::{RecordLayout, Section, Slot};

/// Objectives tracked per quest.
pub const MAX_OBJECTIVES: usize = 24;

pub const LAYOUT: RecordLayout = RecordLayout::new(
    "QuestLog",
    &[
        Section::group(
            "quest",
            &[
                Slot::scalar("quest_id"),
                Slot::scalar("state_flags"),
                Slot::scalar("end_time"),
                Slot::scalar("accepted_time"),
            ],
        ),
        Section::array(Slot::scalar("objective_progress"), MAX_OBJECTIVES as u32),
    ],
);
pub const BLOCKS: usize = LAYOUT.block_count();
const ALLOWED: AllowedMask<BLOCKS> = AllowedMask::from_layout(&LAYOUT);

pub mod bit {
    use super::LAYOUT;

    pub const QUEST: u32 = LAYOUT.bit_of("quest");
    pub const QUEST_ID: u32 = LAYOUT.bit_of("quest_id");
    pub const STATE_FLAGS: u32 = LAYOUT.bit_of("state_flags");
    pub const END_TIME: u32 = LAYOUT.bit_of("end_time");
    pub const ACCEPTED_TIME: u32 = LAYOUT.bit_of("accepted_time");
    pub const OBJECTIVE_PROGRESS: u32 = LAYOUT.bit_of("objective_progress");
}

/// Progress of one accepted quest.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestLog {
    changes: ChangeMask<BLOCKS>,
    quest_id: UpdateField<i32, { bit::QUEST }, { bit::QUEST_ID }>,
    state_flags: UpdateField<i32, { bit::QUEST }, { bit::STATE_FLAGS }>,
    end_time: UpdateField<i64, { bit::QUEST }, { bit::END_TIME }>,
    accepted_time: UpdateField<i64, { bit::QUEST }, { bit::ACCEPTED_TIME }>,
    objective_progress: UpdateFieldArray<i16, MAX_OBJECTIVES, { bit::OBJECTIVE_PROGRESS }>,
}

impl Default for QuestLog {
    fn default() -> Self {
        Self::new(0)
    }
}

impl QuestLog {
    #[must_use]
    pub fn new(quest_id: i32) -> Self {
        Self {
            changes: ChangeMask::for_layout(&LAYOUT),
            quest_id: UpdateField::new(quest_id),
            state_flags: UpdateField::default(),
            end_time: UpdateField::default(),
            accepted_time: UpdateField::default(),
            objective_progress: UpdateFieldArray::default(),
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

    scalar_accessors! {
        quest_id, set_quest_id: i32;
        state_flags, set_state_flags: i32;
        end_time, set_end_time: i64;
        accepted_time, set_accepted_time: i64;
    }

    array_accessors! {
        objective_progress, set_objective_progress: i16;
    }
}

impl SlotValue for QuestLog {
    fn clear_nested_changes(&mut self) {
        self.changes.reset_all();
    }

    fn mark_nested_changes(&mut self) {
        self.changes.set_all();
    }
}

impl<V: ?Sized> UpdateRecord<V> for QuestLog {
    fn write_create(&self, data: &mut BitWriter, _flags: UpdateFieldFlags, _view: &V) {
        data.write_i32(self.quest_id());
        data.write_i32(self.state_flags());
        data.write_i64(self.end_time());
        data.write_i64(self.accepted_time());
        for progress in self.objective_progress.iter() {
            data.write_i16(*progress);
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
        if mask.get(bit::QUEST) {
            if mask.get(bit::QUEST_ID) {
                data.write_i32(self.quest_id());
            }
            if mask.get(bit::STATE_FLAGS) {
                data.write_i32(self.state_flags());
            }
            if mask.get(bit::END_TIME) {
                data.write_i64(self.end_time());
            }
            if mask.get(bit::ACCEPTED_TIME) {
                data.write_i64(self.accepted_time());
            }
        }
        for (_, progress) in self.objective_progress.changed(&mask) {
            data.write_i16(*progress);
        }
    }

    fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }
}
