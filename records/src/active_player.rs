//! State only the controlling player receives.

use bitstream::BitWriter;
use fields::{
    AllowedMask, ChangeMask, DynamicUpdateField, ObjectGuid, SlotValue, UpdateField,
    UpdateFieldArray, UpdateFieldFlags, UpdateRecord, DEFAULT_SIZE_BITS,
};
use schema::{RecordLayout, Section, Slot};
use tracing::warn;

use crate::skill::SkillInfo;
use crate::view::ViewContext;

/// Bag, bank and equipment slots.
pub const MAX_INVENTORY_SLOTS: usize = 141;
/// 64-bit words of explored-area bits.
pub const EXPLORED_ZONES_SIZE: usize = 240;
/// Upper bound on the 64-bit words of the title and completed-quest sets.
/// Bits past `MAX_BITSET_WORDS * 64` are rejected.
pub const MAX_BITSET_WORDS: usize = 2048;

pub const LAYOUT: RecordLayout = RecordLayout::new(
    "ActivePlayerData",
    &[
        Section::group(
            "active_player",
            &[
                Slot::dynamic("known_titles"),
                Slot::dynamic("completed_quests"),
                Slot::scalar("coinage"),
                Slot::scalar("xp"),
                Slot::scalar("next_level_xp"),
                Slot::nested("skill"),
            ],
        ),
        Section::array(Slot::scalar("inventory_slots"), MAX_INVENTORY_SLOTS as u32),
        Section::array(Slot::scalar("explored_zones"), EXPLORED_ZONES_SIZE as u32),
    ],
);
pub const BLOCKS: usize = LAYOUT.block_count();
const ALLOWED: AllowedMask<BLOCKS> = AllowedMask::from_layout(&LAYOUT);

pub mod bit {
    use super::LAYOUT;

    pub const ACTIVE_PLAYER: u32 = LAYOUT.bit_of("active_player");
    pub const KNOWN_TITLES: u32 = LAYOUT.bit_of("known_titles");
    pub const COMPLETED_QUESTS: u32 = LAYOUT.bit_of("completed_quests");
    pub const COINAGE: u32 = LAYOUT.bit_of("coinage");
    pub const XP: u32 = LAYOUT.bit_of("xp");
    pub const NEXT_LEVEL_XP: u32 = LAYOUT.bit_of("next_level_xp");
    pub const SKILL: u32 = LAYOUT.bit_of("skill");
    pub const INVENTORY_SLOTS: u32 = LAYOUT.bit_of("inventory_slots");
    pub const EXPLORED_ZONES: u32 = LAYOUT.bit_of("explored_zones");
}

type ActiveField<T, const BIT: u32> = UpdateField<T, { bit::ACTIVE_PLAYER }, BIT>;
type BitSet<const BIT: u32> = DynamicUpdateField<u64, { bit::ACTIVE_PLAYER }, BIT>;

#[derive(Debug, Clone, PartialEq)]
pub struct ActivePlayerData {
    changes: ChangeMask<BLOCKS>,
    known_titles: BitSet<{ bit::KNOWN_TITLES }>,
    completed_quests: BitSet<{ bit::COMPLETED_QUESTS }>,
    coinage: ActiveField<u64, { bit::COINAGE }>,
    xp: ActiveField<i32, { bit::XP }>,
    next_level_xp: ActiveField<i32, { bit::NEXT_LEVEL_XP }>,
    skill: ActiveField<SkillInfo, { bit::SKILL }>,
    inventory_slots: UpdateFieldArray<ObjectGuid, MAX_INVENTORY_SLOTS, { bit::INVENTORY_SLOTS }>,
    explored_zones: UpdateFieldArray<u64, EXPLORED_ZONES_SIZE, { bit::EXPLORED_ZONES }>,
}

impl Default for ActivePlayerData {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivePlayerData {
    #[must_use]
    pub fn new() -> Self {
        Self {
            changes: ChangeMask::for_layout(&LAYOUT),
            known_titles: DynamicUpdateField::new(),
            completed_quests: DynamicUpdateField::new(),
            coinage: UpdateField::default(),
            xp: UpdateField::default(),
            next_level_xp: UpdateField::default(),
            skill: UpdateField::default(),
            inventory_slots: UpdateFieldArray::default(),
            explored_zones: UpdateFieldArray::default(),
        }
    }

    #[must_use]
    pub const fn changes(&self) -> &ChangeMask<BLOCKS> {
        &self.changes
    }

    scalar_accessors! {
        coinage, set_coinage: u64;
        xp, set_xp: i32;
        next_level_xp, set_next_level_xp: i32;
    }

    array_accessors! {
        inventory_slots, set_inventory_slot: ObjectGuid;
        /// Raw words; prefer [`Self::add_explored`].
        explored_zones, set_explored_zone_word: u64;
    }

    /// Adds `amount` copper, saturating at the field's range.
    pub fn modify_coinage(&mut self, amount: i64) -> bool {
        let coinage = self.coinage().saturating_add_signed(amount);
        self.set_coinage(coinage)
    }

    #[must_use]
    pub fn known_titles(&self) -> &[u64] {
        self.known_titles.as_slice()
    }

    #[must_use]
    pub fn has_title(&self, bit_index: u32) -> bool {
        bitset_contains(self.known_titles.as_slice(), bit_index)
    }

    /// Sets title bit `bit_index`; returns `false` if it was already set or
    /// lies past [`MAX_BITSET_WORDS`].
    pub fn add_title(&mut self, bit_index: u32) -> bool {
        bitset_insert(&mut self.known_titles, bit_index, &mut self.changes)
    }

    #[must_use]
    pub fn completed_quests(&self) -> &[u64] {
        self.completed_quests.as_slice()
    }

    #[must_use]
    pub fn has_completed_quest(&self, quest_bit: u32) -> bool {
        bitset_contains(self.completed_quests.as_slice(), quest_bit)
    }

    pub fn add_completed_quest(&mut self, quest_bit: u32) -> bool {
        bitset_insert(&mut self.completed_quests, quest_bit, &mut self.changes)
    }

    #[must_use]
    pub fn has_explored(&self, area_bit: u32) -> bool {
        let word = (area_bit / 64) as usize;
        word < EXPLORED_ZONES_SIZE && self.explored_zones.get(word) & (1 << (area_bit % 64)) != 0
    }

    /// Sets explore bit `area_bit`. Bits past the array are ignored.
    pub fn add_explored(&mut self, area_bit: u32) -> bool {
        let word = (area_bit / 64) as usize;
        if word >= EXPLORED_ZONES_SIZE {
            warn!(area_bit, "explore bit out of range, ignored");
            return false;
        }
        let value = *self.explored_zones.get(word) | (1 << (area_bit % 64));
        self.explored_zones.set(word, value, &mut self.changes)
    }

    #[must_use]
    pub fn skill(&self) -> &SkillInfo {
        self.skill.get()
    }

    /// Marks the skill record and hands it out.
    pub fn skill_mut(&mut self) -> &mut SkillInfo {
        self.skill.modify(&mut self.changes)
    }
}

fn bitset_contains(words: &[u64], bit: u32) -> bool {
    words
        .get((bit / 64) as usize)
        .is_some_and(|word| word & (1 << (bit % 64)) != 0)
}

fn bitset_insert<const BIT: u32, const B: usize>(
    set: &mut BitSet<BIT>,
    bit: u32,
    mask: &mut ChangeMask<B>,
) -> bool {
    let word = (bit / 64) as usize;
    if word >= MAX_BITSET_WORDS {
        warn!(bit, max_words = MAX_BITSET_WORDS, "bitset bit out of range, ignored");
        return false;
    }
    while set.len() <= word {
        set.push(0, mask);
    }
    let current = set.get(word).copied().unwrap_or_default();
    set.set(word, current | (1 << (bit % 64)), mask)
}

impl SlotValue for ActivePlayerData {
    fn clear_nested_changes(&mut self) {
        self.changes.reset_all();
        self.known_titles.clear_changes();
        self.completed_quests.clear_changes();
        self.skill.clear_nested_changes();
    }

    fn mark_nested_changes(&mut self) {
        self.changes.set_all();
        self.known_titles.mark_nested_changes();
        self.completed_quests.mark_nested_changes();
        self.skill.mark_nested_changes();
    }
}

impl UpdateRecord<ViewContext<'_>> for ActivePlayerData {
    fn write_create(&self, data: &mut BitWriter, flags: UpdateFieldFlags, view: &ViewContext<'_>) {
        self.known_titles.write_create_values(data);
        self.completed_quests.write_create_values(data);
        data.write_u64(self.coinage());
        data.write_i32(self.xp());
        data.write_i32(self.next_level_xp());
        self.skill().write_create(data, flags, view);
        for guid in self.inventory_slots.iter() {
            guid.write(data);
        }
        for word in self.explored_zones.iter() {
            data.write_u64(*word);
        }
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
        if mask.get(bit::ACTIVE_PLAYER) {
            if mask.get(bit::KNOWN_TITLES) {
                self.known_titles
                    .write_update_mask(data, DEFAULT_SIZE_BITS, ignore_nested);
            }
            if mask.get(bit::COMPLETED_QUESTS) {
                self.completed_quests
                    .write_update_mask(data, DEFAULT_SIZE_BITS, ignore_nested);
            }
        }
        data.flush_bits();
        if mask.get(bit::ACTIVE_PLAYER) {
            if mask.get(bit::KNOWN_TITLES) {
                self.known_titles.write_update_values(data, ignore_nested);
            }
            if mask.get(bit::COMPLETED_QUESTS) {
                self.completed_quests
                    .write_update_values(data, ignore_nested);
            }
            if mask.get(bit::COINAGE) {
                data.write_u64(self.coinage());
            }
            if mask.get(bit::XP) {
                data.write_i32(self.xp());
            }
            if mask.get(bit::NEXT_LEVEL_XP) {
                data.write_i32(self.next_level_xp());
            }
            if mask.get(bit::SKILL) {
                self.skill().write_update(data, flags, ignore_nested, view);
            }
        }
        for (_, guid) in self.inventory_slots.changed(&mask) {
            guid.write(data);
        }
        for (_, word) in self.explored_zones.changed(&mask) {
            data.write_u64(*word);
        }
    }

    fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }

    fn has_visible_changes(&self, flags: UpdateFieldFlags) -> bool {
        ALLOWED.admits_any(&self.changes, flags)
    }
}
