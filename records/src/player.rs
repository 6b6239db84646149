//! Player character state visible to other players.

use bitstream::BitWriter;
use fields::{
    AllowedMask, ChangeMask, DynamicUpdateField, ObjectGuid, SlotValue, UpdateField,
    UpdateFieldArray, UpdateFieldFlags, UpdateRecord, DEFAULT_SIZE_BITS,
};
use schema::{RecordLayout, Section, Slot};
use tracing::warn;

use crate::customization::ChrCustomizationChoice;
use crate::item::VisibleItem;
use crate::quest::QuestLog;
use crate::view::ViewContext;

/// Equipment slots shown on the character model.
pub const MAX_VISIBLE_ITEMS: usize = 19;
/// Longest name the 6-bit length prefix can describe, in bytes.
pub const MAX_NAME_LEN: usize = 63;

const NAME_LEN_BITS: u32 = 6;

pub const LAYOUT: RecordLayout = RecordLayout::new(
    "PlayerData",
    &[
        Section::group(
            "player",
            &[
                Slot::scalar("duel_arbiter"),
                Slot::scalar("wow_account"),
                Slot::dynamic("customizations"),
                Slot::dynamic("quest_log").visible_to(
                    UpdateFieldFlags::OWNER.union(UpdateFieldFlags::PARTY_MEMBER),
                ),
                Slot::scalar("player_flags"),
                Slot::scalar("guild_guid"),
                Slot::scalar("guild_rank_id"),
                Slot::scalar("name"),
                Slot::scalar("native_sex"),
                Slot::scalar("honor_level"),
                Slot::scalar("has_quest_session"),
            ],
        ),
        Section::array(Slot::nested("visible_items"), MAX_VISIBLE_ITEMS as u32),
        Section::array(Slot::scalar("avg_item_level"), 4),
    ],
);
pub const BLOCKS: usize = LAYOUT.block_count();
const ALLOWED: AllowedMask<BLOCKS> = AllowedMask::from_layout(&LAYOUT);
const QUEST_LOG_VISIBILITY: UpdateFieldFlags = LAYOUT.visibility_of("quest_log");

pub mod bit {
    use super::LAYOUT;

    pub const PLAYER: u32 = LAYOUT.bit_of("player");
    pub const DUEL_ARBITER: u32 = LAYOUT.bit_of("duel_arbiter");
    pub const WOW_ACCOUNT: u32 = LAYOUT.bit_of("wow_account");
    pub const CUSTOMIZATIONS: u32 = LAYOUT.bit_of("customizations");
    pub const QUEST_LOG: u32 = LAYOUT.bit_of("quest_log");
    pub const PLAYER_FLAGS: u32 = LAYOUT.bit_of("player_flags");
    pub const GUILD_GUID: u32 = LAYOUT.bit_of("guild_guid");
    pub const GUILD_RANK_ID: u32 = LAYOUT.bit_of("guild_rank_id");
    pub const NAME: u32 = LAYOUT.bit_of("name");
    pub const NATIVE_SEX: u32 = LAYOUT.bit_of("native_sex");
    pub const HONOR_LEVEL: u32 = LAYOUT.bit_of("honor_level");
    pub const HAS_QUEST_SESSION: u32 = LAYOUT.bit_of("has_quest_session");
    pub const VISIBLE_ITEMS: u32 = LAYOUT.bit_of("visible_items");
    pub const AVG_ITEM_LEVEL: u32 = LAYOUT.bit_of("avg_item_level");
}

type PlayerField<T, const BIT: u32> = UpdateField<T, { bit::PLAYER }, BIT>;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerData {
    changes: ChangeMask<BLOCKS>,
    duel_arbiter: PlayerField<ObjectGuid, { bit::DUEL_ARBITER }>,
    wow_account: PlayerField<ObjectGuid, { bit::WOW_ACCOUNT }>,
    customizations:
        DynamicUpdateField<ChrCustomizationChoice, { bit::PLAYER }, { bit::CUSTOMIZATIONS }>,
    quest_log: DynamicUpdateField<QuestLog, { bit::PLAYER }, { bit::QUEST_LOG }>,
    player_flags: PlayerField<u32, { bit::PLAYER_FLAGS }>,
    guild_guid: PlayerField<ObjectGuid, { bit::GUILD_GUID }>,
    guild_rank_id: PlayerField<u32, { bit::GUILD_RANK_ID }>,
    name: PlayerField<String, { bit::NAME }>,
    native_sex: PlayerField<u8, { bit::NATIVE_SEX }>,
    honor_level: PlayerField<i32, { bit::HONOR_LEVEL }>,
    has_quest_session: PlayerField<bool, { bit::HAS_QUEST_SESSION }>,
    visible_items: UpdateFieldArray<VisibleItem, MAX_VISIBLE_ITEMS, { bit::VISIBLE_ITEMS }>,
    avg_item_level: UpdateFieldArray<f32, 4, { bit::AVG_ITEM_LEVEL }>,
}

impl Default for PlayerData {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerData {
    #[must_use]
    pub fn new() -> Self {
        Self {
            changes: ChangeMask::for_layout(&LAYOUT),
            duel_arbiter: UpdateField::default(),
            wow_account: UpdateField::default(),
            customizations: DynamicUpdateField::new(),
            quest_log: DynamicUpdateField::new(),
            player_flags: UpdateField::default(),
            guild_guid: UpdateField::default(),
            guild_rank_id: UpdateField::default(),
            name: UpdateField::default(),
            native_sex: UpdateField::default(),
            honor_level: UpdateField::default(),
            has_quest_session: UpdateField::default(),
            visible_items: UpdateFieldArray::default(),
            avg_item_level: UpdateFieldArray::default(),
        }
    }

    #[must_use]
    pub const fn changes(&self) -> &ChangeMask<BLOCKS> {
        &self.changes
    }

    scalar_accessors! {
        duel_arbiter, set_duel_arbiter: ObjectGuid;
        wow_account, set_wow_account: ObjectGuid;
        player_flags, set_player_flags: u32;
        guild_guid, set_guild_guid: ObjectGuid;
        guild_rank_id, set_guild_rank_id: u32;
        native_sex, set_native_sex: u8;
        honor_level, set_honor_level: i32;
        has_quest_session, set_has_quest_session: bool;
    }

    array_accessors! {
        avg_item_level, set_avg_item_level: f32;
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.get()
    }

    /// Stores the character name, cut to [`MAX_NAME_LEN`] bytes on a char
    /// boundary.
    pub fn set_name(&mut self, name: &str) -> bool {
        let mut end = name.len().min(MAX_NAME_LEN);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        if end < name.len() {
            warn!(len = name.len(), max = MAX_NAME_LEN, "player name truncated");
        }
        self.name.set(name[..end].to_owned(), &mut self.changes)
    }

    #[must_use]
    pub fn customizations(&self) -> &[ChrCustomizationChoice] {
        self.customizations.as_slice()
    }

    /// Selects `choice_id` for `option_id`, adding the option if needed.
    pub fn set_customization(&mut self, option_id: u32, choice_id: u32) -> bool {
        match self
            .customizations
            .iter()
            .position(|choice| choice.option_id() == option_id)
        {
            Some(index) if self.customizations.as_slice()[index].choice_id() == choice_id => false,
            Some(index) => self
                .customizations
                .modify(index, &mut self.changes)
                .set_choice_id(choice_id),
            None => {
                self.customizations.push(
                    ChrCustomizationChoice::new(option_id, choice_id),
                    &mut self.changes,
                );
                true
            }
        }
    }

    #[must_use]
    pub fn quest_log(&self) -> &[QuestLog] {
        self.quest_log.as_slice()
    }

    /// Adds an entry for `quest_id`, returning its index.
    pub fn add_quest(&mut self, quest_id: i32) -> usize {
        self.quest_log.push(QuestLog::new(quest_id), &mut self.changes)
    }

    /// Removes the entry for `quest_id`; later entries shift down.
    pub fn remove_quest(&mut self, quest_id: i32) -> bool {
        let Some(index) = self
            .quest_log
            .iter()
            .position(|quest| quest.quest_id() == quest_id)
        else {
            return false;
        };
        self.quest_log.remove(index, &mut self.changes);
        true
    }

    /// Marks entry `index` and hands it out.
    pub fn quest_mut(&mut self, index: usize) -> &mut QuestLog {
        self.quest_log.modify(index, &mut self.changes)
    }

    #[must_use]
    pub fn visible_item(&self, slot: usize) -> &VisibleItem {
        self.visible_items.get(slot)
    }

    /// Marks visible item `slot` and hands it out.
    pub fn visible_item_mut(&mut self, slot: usize) -> &mut VisibleItem {
        self.visible_items.modify(slot, &mut self.changes)
    }

    /// Shows `item_id` in equipment slot `slot`.
    pub fn set_visible_item(&mut self, slot: usize, item_id: i32) -> bool {
        if self.visible_items.get(slot).item_id() == item_id {
            return false;
        }
        self.visible_item_mut(slot).set_item_id(item_id)
    }
}

impl SlotValue for PlayerData {
    fn clear_nested_changes(&mut self) {
        self.changes.reset_all();
        self.customizations.clear_changes();
        self.quest_log.clear_changes();
        self.visible_items.clear_nested_changes();
    }

    fn mark_nested_changes(&mut self) {
        self.changes.set_all();
        self.customizations.mark_nested_changes();
        self.quest_log.mark_nested_changes();
        self.visible_items.mark_nested_changes();
    }
}

impl UpdateRecord<ViewContext<'_>> for PlayerData {
    fn write_create(&self, data: &mut BitWriter, flags: UpdateFieldFlags, view: &ViewContext<'_>) {
        self.duel_arbiter().write(data);
        self.wow_account().write(data);
        self.customizations.write_create_records(data, flags, view);
        if flags.admits(QUEST_LOG_VISIBILITY) {
            self.quest_log.write_create_records(data, flags, view);
        }
        data.write_u32(self.player_flags());
        self.guild_guid().write(data);
        data.write_u32(self.guild_rank_id());
        data.write_bits(self.name().len() as u64, NAME_LEN_BITS);
        data.write_bit(self.has_quest_session());
        data.flush_bits();
        data.write_string(self.name());
        data.write_u8(self.native_sex());
        data.write_i32(self.honor_level());
        for item in self.visible_items.iter() {
            item.write_create(data, flags, view);
        }
        for level in self.avg_item_level.iter() {
            data.write_f32(*level);
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
        if mask.get(bit::PLAYER) {
            if mask.get(bit::CUSTOMIZATIONS) {
                self.customizations
                    .write_update_mask(data, DEFAULT_SIZE_BITS, ignore_nested);
            }
            if mask.get(bit::QUEST_LOG) {
                self.quest_log
                    .write_update_mask(data, DEFAULT_SIZE_BITS, ignore_nested);
            }
            if mask.get(bit::NAME) {
                data.write_bits(self.name().len() as u64, NAME_LEN_BITS);
            }
            if mask.get(bit::HAS_QUEST_SESSION) {
                data.write_bit(self.has_quest_session());
            }
        }
        data.flush_bits();
        if mask.get(bit::PLAYER) {
            if mask.get(bit::DUEL_ARBITER) {
                self.duel_arbiter().write(data);
            }
            if mask.get(bit::WOW_ACCOUNT) {
                self.wow_account().write(data);
            }
            if mask.get(bit::CUSTOMIZATIONS) {
                self.customizations
                    .write_update_records(data, flags, ignore_nested, view);
            }
            if mask.get(bit::QUEST_LOG) {
                self.quest_log
                    .write_update_records(data, flags, ignore_nested, view);
            }
            if mask.get(bit::PLAYER_FLAGS) {
                data.write_u32(self.player_flags());
            }
            if mask.get(bit::GUILD_GUID) {
                self.guild_guid().write(data);
            }
            if mask.get(bit::GUILD_RANK_ID) {
                data.write_u32(self.guild_rank_id());
            }
            if mask.get(bit::NAME) {
                data.write_string(self.name());
            }
            if mask.get(bit::NATIVE_SEX) {
                data.write_u8(self.native_sex());
            }
            if mask.get(bit::HONOR_LEVEL) {
                data.write_i32(self.honor_level());
            }
        }
        for (_, item) in self.visible_items.changed(&mask) {
            item.write_update(data, flags, ignore_nested, view);
        }
        for (_, level) in self.avg_item_level.changed(&mask) {
            data.write_f32(*level);
        }
    }

    fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }

    fn has_visible_changes(&self, flags: UpdateFieldFlags) -> bool {
        ALLOWED.admits_any(&self.changes, flags)
    }
}
