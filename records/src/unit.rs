//! Unit state shared by creatures and players.

use bitstream::BitWriter;
use fields::{
    AllowedMask, ChangeMask, DynamicUpdateField, ObjectGuid, SlotValue, UpdateField,
    UpdateFieldArray, UpdateFieldFlags, UpdateRecord, DEFAULT_SIZE_BITS,
};
use schema::{RecordLayout, Section, Slot};

use crate::item::VisibleItem;
use crate::projection;
use crate::spell::PassiveSpellHistory;
use crate::view::ViewContext;

/// Power types a unit can have.
pub const MAX_POWERS: usize = 10;
/// Primary stats.
pub const MAX_STATS: usize = 5;
/// Spell schools with a resistance value.
pub const MAX_RESISTANCES: usize = 7;
/// Main hand, off hand and ranged.
pub const MAX_VIRTUAL_ITEMS: usize = 3;

const OWNER: UpdateFieldFlags = UpdateFieldFlags::OWNER;
const OWNER_OR_EMPATH: UpdateFieldFlags = OWNER.union(UpdateFieldFlags::EMPATH);
const OWNER_OR_UNIT_ALL: UpdateFieldFlags = OWNER.union(UpdateFieldFlags::UNIT_ALL);

pub const LAYOUT: RecordLayout = RecordLayout::new(
    "UnitData",
    &[
        Section::group(
            "unit",
            &[
                Slot::dynamic("state_world_effect_ids"),
                Slot::dynamic("passive_spells"),
                Slot::dynamic("channel_objects"),
                Slot::scalar("health"),
                Slot::scalar("max_health"),
                Slot::scalar("display_id"),
                Slot::scalar("charm"),
                Slot::scalar("summon"),
                Slot::scalar("target"),
                Slot::scalar("level"),
                Slot::scalar("faction_template"),
                Slot::scalar("flags"),
                Slot::scalar("flags2"),
                Slot::scalar("aura_state"),
                Slot::scalar("mount_display_id"),
            ],
        ),
        Section::group(
            "combat",
            &[
                Slot::scalar("min_damage").visible_to(OWNER_OR_EMPATH),
                Slot::scalar("max_damage").visible_to(OWNER_OR_EMPATH),
                Slot::scalar("attack_power").visible_to(OWNER),
                Slot::scalar("mod_cast_speed").visible_to(OWNER_OR_UNIT_ALL),
            ],
        ),
        Section::array(Slot::scalar("npc_flags"), 2),
        Section::array(Slot::scalar("power"), MAX_POWERS as u32),
        Section::array(Slot::scalar("max_power"), MAX_POWERS as u32),
        Section::array(Slot::nested("virtual_items"), MAX_VIRTUAL_ITEMS as u32),
        Section::array(Slot::scalar("stats").visible_to(OWNER_OR_UNIT_ALL), MAX_STATS as u32),
        Section::array(
            Slot::scalar("resistances").visible_to(OWNER_OR_EMPATH),
            MAX_RESISTANCES as u32,
        ),
    ],
);
pub const BLOCKS: usize = LAYOUT.block_count();
const ALLOWED: AllowedMask<BLOCKS> = AllowedMask::from_layout(&LAYOUT);

pub mod bit {
    use super::LAYOUT;

    pub const UNIT: u32 = LAYOUT.bit_of("unit");
    pub const STATE_WORLD_EFFECT_IDS: u32 = LAYOUT.bit_of("state_world_effect_ids");
    pub const PASSIVE_SPELLS: u32 = LAYOUT.bit_of("passive_spells");
    pub const CHANNEL_OBJECTS: u32 = LAYOUT.bit_of("channel_objects");
    pub const HEALTH: u32 = LAYOUT.bit_of("health");
    pub const MAX_HEALTH: u32 = LAYOUT.bit_of("max_health");
    pub const DISPLAY_ID: u32 = LAYOUT.bit_of("display_id");
    pub const CHARM: u32 = LAYOUT.bit_of("charm");
    pub const SUMMON: u32 = LAYOUT.bit_of("summon");
    pub const TARGET: u32 = LAYOUT.bit_of("target");
    pub const LEVEL: u32 = LAYOUT.bit_of("level");
    pub const FACTION_TEMPLATE: u32 = LAYOUT.bit_of("faction_template");
    pub const FLAGS: u32 = LAYOUT.bit_of("flags");
    pub const FLAGS2: u32 = LAYOUT.bit_of("flags2");
    pub const AURA_STATE: u32 = LAYOUT.bit_of("aura_state");
    pub const MOUNT_DISPLAY_ID: u32 = LAYOUT.bit_of("mount_display_id");

    pub const COMBAT: u32 = LAYOUT.bit_of("combat");
    pub const MIN_DAMAGE: u32 = LAYOUT.bit_of("min_damage");
    pub const MAX_DAMAGE: u32 = LAYOUT.bit_of("max_damage");
    pub const ATTACK_POWER: u32 = LAYOUT.bit_of("attack_power");
    pub const MOD_CAST_SPEED: u32 = LAYOUT.bit_of("mod_cast_speed");

    pub const NPC_FLAGS: u32 = LAYOUT.bit_of("npc_flags");
    pub const POWER: u32 = LAYOUT.bit_of("power");
    pub const MAX_POWER: u32 = LAYOUT.bit_of("max_power");
    pub const VIRTUAL_ITEMS: u32 = LAYOUT.bit_of("virtual_items");
    pub const STATS: u32 = LAYOUT.bit_of("stats");
    pub const RESISTANCES: u32 = LAYOUT.bit_of("resistances");
}

mod vis {
    use schema::UpdateFieldFlags;

    use super::LAYOUT;

    pub const MIN_DAMAGE: UpdateFieldFlags = LAYOUT.visibility_of("min_damage");
    pub const MAX_DAMAGE: UpdateFieldFlags = LAYOUT.visibility_of("max_damage");
    pub const ATTACK_POWER: UpdateFieldFlags = LAYOUT.visibility_of("attack_power");
    pub const MOD_CAST_SPEED: UpdateFieldFlags = LAYOUT.visibility_of("mod_cast_speed");
    pub const STATS: UpdateFieldFlags = LAYOUT.visibility_of("stats");
    pub const RESISTANCES: UpdateFieldFlags = LAYOUT.visibility_of("resistances");
}

type UnitField<T, const BIT: u32> = UpdateField<T, { bit::UNIT }, BIT>;
type CombatField<T, const BIT: u32> = UpdateField<T, { bit::COMBAT }, BIT>;

#[derive(Debug, Clone, PartialEq)]
pub struct UnitData {
    changes: ChangeMask<BLOCKS>,
    state_world_effect_ids:
        DynamicUpdateField<i32, { bit::UNIT }, { bit::STATE_WORLD_EFFECT_IDS }>,
    passive_spells: DynamicUpdateField<PassiveSpellHistory, { bit::UNIT }, { bit::PASSIVE_SPELLS }>,
    channel_objects: DynamicUpdateField<ObjectGuid, { bit::UNIT }, { bit::CHANNEL_OBJECTS }>,
    health: UnitField<i64, { bit::HEALTH }>,
    max_health: UnitField<i64, { bit::MAX_HEALTH }>,
    display_id: UnitField<u32, { bit::DISPLAY_ID }>,
    charm: UnitField<ObjectGuid, { bit::CHARM }>,
    summon: UnitField<ObjectGuid, { bit::SUMMON }>,
    target: UnitField<ObjectGuid, { bit::TARGET }>,
    level: UnitField<i32, { bit::LEVEL }>,
    faction_template: UnitField<u32, { bit::FACTION_TEMPLATE }>,
    flags: UnitField<u32, { bit::FLAGS }>,
    flags2: UnitField<u32, { bit::FLAGS2 }>,
    aura_state: UnitField<u32, { bit::AURA_STATE }>,
    mount_display_id: UnitField<u32, { bit::MOUNT_DISPLAY_ID }>,
    min_damage: CombatField<f32, { bit::MIN_DAMAGE }>,
    max_damage: CombatField<f32, { bit::MAX_DAMAGE }>,
    attack_power: CombatField<i32, { bit::ATTACK_POWER }>,
    mod_cast_speed: CombatField<f32, { bit::MOD_CAST_SPEED }>,
    npc_flags: UpdateFieldArray<u32, 2, { bit::NPC_FLAGS }>,
    power: UpdateFieldArray<i32, MAX_POWERS, { bit::POWER }>,
    max_power: UpdateFieldArray<i32, MAX_POWERS, { bit::MAX_POWER }>,
    virtual_items: UpdateFieldArray<VisibleItem, MAX_VIRTUAL_ITEMS, { bit::VIRTUAL_ITEMS }>,
    stats: UpdateFieldArray<i32, MAX_STATS, { bit::STATS }>,
    resistances: UpdateFieldArray<i32, MAX_RESISTANCES, { bit::RESISTANCES }>,
}

impl Default for UnitData {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitData {
    #[must_use]
    pub fn new() -> Self {
        Self {
            changes: ChangeMask::for_layout(&LAYOUT),
            state_world_effect_ids: DynamicUpdateField::new(),
            passive_spells: DynamicUpdateField::new(),
            channel_objects: DynamicUpdateField::new(),
            health: UpdateField::default(),
            max_health: UpdateField::default(),
            display_id: UpdateField::default(),
            charm: UpdateField::default(),
            summon: UpdateField::default(),
            target: UpdateField::default(),
            level: UpdateField::default(),
            faction_template: UpdateField::default(),
            flags: UpdateField::default(),
            flags2: UpdateField::default(),
            aura_state: UpdateField::default(),
            mount_display_id: UpdateField::default(),
            min_damage: UpdateField::default(),
            max_damage: UpdateField::default(),
            attack_power: UpdateField::default(),
            mod_cast_speed: UpdateField::new(1.0),
            npc_flags: UpdateFieldArray::default(),
            power: UpdateFieldArray::default(),
            max_power: UpdateFieldArray::default(),
            virtual_items: UpdateFieldArray::default(),
            stats: UpdateFieldArray::default(),
            resistances: UpdateFieldArray::default(),
        }
    }

    #[must_use]
    pub const fn changes(&self) -> &ChangeMask<BLOCKS> {
        &self.changes
    }

    scalar_accessors! {
        health, set_health: i64;
        max_health, set_max_health: i64;
        /// Stored model; receivers get [`projection::display_id`] of it.
        display_id, set_display_id: u32;
        charm, set_charm: ObjectGuid;
        summon, set_summon: ObjectGuid;
        target, set_target: ObjectGuid;
        level, set_level: i32;
        /// Stored faction; receivers get [`projection::faction_template`] of it.
        faction_template, set_faction_template: u32;
        /// Stored [`UnitFlags`](crate::UnitFlags) bits; receivers get
        /// [`projection::unit_flags`] of them.
        flags, set_flags: u32;
        flags2, set_flags2: u32;
        aura_state, set_aura_state: u32;
        mount_display_id, set_mount_display_id: u32;
        min_damage, set_min_damage: f32;
        max_damage, set_max_damage: f32;
        attack_power, set_attack_power: i32;
        mod_cast_speed, set_mod_cast_speed: f32;
    }

    array_accessors! {
        /// Index 0 holds [`NpcFlags`](crate::NpcFlags) and is projected per receiver.
        npc_flags, set_npc_flags: u32;
        power, set_power: i32;
        max_power, set_max_power: i32;
        stats, set_stats: i32;
        resistances, set_resistances: i32;
    }

    #[must_use]
    pub fn state_world_effect_ids(&self) -> &[i32] {
        self.state_world_effect_ids.as_slice()
    }

    pub fn add_state_world_effect(&mut self, effect_id: i32) {
        self.state_world_effect_ids.push(effect_id, &mut self.changes);
    }

    /// Returns `true` if the effect was present.
    pub fn remove_state_world_effect(&mut self, effect_id: i32) -> bool {
        self.state_world_effect_ids
            .remove_value(&effect_id, &mut self.changes)
            .is_some()
    }

    #[must_use]
    pub fn passive_spells(&self) -> &[PassiveSpellHistory] {
        self.passive_spells.as_slice()
    }

    pub fn add_passive_spell(&mut self, spell_id: i32, aura_spell_id: i32) -> usize {
        self.passive_spells
            .push(PassiveSpellHistory::new(spell_id, aura_spell_id), &mut self.changes)
    }

    /// Removes the entry for `spell_id`; later entries shift down.
    pub fn remove_passive_spell(&mut self, spell_id: i32) -> bool {
        let Some(index) = self
            .passive_spells
            .iter()
            .position(|spell| spell.spell_id() == spell_id)
        else {
            return false;
        };
        self.passive_spells.remove(index, &mut self.changes);
        true
    }

    /// Marks entry `index` and hands it out; its own setters track which
    /// of its fields change.
    pub fn passive_spell_mut(&mut self, index: usize) -> &mut PassiveSpellHistory {
        self.passive_spells.modify(index, &mut self.changes)
    }

    #[must_use]
    pub fn channel_objects(&self) -> &[ObjectGuid] {
        self.channel_objects.as_slice()
    }

    pub fn add_channel_object(&mut self, guid: ObjectGuid) {
        self.channel_objects.push(guid, &mut self.changes);
    }

    pub fn clear_channel_objects(&mut self) {
        if !self.channel_objects.is_empty() {
            self.channel_objects.clear(&mut self.changes);
        }
    }

    #[must_use]
    pub fn virtual_item(&self, index: usize) -> &VisibleItem {
        self.virtual_items.get(index)
    }

    /// Marks virtual item `index` and hands it out.
    pub fn virtual_item_mut(&mut self, index: usize) -> &mut VisibleItem {
        self.virtual_items.modify(index, &mut self.changes)
    }

    /// Shows `item_id` in virtual slot `index`.
    pub fn set_virtual_item(&mut self, index: usize, item_id: i32) -> bool {
        if self.virtual_items.get(index).item_id() == item_id {
            return false;
        }
        self.virtual_item_mut(index).set_item_id(item_id)
    }
}

impl SlotValue for UnitData {
    fn clear_nested_changes(&mut self) {
        self.changes.reset_all();
        self.state_world_effect_ids.clear_changes();
        self.passive_spells.clear_changes();
        self.channel_objects.clear_changes();
        self.virtual_items.clear_nested_changes();
    }

    fn mark_nested_changes(&mut self) {
        self.changes.set_all();
        self.state_world_effect_ids.mark_nested_changes();
        self.passive_spells.mark_nested_changes();
        self.channel_objects.mark_nested_changes();
        self.virtual_items.mark_nested_changes();
    }
}

impl UpdateRecord<ViewContext<'_>> for UnitData {
    fn write_create(&self, data: &mut BitWriter, flags: UpdateFieldFlags, view: &ViewContext<'_>) {
        self.state_world_effect_ids.write_create_values(data);
        self.passive_spells.write_create_records(data, flags, view);
        self.channel_objects.write_create_values(data);
        data.write_i64(self.health());
        data.write_i64(self.max_health());
        data.write_u32(projection::display_id(self.display_id(), view));
        self.charm().write(data);
        self.summon().write(data);
        self.target().write(data);
        data.write_i32(self.level());
        data.write_u32(projection::faction_template(self.faction_template(), view));
        data.write_u32(projection::unit_flags(self.flags(), view));
        data.write_u32(self.flags2());
        data.write_u32(self.aura_state());
        data.write_u32(self.mount_display_id());
        if flags.admits(vis::MIN_DAMAGE) {
            data.write_f32(self.min_damage());
        }
        if flags.admits(vis::MAX_DAMAGE) {
            data.write_f32(self.max_damage());
        }
        if flags.admits(vis::ATTACK_POWER) {
            data.write_i32(self.attack_power());
        }
        if flags.admits(vis::MOD_CAST_SPEED) {
            data.write_f32(self.mod_cast_speed());
        }
        for (index, value) in self.npc_flags.iter().enumerate() {
            data.write_u32(project_npc_flags(index, *value, view));
        }
        for value in self.power.iter().chain(self.max_power.iter()) {
            data.write_i32(*value);
        }
        for item in self.virtual_items.iter() {
            item.write_create(data, flags, view);
        }
        if flags.admits(vis::STATS) {
            for value in self.stats.iter() {
                data.write_i32(*value);
            }
        }
        if flags.admits(vis::RESISTANCES) {
            for value in self.resistances.iter() {
                data.write_i32(*value);
            }
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
        if mask.get(bit::UNIT) {
            if mask.get(bit::STATE_WORLD_EFFECT_IDS) {
                self.state_world_effect_ids
                    .write_update_mask(data, DEFAULT_SIZE_BITS, ignore_nested);
            }
            if mask.get(bit::PASSIVE_SPELLS) {
                self.passive_spells
                    .write_update_mask(data, DEFAULT_SIZE_BITS, ignore_nested);
            }
            if mask.get(bit::CHANNEL_OBJECTS) {
                self.channel_objects
                    .write_update_mask(data, DEFAULT_SIZE_BITS, ignore_nested);
            }
        }
        data.flush_bits();
        if mask.get(bit::UNIT) {
            if mask.get(bit::STATE_WORLD_EFFECT_IDS) {
                self.state_world_effect_ids
                    .write_update_values(data, ignore_nested);
            }
            if mask.get(bit::PASSIVE_SPELLS) {
                self.passive_spells
                    .write_update_records(data, flags, ignore_nested, view);
            }
            if mask.get(bit::CHANNEL_OBJECTS) {
                self.channel_objects.write_update_values(data, ignore_nested);
            }
            if mask.get(bit::HEALTH) {
                data.write_i64(self.health());
            }
            if mask.get(bit::MAX_HEALTH) {
                data.write_i64(self.max_health());
            }
            if mask.get(bit::DISPLAY_ID) {
                data.write_u32(projection::display_id(self.display_id(), view));
            }
            if mask.get(bit::CHARM) {
                self.charm().write(data);
            }
            if mask.get(bit::SUMMON) {
                self.summon().write(data);
            }
            if mask.get(bit::TARGET) {
                self.target().write(data);
            }
            if mask.get(bit::LEVEL) {
                data.write_i32(self.level());
            }
            if mask.get(bit::FACTION_TEMPLATE) {
                data.write_u32(projection::faction_template(self.faction_template(), view));
            }
            if mask.get(bit::FLAGS) {
                data.write_u32(projection::unit_flags(self.flags(), view));
            }
            if mask.get(bit::FLAGS2) {
                data.write_u32(self.flags2());
            }
            if mask.get(bit::AURA_STATE) {
                data.write_u32(self.aura_state());
            }
            if mask.get(bit::MOUNT_DISPLAY_ID) {
                data.write_u32(self.mount_display_id());
            }
        }
        if mask.get(bit::COMBAT) {
            if mask.get(bit::MIN_DAMAGE) {
                data.write_f32(self.min_damage());
            }
            if mask.get(bit::MAX_DAMAGE) {
                data.write_f32(self.max_damage());
            }
            if mask.get(bit::ATTACK_POWER) {
                data.write_i32(self.attack_power());
            }
            if mask.get(bit::MOD_CAST_SPEED) {
                data.write_f32(self.mod_cast_speed());
            }
        }
        for (index, value) in self.npc_flags.changed(&mask) {
            data.write_u32(project_npc_flags(index, *value, view));
        }
        for (_, value) in self.power.changed(&mask) {
            data.write_i32(*value);
        }
        for (_, value) in self.max_power.changed(&mask) {
            data.write_i32(*value);
        }
        for (_, item) in self.virtual_items.changed(&mask) {
            item.write_update(data, flags, ignore_nested, view);
        }
        for (_, value) in self.stats.changed(&mask) {
            data.write_i32(*value);
        }
        for (_, value) in self.resistances.changed(&mask) {
            data.write_i32(*value);
        }
    }

    fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }

    fn has_visible_changes(&self, flags: UpdateFieldFlags) -> bool {
        ALLOWED.admits_any(&self.changes, flags)
    }
}

fn project_npc_flags(index: usize, stored: u32, view: &ViewContext<'_>) -> u32 {
    if index == 0 {
        projection::npc_flags(stored, view)
    } else {
        stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_bits() {
        assert_eq!(bit::UNIT, 0);
        assert_eq!(bit::MOUNT_DISPLAY_ID, 15);
        assert_eq!(bit::COMBAT, 16);
        assert_eq!(bit::NPC_FLAGS, 21);
        assert_eq!(bit::POWER, 24);
        assert_eq!(bit::MAX_POWER, 35);
        assert_eq!(bit::VIRTUAL_ITEMS, 46);
        assert_eq!(bit::STATS, 50);
        assert_eq!(bit::RESISTANCES, 56);
        assert_eq!(LAYOUT.bit_count(), 64);
        assert_eq!(BLOCKS, 2);
        assert_eq!(LAYOUT.validate(), Ok(()));
    }

    #[test]
    fn stranger_mask_excludes_gated_sections() {
        let allowed = ALLOWED.mask_for(UpdateFieldFlags::NONE);
        assert!(allowed.get(bit::HEALTH));
        assert!(allowed.get(bit::POWER + 1));
        assert!(!allowed.get(bit::COMBAT));
        assert!(!allowed.get(bit::STATS));
        assert!(!allowed.get(bit::RESISTANCES + 7));
    }

    #[test]
    fn unit_all_sees_cast_speed_and_stats_only() {
        let allowed = ALLOWED.mask_for(UpdateFieldFlags::UNIT_ALL);
        assert!(allowed.get(bit::COMBAT));
        assert!(allowed.get(bit::MOD_CAST_SPEED));
        assert!(!allowed.get(bit::MIN_DAMAGE));
        assert!(!allowed.get(bit::ATTACK_POWER));
        assert!(allowed.get(bit::STATS + MAX_STATS as u32));
        assert!(!allowed.get(bit::RESISTANCES));
    }

    #[test]
    fn owner_sees_everything() {
        let allowed = ALLOWED.mask_for(UpdateFieldFlags::OWNER);
        let mut all = ChangeMask::<BLOCKS>::for_layout(&LAYOUT);
        all.set_all();
        assert_eq!(allowed, all);
    }

    #[test]
    fn passive_spell_removal_marks_tail() {
        let mut unit = UnitData::new();
        unit.add_passive_spell(1, 10);
        unit.add_passive_spell(2, 20);
        unit.add_passive_spell(3, 30);
        unit.clear_nested_changes();

        assert!(unit.remove_passive_spell(2));
        assert!(!unit.remove_passive_spell(2));
        assert!(unit.changes().get(bit::PASSIVE_SPELLS));
        assert_eq!(unit.passive_spells()[1].spell_id(), 3);
        assert!(unit.passive_spells()[1].has_changes());
        assert!(!unit.passive_spells()[0].has_changes());
    }

    #[test]
    fn virtual_item_set_is_change_aware() {
        let mut unit = UnitData::new();
        assert!(unit.set_virtual_item(1, 2000));
        unit.clear_nested_changes();
        assert!(!unit.set_virtual_item(1, 2000));
        assert!(!unit.changes().is_any_set());
    }
}
