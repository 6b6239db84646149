//! Viewer-dependent projections.
//!
//! Each projection maps a stored field value to the value a specific
//! receiver is sent. They are pure: the stored value and both entities are
//! only read, so every receiver of a broadcast starts from the same state.

use tracing::trace;

use crate::flags::{NpcFlags, UnitDynFlags, UnitFlags};
use crate::view::ViewContext;

/// `ObjectData::dynamic_flags` as seen by the receiver.
///
/// For units: `TAPPED` is recomputed from the loot recipient, `LOOTABLE`
/// and `CAN_SKIN` are dropped for receivers that may not loot or have
/// already skinned, and `TRACK_UNIT` only reaches the caster of a stalking
/// aura. Other objects pass through unchanged.
#[must_use]
pub fn dynamic_flags(stored: u32, view: &ViewContext<'_>) -> u32 {
    let subject = view.subject;
    if !subject.kind().is_unit() {
        return stored;
    }
    let receiver = view.receiver.guid();
    let mut flags = UnitDynFlags::from_bits_retain(stored);
    flags.remove(UnitDynFlags::TAPPED);
    if subject.kind().is_creature() {
        if subject.has_loot_recipient() && !subject.is_tapped_by(receiver) {
            flags.insert(UnitDynFlags::TAPPED);
        }
        if !subject.is_lootable_by(receiver) {
            flags.remove(UnitDynFlags::LOOTABLE);
        }
        if flags.contains(UnitDynFlags::CAN_SKIN) && subject.is_skinned_by(receiver) {
            flags.remove(UnitDynFlags::CAN_SKIN);
        }
    }
    if flags.contains(UnitDynFlags::TRACK_UNIT) && !subject.has_stalking_aura_from(receiver) {
        flags.remove(UnitDynFlags::TRACK_UNIT);
    }
    flags.bits()
}

/// `UnitData::display_id`: game masters see trigger creatures with their
/// first visible model.
#[must_use]
pub fn display_id(stored: u32, view: &ViewContext<'_>) -> u32 {
    let subject = view.subject;
    if !view.receiver.is_game_master() || !subject.kind().is_creature() || !subject.is_trigger() {
        return stored;
    }
    match subject.first_visible_model() {
        Some(model) => model,
        None => {
            trace!(subject = %subject.guid(), "trigger without visible model, keeping display id");
            stored
        }
    }
}

/// `UnitData::faction_template`: with cross-faction grouping enabled, a
/// player-controlled unit appears in the receiver's own faction to hostile
/// raid members.
#[must_use]
pub fn faction_template(stored: u32, view: &ViewContext<'_>) -> u32 {
    let subject = view.subject;
    let receiver = view.receiver;
    if !view.config.allow_two_side_interaction_group
        || !subject.is_player_controlled()
        || view.is_self_view()
        || !subject.is_in_raid_with(receiver.guid())
    {
        return stored;
    }
    match subject.is_friendly_to(receiver.guid()) {
        Some(false) => receiver.faction_template(),
        Some(true) => stored,
        None => {
            trace!(
                subject = %subject.guid(),
                receiver = %receiver.guid(),
                "unknown faction template, keeping stored faction"
            );
            stored
        }
    }
}

/// `UnitData::flags`: game masters can always interact with units.
#[must_use]
pub fn unit_flags(stored: u32, view: &ViewContext<'_>) -> u32 {
    let mut flags = UnitFlags::from_bits_retain(stored);
    if view.receiver.is_game_master() {
        flags.remove(UnitFlags::UNINTERACTIBLE);
    }
    flags.bits()
}

/// `UnitData::npc_flags[0]`: gossip, quest and spell-click options the
/// receiver cannot use are hidden.
#[must_use]
pub fn npc_flags(stored: u32, view: &ViewContext<'_>) -> u32 {
    let subject = view.subject;
    if !subject.kind().is_creature() {
        return stored;
    }
    let receiver = view.receiver.guid();
    let mut flags = NpcFlags::from_bits_retain(stored);
    if !subject.shows_gossip_to(receiver) {
        flags.remove(NpcFlags::GOSSIP | NpcFlags::QUESTGIVER);
    }
    if !subject.shows_spellclick_to(receiver) {
        flags.remove(NpcFlags::SPELLCLICK);
    }
    flags.bits()
}
