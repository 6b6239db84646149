//! Subject and receiver state consulted by viewer-dependent projections.

use fields::ObjectGuid;

use crate::config::ProjectionConfig;

/// Broad type of an entity, as far as projections care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    /// Anything that is not a unit (game objects, items, corpses).
    #[default]
    Object,
    /// A server-controlled unit.
    Creature,
    /// A player character.
    Player,
}

impl EntityKind {
    #[must_use]
    pub const fn is_unit(self) -> bool {
        matches!(self, Self::Creature | Self::Player)
    }

    #[must_use]
    pub const fn is_creature(self) -> bool {
        matches!(self, Self::Creature)
    }
}

/// Read-only relationship state supplied by the world layer.
///
/// Relationship questions are asked of the subject with the receiver's guid.
/// Every method has a neutral default, so an unknown entity can be
/// represented by [`NeutralEntity`] without failing a serialization.
pub trait EntityState {
    fn guid(&self) -> ObjectGuid;

    fn kind(&self) -> EntityKind {
        EntityKind::Object
    }

    fn is_game_master(&self) -> bool {
        false
    }

    /// Faction template the entity currently uses.
    fn faction_template(&self) -> u32 {
        0
    }

    fn is_player_controlled(&self) -> bool {
        false
    }

    /// Creature marked as an invisible trigger.
    fn is_trigger(&self) -> bool {
        false
    }

    /// First visible model of the creature template, if it has one.
    fn first_visible_model(&self) -> Option<u32> {
        None
    }

    fn has_loot_recipient(&self) -> bool {
        false
    }

    fn is_tapped_by(&self, _receiver: ObjectGuid) -> bool {
        false
    }

    fn is_lootable_by(&self, _receiver: ObjectGuid) -> bool {
        false
    }

    fn is_skinned_by(&self, _receiver: ObjectGuid) -> bool {
        false
    }

    /// The receiver cast a stalking aura on the subject.
    fn has_stalking_aura_from(&self, _receiver: ObjectGuid) -> bool {
        false
    }

    fn is_in_raid_with(&self, _receiver: ObjectGuid) -> bool {
        false
    }

    /// Faction standing towards the receiver, or `None` when either faction
    /// template is unknown.
    fn is_friendly_to(&self, _receiver: ObjectGuid) -> Option<bool> {
        None
    }

    fn shows_gossip_to(&self, _receiver: ObjectGuid) -> bool {
        true
    }

    fn shows_spellclick_to(&self, _receiver: ObjectGuid) -> bool {
        true
    }
}

/// Stand-in for an entity the world layer knows nothing about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeutralEntity;

impl EntityState for NeutralEntity {
    fn guid(&self) -> ObjectGuid {
        ObjectGuid::EMPTY
    }
}

/// Plain-data [`EntityState`] for tools, tests and simple worlds.
///
/// Relationship lists hold the guids of receivers the relationship holds for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EntityProfile {
    pub guid: ObjectGuid,
    pub kind: EntityKind,
    pub game_master: bool,
    pub faction_template: u32,
    pub player_controlled: bool,
    pub trigger: bool,
    pub visible_model: Option<u32>,
    pub loot_recipient: bool,
    pub tapped_by: Vec<ObjectGuid>,
    pub looters: Vec<ObjectGuid>,
    pub skinned_by: Vec<ObjectGuid>,
    pub stalkers: Vec<ObjectGuid>,
    pub raid: Vec<ObjectGuid>,
    pub hostile_to: Vec<ObjectGuid>,
    pub gossip_hidden_from: Vec<ObjectGuid>,
    pub spellclick_hidden_from: Vec<ObjectGuid>,
}

impl EntityProfile {
    #[must_use]
    pub fn new(guid: ObjectGuid, kind: EntityKind) -> Self {
        Self {
            guid,
            kind,
            ..Self::default()
        }
    }
}

impl EntityState for EntityProfile {
    fn guid(&self) -> ObjectGuid {
        self.guid
    }

    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn is_game_master(&self) -> bool {
        self.game_master
    }

    fn faction_template(&self) -> u32 {
        self.faction_template
    }

    fn is_player_controlled(&self) -> bool {
        self.player_controlled
    }

    fn is_trigger(&self) -> bool {
        self.trigger
    }

    fn first_visible_model(&self) -> Option<u32> {
        self.visible_model
    }

    fn has_loot_recipient(&self) -> bool {
        self.loot_recipient
    }

    fn is_tapped_by(&self, receiver: ObjectGuid) -> bool {
        self.tapped_by.contains(&receiver)
    }

    fn is_lootable_by(&self, receiver: ObjectGuid) -> bool {
        self.looters.contains(&receiver)
    }

    fn is_skinned_by(&self, receiver: ObjectGuid) -> bool {
        self.skinned_by.contains(&receiver)
    }

    fn has_stalking_aura_from(&self, receiver: ObjectGuid) -> bool {
        self.stalkers.contains(&receiver)
    }

    fn is_in_raid_with(&self, receiver: ObjectGuid) -> bool {
        self.raid.contains(&receiver)
    }

    fn is_friendly_to(&self, receiver: ObjectGuid) -> Option<bool> {
        if self.faction_template == 0 {
            return None;
        }
        Some(!self.hostile_to.contains(&receiver))
    }

    fn shows_gossip_to(&self, receiver: ObjectGuid) -> bool {
        !self.gossip_hidden_from.contains(&receiver)
    }

    fn shows_spellclick_to(&self, receiver: ObjectGuid) -> bool {
        !self.spellclick_hidden_from.contains(&receiver)
    }
}

/// The `(subject, receiver)` pair one serialization call is made for.
#[derive(Clone, Copy)]
pub struct ViewContext<'a> {
    pub subject: &'a dyn EntityState,
    pub receiver: &'a dyn EntityState,
    pub config: &'a ProjectionConfig,
}

impl<'a> ViewContext<'a> {
    #[must_use]
    pub fn new(
        subject: &'a dyn EntityState,
        receiver: &'a dyn EntityState,
        config: &'a ProjectionConfig,
    ) -> Self {
        Self {
            subject,
            receiver,
            config,
        }
    }

    /// The receiver is looking at itself.
    #[must_use]
    pub fn is_self_view(&self) -> bool {
        self.subject.guid() == self.receiver.guid()
    }
}

impl std::fmt::Debug for ViewContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewContext")
            .field("subject", &self.subject.guid())
            .field("receiver", &self.receiver.guid())
            .field("config", self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_entity_defaults() {
        let neutral = NeutralEntity;
        assert_eq!(neutral.guid(), ObjectGuid::EMPTY);
        assert_eq!(neutral.kind(), EntityKind::Object);
        assert!(!neutral.is_lootable_by(ObjectGuid::new(0, 1)));
        assert!(neutral.shows_gossip_to(ObjectGuid::new(0, 1)));
        assert_eq!(neutral.is_friendly_to(ObjectGuid::new(0, 1)), None);
    }

    #[test]
    fn profile_relationships() {
        let receiver = ObjectGuid::new(0, 7);
        let mut profile = EntityProfile::new(ObjectGuid::new(1, 1), EntityKind::Creature);
        profile.looters.push(receiver);
        profile.faction_template = 14;
        profile.hostile_to.push(receiver);
        assert!(profile.is_lootable_by(receiver));
        assert!(!profile.is_lootable_by(ObjectGuid::new(0, 8)));
        assert_eq!(profile.is_friendly_to(receiver), Some(false));
        assert_eq!(profile.is_friendly_to(ObjectGuid::new(0, 8)), Some(true));
    }

    #[test]
    fn self_view() {
        let config = ProjectionConfig::default();
        let me = EntityProfile::new(ObjectGuid::new(0, 3), EntityKind::Player);
        let other = EntityProfile::new(ObjectGuid::new(0, 4), EntityKind::Player);
        assert!(ViewContext::new(&me, &me, &config).is_self_view());
        assert!(!ViewContext::new(&me, &other, &config).is_self_view());
    }

    #[test]
    fn unit_kinds() {
        assert!(EntityKind::Creature.is_unit());
        assert!(EntityKind::Player.is_unit());
        assert!(!EntityKind::Object.is_unit());
        assert!(!EntityKind::Player.is_creature());
    }
}
