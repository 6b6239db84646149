//! The records one replicated entity carries, serialized as a unit.

use bitflags::bitflags;
use bitstream::BitWriter;
use fields::{ObjectGuid, SlotValue, UpdateFieldFlags, UpdateRecord};
use records::{ActivePlayerData, EntityKind, ObjectData, PlayerData, UnitData, ViewContext};

bitflags! {
    /// Which records a values block carries.
    ///
    /// Sent as a `u8` in create blocks and as a `u32` in update blocks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RecordKinds: u8 {
        const OBJECT = 1 << 0;
        const UNIT = 1 << 1;
        const PLAYER = 1 << 2;
        const ACTIVE_PLAYER = 1 << 3;
    }
}

/// An entity's records.
///
/// Which records exist follows from the entity kind: every entity has
/// [`ObjectData`], creatures and players add [`UnitData`], players add
/// [`PlayerData`] and [`ActivePlayerData`]. Active-player state is only
/// ever written to the player itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicatedEntity {
    guid: ObjectGuid,
    kind: EntityKind,
    object: ObjectData,
    unit: Option<UnitData>,
    player: Option<PlayerData>,
    active_player: Option<Box<ActivePlayerData>>,
}

impl ReplicatedEntity {
    #[must_use]
    pub fn new(guid: ObjectGuid, kind: EntityKind) -> Self {
        let is_player = kind == EntityKind::Player;
        Self {
            guid,
            kind,
            object: ObjectData::new(),
            unit: kind.is_unit().then(UnitData::new),
            player: is_player.then(PlayerData::new),
            active_player: is_player.then(|| Box::new(ActivePlayerData::new())),
        }
    }

    #[must_use]
    pub const fn guid(&self) -> ObjectGuid {
        self.guid
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub const fn object(&self) -> &ObjectData {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut ObjectData {
        &mut self.object
    }

    #[must_use]
    pub const fn unit(&self) -> Option<&UnitData> {
        self.unit.as_ref()
    }

    pub fn unit_mut(&mut self) -> Option<&mut UnitData> {
        self.unit.as_mut()
    }

    #[must_use]
    pub const fn player(&self) -> Option<&PlayerData> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerData> {
        self.player.as_mut()
    }

    #[must_use]
    pub fn active_player(&self) -> Option<&ActivePlayerData> {
        self.active_player.as_deref()
    }

    pub fn active_player_mut(&mut self) -> Option<&mut ActivePlayerData> {
        self.active_player.as_deref_mut()
    }

    /// Records this entity carries.
    #[must_use]
    pub fn present_kinds(&self) -> RecordKinds {
        let mut kinds = RecordKinds::OBJECT;
        kinds.set(RecordKinds::UNIT, self.unit.is_some());
        kinds.set(RecordKinds::PLAYER, self.player.is_some());
        kinds.set(RecordKinds::ACTIVE_PLAYER, self.active_player.is_some());
        kinds
    }

    /// Records with at least one changed field.
    #[must_use]
    pub fn changed_kinds(&self) -> RecordKinds {
        let mut kinds = RecordKinds::empty();
        kinds.set(RecordKinds::OBJECT, self.object.has_changes());
        kinds.set(
            RecordKinds::UNIT,
            self.unit.as_ref().is_some_and(|unit| unit.has_changes()),
        );
        kinds.set(
            RecordKinds::PLAYER,
            self.player.as_ref().is_some_and(|player| player.has_changes()),
        );
        kinds.set(
            RecordKinds::ACTIVE_PLAYER,
            self.active_player
                .as_deref()
                .is_some_and(|active| active.has_changes()),
        );
        kinds
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changed_kinds().is_empty()
    }

    /// Records holding a change the receiver may be sent.
    #[must_use]
    pub fn visible_changed_kinds(
        &self,
        flags: UpdateFieldFlags,
        view: &ViewContext<'_>,
    ) -> RecordKinds {
        let visible = self.visible_kinds(view);
        let mut kinds = RecordKinds::empty();
        kinds.set(RecordKinds::OBJECT, self.object.has_visible_changes(flags));
        kinds.set(
            RecordKinds::UNIT,
            self.unit
                .as_ref()
                .is_some_and(|unit| unit.has_visible_changes(flags)),
        );
        kinds.set(
            RecordKinds::PLAYER,
            self.player
                .as_ref()
                .is_some_and(|player| player.has_visible_changes(flags)),
        );
        kinds.set(
            RecordKinds::ACTIVE_PLAYER,
            self.active_player
                .as_deref()
                .is_some_and(|active| active.has_visible_changes(flags)),
        );
        kinds & visible
    }

    /// Whether a values block for this receiver would carry any field.
    #[must_use]
    pub fn has_visible_changes(&self, flags: UpdateFieldFlags, view: &ViewContext<'_>) -> bool {
        !self.visible_changed_kinds(flags, view).is_empty()
    }

    fn visible_kinds(&self, view: &ViewContext<'_>) -> RecordKinds {
        let mut kinds = self.present_kinds();
        if !view.is_self_view() {
            kinds.remove(RecordKinds::ACTIVE_PLAYER);
        }
        kinds
    }

    /// Writes the create block: record kinds as `u8`, then each record's
    /// full state.
    pub fn write_create(&self, data: &mut BitWriter, flags: UpdateFieldFlags, view: &ViewContext<'_>) {
        let kinds = self.visible_kinds(view);
        data.write_u8(kinds.bits());
        if kinds.contains(RecordKinds::OBJECT) {
            self.object.write_create(data, flags, view);
        }
        if kinds.contains(RecordKinds::UNIT) {
            if let Some(unit) = &self.unit {
                unit.write_create(data, flags, view);
            }
        }
        if kinds.contains(RecordKinds::PLAYER) {
            if let Some(player) = &self.player {
                player.write_create(data, flags, view);
            }
        }
        if kinds.contains(RecordKinds::ACTIVE_PLAYER) {
            if let Some(active) = &self.active_player {
                active.write_create(data, flags, view);
            }
        }
    }

    /// Writes the values block: `u32` length of the rest, the kinds of
    /// records with visible changes as `u32`, then the update of each.
    ///
    /// Returns the kinds written.
    pub fn write_update(
        &self,
        data: &mut BitWriter,
        flags: UpdateFieldFlags,
        view: &ViewContext<'_>,
    ) -> RecordKinds {
        let kinds = self.visible_changed_kinds(flags, view);
        let mut body = BitWriter::new();
        body.write_u32(u32::from(kinds.bits()));
        if kinds.contains(RecordKinds::OBJECT) {
            self.object.write_update(&mut body, flags, false, view);
        }
        if kinds.contains(RecordKinds::UNIT) {
            if let Some(unit) = &self.unit {
                unit.write_update(&mut body, flags, false, view);
            }
        }
        if kinds.contains(RecordKinds::PLAYER) {
            if let Some(player) = &self.player {
                player.write_update(&mut body, flags, false, view);
            }
        }
        if kinds.contains(RecordKinds::ACTIVE_PLAYER) {
            if let Some(active) = &self.active_player {
                active.write_update(&mut body, flags, false, view);
            }
        }
        let body = body.finish();
        data.write_u32(body.len() as u32);
        data.write_bytes(&body);
        kinds
    }

    /// Clears the change state of every record.
    pub fn clear_changes(&mut self) {
        self.object.clear_nested_changes();
        if let Some(unit) = &mut self.unit {
            unit.clear_nested_changes();
        }
        if let Some(player) = &mut self.player {
            player.clear_nested_changes();
        }
        if let Some(active) = &mut self.active_player {
            active.clear_nested_changes();
        }
    }
}
