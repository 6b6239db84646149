//! A scripted three-tick broadcast between two players and a creature.
//!
//! 1. first contact: everyone receives creates
//! 2. the boar is hurt and becomes lootable for the looter; the looter earns coin
//! 3. the bystander walks away from the boar

use std::cell::Cell;

use broadcast::{BlockKind, ReceiverUpdate, ReplicatedEntity, Replicator, ReplicatorConfig, WorldView};
use fields::ObjectGuid;
use records::{EntityKind, EntityProfile, EntityState, ProjectionConfig, UnitDynFlags};
use serde::Serialize;
use tracing::info;

use crate::to_hex;

pub const LOOTER: ObjectGuid = ObjectGuid::new(0x0800, 1);
pub const BYSTANDER: ObjectGuid = ObjectGuid::new(0x0800, 2);
pub const BOAR: ObjectGuid = ObjectGuid::new(0xF130, 3);

#[derive(Debug, Clone, Serialize)]
pub struct BlockSummary {
    pub kind: &'static str,
    pub guid: String,
    pub bytes: usize,
    pub hex: String,
}

/// One receiver's frame for one tick.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSummary {
    pub receiver: String,
    pub bytes: usize,
    pub out_of_range: Vec<String>,
    pub blocks: Vec<BlockSummary>,
    pub hex: String,
    #[serde(skip)]
    pub receiver_guid: ObjectGuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoTick {
    pub tick: u32,
    pub frames: Vec<FrameSummary>,
}

impl FrameSummary {
    fn new(update: &ReceiverUpdate) -> Self {
        let bytes = update.to_bytes();
        Self {
            receiver: update.receiver.to_string(),
            bytes: bytes.len(),
            out_of_range: update.out_of_range.iter().map(ToString::to_string).collect(),
            blocks: update
                .blocks
                .iter()
                .map(|block| BlockSummary {
                    kind: match block.kind {
                        BlockKind::Values => "values",
                        BlockKind::Create => "create",
                    },
                    guid: block.guid.to_string(),
                    bytes: block.payload.len(),
                    hex: to_hex(&block.payload),
                })
                .collect(),
            hex: to_hex(&bytes),
            receiver_guid: update.receiver,
        }
    }
}

struct DemoWorld {
    profiles: Vec<EntityProfile>,
    bystander_in_range: Cell<bool>,
}

impl DemoWorld {
    fn new() -> Self {
        let mut boar = EntityProfile::new(BOAR, EntityKind::Creature);
        boar.looters.push(LOOTER);
        boar.faction_template = 7;
        Self {
            profiles: vec![
                EntityProfile::new(LOOTER, EntityKind::Player),
                EntityProfile::new(BYSTANDER, EntityKind::Player),
                boar,
            ],
            bystander_in_range: Cell::new(true),
        }
    }
}

impl WorldView for DemoWorld {
    fn state(&self, guid: ObjectGuid) -> Option<&dyn EntityState> {
        self.profiles
            .iter()
            .find(|profile| profile.guid == guid)
            .map(|profile| profile as &dyn EntityState)
    }

    fn is_relevant(&self, subject: ObjectGuid, receiver: ObjectGuid) -> bool {
        !(subject == BOAR && receiver == BYSTANDER) || self.bystander_in_range.get()
    }
}

/// Runs the script and summarizes every non-empty frame.
#[must_use]
pub fn run_demo(projection: ProjectionConfig) -> Vec<DemoTick> {
    let world = DemoWorld::new();
    let mut replicator = Replicator::new(ReplicatorConfig::for_testing(), projection);
    for (guid, kind) in [
        (LOOTER, EntityKind::Player),
        (BYSTANDER, EntityKind::Player),
        (BOAR, EntityKind::Creature),
    ] {
        replicator.insert_entity(ReplicatedEntity::new(guid, kind));
    }
    replicator.add_receiver(LOOTER);
    replicator.add_receiver(BYSTANDER);

    if let Some(boar) = replicator.entity_mut(BOAR) {
        if let Some(unit) = boar.unit_mut() {
            unit.set_level(12);
            unit.set_max_health(320);
            unit.set_health(320);
            unit.set_faction_template(7);
        }
    }
    let mut ticks = vec![tick(1, &mut replicator, &world)];

    if let Some(boar) = replicator.entity_mut(BOAR) {
        boar.object_mut()
            .set_dynamic_flags(UnitDynFlags::LOOTABLE.bits());
        if let Some(unit) = boar.unit_mut() {
            unit.set_health(0);
        }
    }
    if let Some(active) = replicator
        .entity_mut(LOOTER)
        .and_then(ReplicatedEntity::active_player_mut)
    {
        active.modify_coinage(45);
    }
    ticks.push(tick(2, &mut replicator, &world));

    world.bystander_in_range.set(false);
    ticks.push(tick(3, &mut replicator, &world));
    ticks
}

fn tick(number: u32, replicator: &mut Replicator, world: &DemoWorld) -> DemoTick {
    let frames: Vec<_> = replicator
        .begin_broadcast()
        .build_all(world)
        .iter()
        .map(FrameSummary::new)
        .collect();
    info!(
        tick = number,
        frames = frames.len(),
        bytes = frames.iter().map(|frame| frame.bytes).sum::<usize>(),
        "demo tick"
    );
    DemoTick {
        tick: number,
        frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tick: &DemoTick, receiver: ObjectGuid) -> Option<&FrameSummary> {
        tick.frames.iter().find(|frame| frame.receiver_guid == receiver)
    }

    #[test]
    fn script_produces_three_ticks() {
        let ticks = run_demo(ProjectionConfig::default());
        assert_eq!(ticks.len(), 3);

        let first = &ticks[0];
        assert_eq!(first.frames.len(), 2);
        for frame in &first.frames {
            assert_eq!(frame.blocks.len(), 3);
            assert!(frame.blocks.iter().all(|block| block.kind == "create"));
        }

        let second = &ticks[1];
        let looter = frame(second, LOOTER).unwrap();
        let bystander = frame(second, BYSTANDER).unwrap();
        assert_eq!(looter.blocks.len(), 2);
        // coinage is owner-only, so the bystander hears only about the boar
        assert_eq!(bystander.blocks.len(), 1);
        assert!(looter.blocks.iter().all(|block| block.kind == "values"));

        let third = &ticks[2];
        assert!(frame(third, LOOTER).is_none());
        let bystander = frame(third, BYSTANDER).unwrap();
        assert_eq!(bystander.out_of_range, vec![BOAR.to_string()]);
        assert!(bystander.blocks.is_empty());
    }

    #[test]
    fn summaries_serialize() {
        let ticks = run_demo(ProjectionConfig::for_testing());
        let json = serde_json::to_value(&ticks).unwrap();
        assert_eq!(json[0]["tick"], 1);
        assert!(json[0]["frames"][0].get("receiver_guid").is_none());
        assert!(json[0]["frames"][0]["hex"].is_string());
    }
}
