//! The broadcast driver: who gets what, and when masks are cleared.

use std::collections::{BTreeMap, BTreeSet};

use bitstream::BitWriter;
use fields::{ObjectGuid, UpdateFieldFlags};
use records::{EntityState, NeutralEntity, ProjectionConfig, ViewContext};
use tracing::{debug, trace, warn};

use crate::config::ReplicatorConfig;
use crate::entity::ReplicatedEntity;
use crate::frame::{BlockKind, ReceiverUpdate, UpdateBlock};

/// World adapter the replicator asks about relationships.
///
/// The engine never computes relevance or capability flags itself.
pub trait WorldView {
    /// Live state of `guid`, used for projections. `None` falls back to a
    /// neutral state.
    fn state(&self, guid: ObjectGuid) -> Option<&dyn EntityState>;

    /// Capability flags `receiver` holds towards `subject`.
    fn receiver_flags(&self, subject: ObjectGuid, receiver: ObjectGuid) -> UpdateFieldFlags {
        if subject == receiver {
            UpdateFieldFlags::OWNER
        } else {
            UpdateFieldFlags::NONE
        }
    }

    /// Whether `receiver` should know about `subject` at all.
    fn is_relevant(&self, _subject: ObjectGuid, _receiver: ObjectGuid) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default)]
struct ReceiverState {
    known: BTreeSet<ObjectGuid>,
    /// Forgotten guids not yet announced as out of range.
    pending_out_of_range: BTreeSet<ObjectGuid>,
}

impl ReceiverState {
    fn forget(&mut self, guid: ObjectGuid) -> bool {
        if self.known.remove(&guid) {
            self.pending_out_of_range.insert(guid);
            true
        } else {
            false
        }
    }
}

/// Tracks entities and receivers, and hands out broadcast scopes.
#[derive(Debug, Clone)]
pub struct Replicator {
    config: ReplicatorConfig,
    projection: ProjectionConfig,
    entities: BTreeMap<ObjectGuid, ReplicatedEntity>,
    receivers: BTreeMap<ObjectGuid, ReceiverState>,
}

impl Replicator {
    #[must_use]
    pub fn new(config: ReplicatorConfig, projection: ProjectionConfig) -> Self {
        Self {
            config,
            projection,
            entities: BTreeMap::new(),
            receivers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ReplicatorConfig {
        &self.config
    }

    #[must_use]
    pub const fn projection(&self) -> &ProjectionConfig {
        &self.projection
    }

    /// Adds or replaces an entity. Returns `false` if the entity cap is
    /// reached.
    ///
    /// The inserted entity is new to every receiver: one that knew the guid
    /// gets it as out of range and then a create, in the same frame.
    pub fn insert_entity(&mut self, entity: ReplicatedEntity) -> bool {
        let guid = entity.guid();
        if self.entities.len() >= self.config.max_entities && !self.entities.contains_key(&guid) {
            warn!(%guid, max = self.config.max_entities, "entity cap reached, not tracked");
            return false;
        }
        let forgotten = self.forget(guid);
        if forgotten > 0 {
            debug!(%guid, receivers = forgotten, "entity replaced, will be created again");
        }
        self.entities.insert(guid, entity);
        true
    }

    /// Removes an entity. Every receiver that knows it gets it as out of
    /// range the next time it is served.
    pub fn remove_entity(&mut self, guid: ObjectGuid) -> Option<ReplicatedEntity> {
        let entity = self.entities.remove(&guid)?;
        self.forget(guid);
        Some(entity)
    }

    fn forget(&mut self, guid: ObjectGuid) -> usize {
        self.receivers
            .values_mut()
            .map(|state| usize::from(state.forget(guid)))
            .sum()
    }

    #[must_use]
    pub fn entity(&self, guid: ObjectGuid) -> Option<&ReplicatedEntity> {
        self.entities.get(&guid)
    }

    /// Mutable access for gameplay code. Unavailable while a broadcast
    /// scope is open.
    pub fn entity_mut(&mut self, guid: ObjectGuid) -> Option<&mut ReplicatedEntity> {
        self.entities.get_mut(&guid)
    }

    pub fn entities(&self) -> impl Iterator<Item = &ReplicatedEntity> {
        self.entities.values()
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Registers a receiver with nothing known yet. Existing receivers keep
    /// their known set.
    pub fn add_receiver(&mut self, receiver: ObjectGuid) {
        self.receivers.entry(receiver).or_default();
    }

    pub fn remove_receiver(&mut self, receiver: ObjectGuid) {
        self.receivers.remove(&receiver);
    }

    pub fn receivers(&self) -> impl Iterator<Item = ObjectGuid> + '_ {
        self.receivers.keys().copied()
    }

    /// Whether `receiver` has been sent a create for `subject` that is still
    /// current.
    #[must_use]
    pub fn knows(&self, receiver: ObjectGuid, subject: ObjectGuid) -> bool {
        self.receivers
            .get(&receiver)
            .is_some_and(|state| state.known.contains(&subject))
    }

    /// Opens a broadcast.
    ///
    /// Every receiver served through the scope sees the same change masks.
    /// Entities cannot be mutated while it is open; dropping it clears all
    /// masks once.
    pub fn begin_broadcast(&mut self) -> BroadcastScope<'_> {
        BroadcastScope {
            replicator: self,
            served: 0,
        }
    }
}

/// An open broadcast over a [`Replicator`].
#[derive(Debug)]
pub struct BroadcastScope<'a> {
    replicator: &'a mut Replicator,
    served: usize,
}

impl BroadcastScope<'_> {
    /// Builds the frame for one receiver.
    ///
    /// Relevant unknown entities get create blocks, known entities with
    /// changes get values blocks, and entities that were removed, replaced or
    /// are no longer relevant since this receiver was last served are listed
    /// as out of range.
    pub fn build_update(&mut self, receiver: ObjectGuid, world: &impl WorldView) -> ReceiverUpdate {
        let Replicator {
            config,
            projection,
            entities,
            receivers,
        } = &mut *self.replicator;
        let state = receivers.entry(receiver).or_default();
        let receiver_state = lookup(world, receiver);
        let mut update = ReceiverUpdate::new(receiver);
        update
            .out_of_range
            .extend(std::mem::take(&mut state.pending_out_of_range));

        for (guid, entity) in entities.iter() {
            let known = state.known.contains(guid);
            if !world.is_relevant(*guid, receiver) {
                if known {
                    update.out_of_range.push(*guid);
                }
                continue;
            }
            if known && !entity.has_changes() {
                continue;
            }
            let subject_state = lookup(world, *guid);
            let view = ViewContext::new(subject_state, receiver_state, projection);
            let flags = world.receiver_flags(*guid, receiver);
            if known && !entity.has_visible_changes(flags, &view) {
                continue;
            }
            let mut payload = BitWriter::with_capacity(config.initial_payload_bytes);
            let kind = if known {
                entity.write_update(&mut payload, flags, &view);
                BlockKind::Values
            } else {
                entity.write_create(&mut payload, flags, &view);
                BlockKind::Create
            };
            let payload = payload.finish();
            trace!(%receiver, subject = %guid, ?kind, bytes = payload.len(), "block built");
            update.blocks.push(UpdateBlock {
                kind,
                guid: *guid,
                payload,
            });
        }

        update.out_of_range.sort_unstable();
        for guid in &update.out_of_range {
            state.known.remove(guid);
        }
        for block in &update.blocks {
            state.known.insert(block.guid);
        }

        self.served += 1;
        debug!(
            %receiver,
            creates = update.creates(),
            blocks = update.blocks.len(),
            out_of_range = update.out_of_range.len(),
            "receiver served"
        );
        update
    }

    /// Builds frames for every registered receiver, skipping empty ones.
    pub fn build_all(&mut self, world: &impl WorldView) -> Vec<ReceiverUpdate> {
        let receivers: Vec<ObjectGuid> = self.replicator.receivers().collect();
        receivers
            .into_iter()
            .map(|receiver| self.build_update(receiver, world))
            .filter(|update| !update.is_empty())
            .collect()
    }

    /// Receivers served so far.
    #[must_use]
    pub const fn served(&self) -> usize {
        self.served
    }
}

impl Drop for BroadcastScope<'_> {
    fn drop(&mut self) {
        let mut cleared = 0usize;
        for entity in self.replicator.entities.values_mut() {
            if entity.has_changes() {
                entity.clear_changes();
                cleared += 1;
            }
        }
        debug!(served = self.served, cleared, "broadcast closed, masks cleared");
    }
}

fn lookup(world: &impl WorldView, guid: ObjectGuid) -> &dyn EntityState {
    match world.state(guid) {
        Some(state) => state,
        None => {
            warn!(%guid, "no entity state, projecting as neutral");
            &NeutralEntity
        }
    }
}
