//! Broadcast driver for fieldmask records.
//!
//! This crate decides *who* receives *which* payload, and *when* change
//! masks are reset:
//! - [`ReplicatedEntity`]: the records one entity carries, with create and
//!   values block framing
//! - [`Replicator`]: tracked entities, receivers and what each receiver knows
//! - [`BroadcastScope`]: one broadcast pass; masks are cleared when it drops
//! - [`ReceiverUpdate`]: the per-receiver frame
//!
//! # Example
//!
//! ```
//! use broadcast::{ReplicatedEntity, Replicator, ReplicatorConfig, WorldView};
//! use fields::ObjectGuid;
//! use records::{EntityKind, EntityState, ProjectionConfig};
//!
//! struct EmptyWorld;
//!
//! impl WorldView for EmptyWorld {
//!     fn state(&self, _guid: ObjectGuid) -> Option<&dyn EntityState> {
//!         None
//!     }
//! }
//!
//! let hero = ObjectGuid::new(0x0800, 1);
//! let mut replicator = Replicator::new(ReplicatorConfig::default(), ProjectionConfig::default());
//! replicator.insert_entity(ReplicatedEntity::new(hero, EntityKind::Player));
//! replicator.add_receiver(hero);
//!
//! let updates = replicator.begin_broadcast().build_all(&EmptyWorld);
//! assert_eq!(updates[0].creates(), 1);
//! ```

mod config;
mod entity;
mod error;
mod frame;
mod replicator;

pub use config::ReplicatorConfig;
pub use entity::{RecordKinds, ReplicatedEntity};
pub use error::{FrameError, FrameResult};
pub use frame::{BlockKind, ReceiverUpdate, UpdateBlock};
pub use replicator::{BroadcastScope, Replicator, WorldView};
