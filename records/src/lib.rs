//! Entity records for the fieldmask engine.
//!
//! Each record module declares its [`schema::RecordLayout`], the bit
//! constants resolved from it, and a struct whose slots mark the record's
//! [`fields::ChangeMask`] on mutation:
//! - top level: [`ObjectData`], [`UnitData`], [`PlayerData`], [`ActivePlayerData`]
//! - nested: [`VisibleItem`], [`PassiveSpellHistory`], [`ChrCustomizationChoice`],
//!   [`QuestLog`], [`SkillInfo`]
//!
//! Top-level records serialize against a [`ViewContext`], which lets a
//! handful of fields be rewritten per receiver (see [`projection`]) without
//! touching stored state.
//!
//! # Example
//!
//! ```
//! use bitstream::BitWriter;
//! use fields::{ObjectGuid, UpdateFieldFlags, UpdateRecord};
//! use records::{EntityKind, EntityProfile, ProjectionConfig, UnitData, ViewContext};
//!
//! let subject = EntityProfile::new(ObjectGuid::new(0, 1), EntityKind::Creature);
//! let receiver = EntityProfile::new(ObjectGuid::new(0, 2), EntityKind::Player);
//! let config = ProjectionConfig::default();
//! let view = ViewContext::new(&subject, &receiver, &config);
//!
//! let mut unit = UnitData::new();
//! unit.set_health(250);
//!
//! let mut writer = BitWriter::new();
//! unit.write_update(&mut writer, UpdateFieldFlags::NONE, false, &view);
//! assert!(!writer.finish().is_empty());
//! ```

#[macro_use]
mod macros;

mod config;
mod flags;
mod view;

pub mod active_player;
pub mod customization;
pub mod item;
pub mod object;
pub mod player;
pub mod projection;
pub mod quest;
pub mod skill;
pub mod spell;
pub mod unit;

use schema::RecordLayout;

pub use active_player::ActivePlayerData;
pub use config::ProjectionConfig;
pub use customization::ChrCustomizationChoice;
pub use flags::{NpcFlags, UnitDynFlags, UnitFlags};
pub use item::VisibleItem;
pub use object::ObjectData;
pub use player::PlayerData;
pub use quest::QuestLog;
pub use skill::{SkillEntry, SkillInfo};
pub use spell::PassiveSpellHistory;
pub use unit::UnitData;
pub use view::{EntityKind, EntityProfile, EntityState, NeutralEntity, ViewContext};

/// Every record layout, top level first.
pub const LAYOUTS: [&RecordLayout; 9] = [
    &object::LAYOUT,
    &unit::LAYOUT,
    &player::LAYOUT,
    &active_player::LAYOUT,
    &item::LAYOUT,
    &spell::LAYOUT,
    &customization::LAYOUT,
    &quest::LAYOUT,
    &skill::LAYOUT,
];

/// Looks a layout up by record name.
#[must_use]
pub fn layout_by_name(name: &str) -> Option<&'static RecordLayout> {
    LAYOUTS
        .iter()
        .copied()
        .find(|layout| layout.name.eq_ignore_ascii_case(name))
}
