//! Declarative record layouts for the fieldmask engine.
//!
//! This crate describes *where* every field of a record lives in its change
//! mask and *who* may see it:
//! - [`RecordLayout`]: an ordered list of groups and arrays
//! - `const fn` bit assignment ([`RecordLayout::bit_of`])
//! - Visibility tables ([`RecordLayout::allowed_blocks`], [`UpdateFieldFlags`])
//! - Deterministic layout fingerprints ([`layout_hash`])
//!
//! # Design Principles
//!
//! - **Order is the protocol** - Bit positions are derived from declaration
//!   order and nothing else.
//! - **Compile-time lookups** - Unknown slot names are compile errors when
//!   resolved in const items.
//! - **Explicit schemas** - No reflection on arbitrary Rust types.
//!
//! # Example
//!
//! ```
//! use schema::{RecordLayout, Section, Slot, UpdateFieldFlags};
//!
//! const LAYOUT: RecordLayout = RecordLayout::new(
//!     "Example",
//!     &[
//!         Section::group("core", &[Slot::scalar("health"), Slot::dynamic("auras")]),
//!         Section::array(Slot::scalar("power").visible_to(UpdateFieldFlags::OWNER), 3),
//!     ],
//! );
//! const HEALTH: u32 = LAYOUT.bit_of("health");
//!
//! assert_eq!(HEALTH, 1);
//! assert_eq!(LAYOUT.bit_of("power"), 3);
//! assert_eq!(LAYOUT.bit_count(), 7);
//! ```

mod error;
mod flags;
mod hash;
mod layout;

pub use error::{SchemaError, SchemaResult};
pub use flags::UpdateFieldFlags;
pub use hash::layout_hash;
pub use layout::{BitInfo, BitRole, RecordLayout, Section, Slot, SlotKind};
