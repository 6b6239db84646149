//! Change-masked update fields for the fieldmask engine.
//!
//! This crate holds the primitives records are built from:
//! - [`ChangeMask`]: fixed-capacity dirty bits with a two-level wire header
//! - [`UpdateField`], [`UpdateFieldArray`], [`DynamicUpdateField`]: slots that
//!   mark their bits in the owning record's mask when mutated
//! - [`UpdateRecord`]: the create/update serialization contract
//! - [`AllowedMask`]: per-receiver visibility filtering
//!
//! # Design Principles
//!
//! - **Bits come from layouts** - Slots carry their bit positions as const
//!   parameters resolved from a [`schema::RecordLayout`].
//! - **Mutation implies marking** - Slots only change through methods that
//!   take the owning mask.
//! - **Infallible writes** - Serialization cannot fail; wrong bit math is a
//!   bug caught by tests, never a runtime branch.
//!
//! # Example
//!
//! ```
//! use fields::{ChangeMask, UpdateField};
//! use schema::{RecordLayout, Section, Slot};
//!
//! const LAYOUT: RecordLayout =
//!     RecordLayout::new("Example", &[Section::group("root", &[Slot::scalar("value")])]);
//! const ROOT: u32 = LAYOUT.bit_of("root");
//! const VALUE: u32 = LAYOUT.bit_of("value");
//!
//! let mut mask = ChangeMask::<1>::for_layout(&LAYOUT);
//! let mut value = UpdateField::<i32, ROOT, VALUE>::default();
//! value.set(42, &mut mask);
//!
//! assert!(mask.get(ROOT) && mask.get(VALUE));
//! ```

mod array;
mod dynamic;
mod field;
mod guid;
mod mask;
mod record;
mod value;

pub use array::UpdateFieldArray;
pub use dynamic::{DynamicUpdateField, DEFAULT_SIZE_BITS};
pub use field::UpdateField;
pub use guid::ObjectGuid;
pub use mask::ChangeMask;
pub use record::{AllowedMask, UpdateRecord};
pub use schema::UpdateFieldFlags;
pub use value::{SlotValue, WireValue};
