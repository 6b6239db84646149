//! Record serialization contract and per-receiver mask filtering.

use bitstream::BitWriter;
use schema::{RecordLayout, UpdateFieldFlags};

use crate::mask::ChangeMask;
use crate::value::SlotValue;

/// A record: named slots sharing one change mask, written in a fixed order.
///
/// `V` is the viewer context handed to projections. Clearing and full
/// re-marking come from [`SlotValue`], so nested records compose through
/// arrays and dynamic collections.
pub trait UpdateRecord<V: ?Sized>: SlotValue {
    /// Writes every field the receiver may see, ignoring the change mask.
    fn write_create(&self, data: &mut BitWriter, flags: UpdateFieldFlags, view: &V);

    /// Writes the mask header and the changed fields the receiver may see.
    ///
    /// With `ignore_nested` the record behaves as if every field changed.
    fn write_update(
        &self,
        data: &mut BitWriter,
        flags: UpdateFieldFlags,
        ignore_nested: bool,
        view: &V,
    );

    /// Returns `true` if any bit of the record's mask is set.
    fn has_changes(&self) -> bool;

    /// Returns `true` if an update for a receiver holding `flags` would
    /// carry at least one field.
    ///
    /// Records with gated fields override this; the default assumes every
    /// change is visible.
    fn has_visible_changes(&self, _flags: UpdateFieldFlags) -> bool {
        self.has_changes()
    }
}

/// Per-receiver allowed-field tables of one record type.
///
/// Built at compile time from the layout: a base table plus one overlay per
/// capability flag. [`mask_for`](Self::mask_for) ORs the overlays of every
/// flag the receiver holds onto the base, so the result does not depend on
/// the order flags are considered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedMask<const B: usize> {
    bits: u32,
    base: [u32; B],
    umbrellas: [u32; B],
    overlays: [(UpdateFieldFlags, [u32; B]); 4],
}

impl<const B: usize> AllowedMask<B> {
    #[must_use]
    pub const fn from_layout(layout: &RecordLayout) -> Self {
        Self {
            bits: layout.bit_count(),
            base: layout.allowed_blocks(UpdateFieldFlags::empty()),
            umbrellas: layout.umbrella_blocks(),
            overlays: [
                overlay(layout, UpdateFieldFlags::OWNER),
                overlay(layout, UpdateFieldFlags::PARTY_MEMBER),
                overlay(layout, UpdateFieldFlags::UNIT_ALL),
                overlay(layout, UpdateFieldFlags::EMPATH),
            ],
        }
    }

    /// Fields a receiver holding `flags` may be sent.
    #[must_use]
    pub fn mask_for(&self, flags: UpdateFieldFlags) -> ChangeMask<B> {
        let mut blocks = self.base;
        for (flag, overlay) in &self.overlays {
            if flags.contains(*flag) {
                for (block, extra) in blocks.iter_mut().zip(overlay) {
                    *block |= extra;
                }
            }
        }
        ChangeMask::from_blocks(self.bits, blocks)
    }

    /// `changes ∩ allowed(flags)`, with every bit considered changed when
    /// `ignore_nested` is requested.
    #[must_use]
    pub fn filter(
        &self,
        changes: &ChangeMask<B>,
        flags: UpdateFieldFlags,
        ignore_nested: bool,
    ) -> ChangeMask<B> {
        let mut effective = *changes;
        if ignore_nested {
            effective.set_all();
        }
        effective & self.mask_for(flags)
    }

    /// Whether `changes` holds a field, not just an umbrella bit, that a
    /// receiver holding `flags` may be sent.
    #[must_use]
    pub fn admits_any(&self, changes: &ChangeMask<B>, flags: UpdateFieldFlags) -> bool {
        let visible = self.filter(changes, flags, false);
        (0..B).any(|block| visible.block(block) & !self.umbrellas[block] != 0)
    }
}

const fn overlay<const B: usize>(
    layout: &RecordLayout,
    flag: UpdateFieldFlags,
) -> (UpdateFieldFlags, [u32; B]) {
    (flag, layout.allowed_blocks(flag))
}
