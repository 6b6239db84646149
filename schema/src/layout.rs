//! Ordered record layouts and compile-time bit assignment.
//!
//! A record's change mask is laid out section by section, in declaration
//! order:
//!
//! - a **group** occupies one umbrella bit followed by one bit per slot;
//! - an **array** occupies one base bit followed by one bit per element.
//!
//! Every bit position is derived from this order by `const fn`s, so records
//! never hand-maintain indices and reordering a declaration is the only way
//! to change the wire layout.

use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};
use crate::flags::UpdateFieldFlags;

/// What a single slot bit stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SlotKind {
    /// A plain value written directly.
    Scalar,
    /// A variable-length collection with its own per-index change flags.
    Dynamic,
    /// A nested record with its own change mask.
    Nested,
}

/// A named slot inside a group, or the element type of an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Slot {
    pub name: &'static str,
    pub kind: SlotKind,
    /// Receivers allowed to see the slot; empty means everyone.
    pub visibility: UpdateFieldFlags,
}

impl Slot {
    #[must_use]
    pub const fn scalar(name: &'static str) -> Self {
        Self::new(name, SlotKind::Scalar)
    }

    #[must_use]
    pub const fn dynamic(name: &'static str) -> Self {
        Self::new(name, SlotKind::Dynamic)
    }

    #[must_use]
    pub const fn nested(name: &'static str) -> Self {
        Self::new(name, SlotKind::Nested)
    }

    const fn new(name: &'static str, kind: SlotKind) -> Self {
        Self {
            name,
            kind,
            visibility: UpdateFieldFlags::empty(),
        }
    }

    /// Restricts the slot to receivers holding any of `flags`.
    #[must_use]
    pub const fn visible_to(mut self, flags: UpdateFieldFlags) -> Self {
        self.visibility = flags;
        self
    }
}

/// One contiguous run of mask bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Section {
    /// Umbrella bit followed by one bit per slot.
    Group {
        name: &'static str,
        slots: &'static [Slot],
    },
    /// Base bit followed by `len` element bits.
    Array { slot: Slot, len: u32 },
}

impl Section {
    #[must_use]
    pub const fn group(name: &'static str, slots: &'static [Slot]) -> Self {
        Self::Group { name, slots }
    }

    #[must_use]
    pub const fn array(slot: Slot, len: u32) -> Self {
        Self::Array { slot, len }
    }

    /// Number of mask bits the section occupies.
    #[must_use]
    pub const fn bit_len(&self) -> u32 {
        match self {
            Self::Group { slots, .. } => 1 + slots.len() as u32,
            Self::Array { len, .. } => 1 + *len,
        }
    }
}

/// Role of one bit in a record's change mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BitRole {
    /// Umbrella bit of a group.
    Group,
    /// A slot inside a group.
    Slot(SlotKind),
    /// "Any element changed" bit of an array.
    ArrayBase,
    /// One array element.
    ArrayElement(u32),
}

/// Description of a single mask bit, for tooling and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BitInfo {
    pub bit: u32,
    pub name: &'static str,
    pub role: BitRole,
    pub visibility: UpdateFieldFlags,
}

/// The ordered layout of one record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RecordLayout {
    pub name: &'static str,
    pub sections: &'static [Section],
}

impl RecordLayout {
    #[must_use]
    pub const fn new(name: &'static str, sections: &'static [Section]) -> Self {
        Self { name, sections }
    }

    /// Total number of bits in the record's change mask.
    #[must_use]
    pub const fn bit_count(&self) -> u32 {
        let mut bits = 0;
        let mut s = 0;
        while s < self.sections.len() {
            bits += self.sections[s].bit_len();
            s += 1;
        }
        bits
    }

    /// Number of 32-bit blocks in the record's change mask.
    #[must_use]
    pub const fn block_count(&self) -> usize {
        self.bit_count().div_ceil(32) as usize
    }

    /// Bit owned by the named group, slot or array (its base bit).
    ///
    /// Evaluated in const context, an unknown name fails compilation.
    #[must_use]
    pub const fn bit_of(&self, name: &str) -> u32 {
        match self.find(name) {
            Some((bit, _)) => bit,
            None => panic!("no slot with this name in record layout"),
        }
    }

    /// Declared visibility of the named slot or array.
    ///
    /// Groups carry no visibility of their own and report empty.
    #[must_use]
    pub const fn visibility_of(&self, name: &str) -> UpdateFieldFlags {
        match self.find(name) {
            Some((_, visibility)) => visibility,
            None => panic!("no slot with this name in record layout"),
        }
    }

    const fn find(&self, name: &str) -> Option<(u32, UpdateFieldFlags)> {
        let mut bit = 0;
        let mut s = 0;
        while s < self.sections.len() {
            match self.sections[s] {
                Section::Group {
                    name: group,
                    slots,
                } => {
                    if str_eq(group, name) {
                        return Some((bit, UpdateFieldFlags::empty()));
                    }
                    let mut i = 0;
                    while i < slots.len() {
                        if str_eq(slots[i].name, name) {
                            return Some((bit + 1 + i as u32, slots[i].visibility));
                        }
                        i += 1;
                    }
                }
                Section::Array { slot, .. } => {
                    if str_eq(slot.name, name) {
                        return Some((bit, slot.visibility));
                    }
                }
            }
            bit += self.sections[s].bit_len();
            s += 1;
        }
        None
    }

    /// Mask blocks selected by a visibility flag.
    ///
    /// With `flag` empty this is the base table (slots visible to everyone).
    /// Otherwise it is the overlay for `flag`: slots whose visibility
    /// intersects it. A group's umbrella bit is included whenever one of its
    /// slots is; an array contributes its base and every element bit.
    #[must_use]
    pub const fn allowed_blocks<const B: usize>(&self, flag: UpdateFieldFlags) -> [u32; B] {
        assert!(
            B * 32 >= self.bit_count() as usize,
            "block count too small for record layout"
        );
        let mut out = [0u32; B];
        let mut bit = 0;
        let mut s = 0;
        while s < self.sections.len() {
            match self.sections[s] {
                Section::Group { slots, .. } => {
                    let mut any = false;
                    let mut i = 0;
                    while i < slots.len() {
                        if selects(slots[i].visibility, flag) {
                            out = with_bit(out, bit + 1 + i as u32);
                            any = true;
                        }
                        i += 1;
                    }
                    if any {
                        out = with_bit(out, bit);
                    }
                }
                Section::Array { slot, len } => {
                    if selects(slot.visibility, flag) {
                        let mut j = 0;
                        while j <= len {
                            out = with_bit(out, bit + j);
                            j += 1;
                        }
                    }
                }
            }
            bit += self.sections[s].bit_len();
            s += 1;
        }
        out
    }

    /// Mask blocks holding only umbrella bits: group bits and array bases.
    ///
    /// An umbrella is set whenever one of its members is, so it never
    /// carries a value of its own.
    #[must_use]
    pub const fn umbrella_blocks<const B: usize>(&self) -> [u32; B] {
        assert!(
            B * 32 >= self.bit_count() as usize,
            "block count too small for record layout"
        );
        let mut out = [0u32; B];
        let mut bit = 0;
        let mut s = 0;
        while s < self.sections.len() {
            out = with_bit(out, bit);
            bit += self.sections[s].bit_len();
            s += 1;
        }
        out
    }

    /// Describes every bit of the mask in order.
    #[must_use]
    pub fn bits(&self) -> Vec<BitInfo> {
        let mut out = Vec::with_capacity(self.bit_count() as usize);
        for section in self.sections {
            let base = out.len() as u32;
            match *section {
                Section::Group { name, slots } => {
                    out.push(BitInfo {
                        bit: base,
                        name,
                        role: BitRole::Group,
                        visibility: UpdateFieldFlags::empty(),
                    });
                    for (i, slot) in slots.iter().enumerate() {
                        out.push(BitInfo {
                            bit: base + 1 + i as u32,
                            name: slot.name,
                            role: BitRole::Slot(slot.kind),
                            visibility: slot.visibility,
                        });
                    }
                }
                Section::Array { slot, len } => {
                    out.push(BitInfo {
                        bit: base,
                        name: slot.name,
                        role: BitRole::ArrayBase,
                        visibility: slot.visibility,
                    });
                    for index in 0..len {
                        out.push(BitInfo {
                            bit: base + 1 + index,
                            name: slot.name,
                            role: BitRole::ArrayElement(index),
                            visibility: slot.visibility,
                        });
                    }
                }
            }
        }
        out
    }

    /// Checks the layout for declaration mistakes.
    pub fn validate(&self) -> SchemaResult<()> {
        if self.sections.is_empty() {
            return Err(SchemaError::EmptyRecord { record: self.name });
        }
        let mut seen = HashSet::new();
        let mut check_name = |name: &'static str| {
            if name.is_empty() {
                return Err(SchemaError::EmptyName { record: self.name });
            }
            if !seen.insert(name) {
                return Err(SchemaError::DuplicateName {
                    record: self.name,
                    name,
                });
            }
            Ok(())
        };
        for section in self.sections {
            match *section {
                Section::Group { name, slots } => {
                    check_name(name)?;
                    if slots.is_empty() {
                        return Err(SchemaError::EmptyGroup {
                            record: self.name,
                            group: name,
                        });
                    }
                    for slot in slots {
                        check_name(slot.name)?;
                    }
                }
                Section::Array { slot, len } => {
                    check_name(slot.name)?;
                    if len == 0 {
                        return Err(SchemaError::EmptyArray {
                            record: self.name,
                            array: slot.name,
                        });
                    }
                    if slot.kind == SlotKind::Dynamic {
                        return Err(SchemaError::DynamicArrayElement {
                            record: self.name,
                            array: slot.name,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

const fn selects(visibility: UpdateFieldFlags, flag: UpdateFieldFlags) -> bool {
    if flag.is_empty() {
        visibility.is_empty()
    } else {
        visibility.intersects(flag)
    }
}

const fn with_bit<const B: usize>(mut blocks: [u32; B], bit: u32) -> [u32; B] {
    blocks[(bit / 32) as usize] |= 1 << (bit % 32);
    blocks
}

const fn str_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: UpdateFieldFlags = UpdateFieldFlags::OWNER;

    const SAMPLE: RecordLayout = RecordLayout::new(
        "Sample",
        &[
            Section::group(
                "core",
                &[
                    Slot::scalar("health"),
                    Slot::dynamic("effects"),
                    Slot::scalar("secret").visible_to(OWNER),
                ],
            ),
            Section::group(
                "private",
                &[Slot::scalar("coins").visible_to(OWNER)],
            ),
            Section::array(Slot::scalar("power"), 4),
            Section::array(Slot::nested("items").visible_to(UpdateFieldFlags::EMPATH), 2),
        ],
    );

    const HEALTH: u32 = SAMPLE.bit_of("health");
    const POWER: u32 = SAMPLE.bit_of("power");
    const BASE: [u32; 1] = SAMPLE.allowed_blocks(UpdateFieldFlags::empty());

    #[test]
    fn bit_positions_follow_declaration_order() {
        assert_eq!(SAMPLE.bit_of("core"), 0);
        assert_eq!(HEALTH, 1);
        assert_eq!(SAMPLE.bit_of("effects"), 2);
        assert_eq!(SAMPLE.bit_of("secret"), 3);
        assert_eq!(SAMPLE.bit_of("private"), 4);
        assert_eq!(SAMPLE.bit_of("coins"), 5);
        assert_eq!(POWER, 6);
        assert_eq!(SAMPLE.bit_of("items"), 11);
        assert_eq!(SAMPLE.bit_count(), 14);
        assert_eq!(SAMPLE.block_count(), 1);
    }

    #[test]
    fn visibility_lookup() {
        assert_eq!(SAMPLE.visibility_of("secret"), OWNER);
        assert!(SAMPLE.visibility_of("health").is_empty());
        assert!(SAMPLE.visibility_of("core").is_empty());
    }

    #[test]
    #[should_panic(expected = "no slot with this name")]
    fn unknown_name_panics() {
        let _ = SAMPLE.bit_of("missing");
    }

    #[test]
    fn base_table_excludes_gated_slots() {
        // core group + health + effects + power base and elements
        let expected = 0b1 | 0b10 | 0b100 | (0b1_1111 << 6);
        assert_eq!(BASE, [expected]);
    }

    #[test]
    fn overlay_includes_group_umbrella() {
        let owner: [u32; 1] = SAMPLE.allowed_blocks(OWNER);
        // secret (3) pulls in core (0); coins (5) pulls in private (4)
        assert_eq!(owner, [0b11_1001]);
        let empath: [u32; 1] = SAMPLE.allowed_blocks(UpdateFieldFlags::EMPATH);
        assert_eq!(empath, [0b111 << 11]);
    }

    #[test]
    fn umbrellas_open_every_section() {
        let umbrellas: [u32; 1] = SAMPLE.umbrella_blocks();
        // core, private, power, items
        assert_eq!(umbrellas, [1 | 1 << 4 | 1 << 6 | 1 << 11]);
    }

    #[test]
    fn large_layout_spans_blocks() {
        const WIDE: RecordLayout =
            RecordLayout::new("Wide", &[Section::array(Slot::scalar("values"), 40)]);
        let base: [u32; 2] = WIDE.allowed_blocks(UpdateFieldFlags::empty());
        assert_eq!(WIDE.bit_count(), 41);
        assert_eq!(WIDE.block_count(), 2);
        assert_eq!(base, [u32::MAX, 0x1FF]);
    }

    #[test]
    fn bits_describe_every_position() {
        let bits = SAMPLE.bits();
        assert_eq!(bits.len(), SAMPLE.bit_count() as usize);
        for (i, info) in bits.iter().enumerate() {
            assert_eq!(info.bit as usize, i);
        }
        assert_eq!(bits[0].role, BitRole::Group);
        assert_eq!(bits[2].role, BitRole::Slot(SlotKind::Dynamic));
        assert_eq!(bits[6].role, BitRole::ArrayBase);
        assert_eq!(bits[9].role, BitRole::ArrayElement(2));
        assert_eq!(bits[9].name, "power");
    }

    #[test]
    fn validate_accepts_sample() {
        assert_eq!(SAMPLE.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_duplicates() {
        const DUP: RecordLayout = RecordLayout::new(
            "Dup",
            &[
                Section::group("a", &[Slot::scalar("x")]),
                Section::array(Slot::scalar("x"), 2),
            ],
        );
        assert_eq!(
            DUP.validate(),
            Err(SchemaError::DuplicateName {
                record: "Dup",
                name: "x"
            })
        );
    }

    #[test]
    fn validate_rejects_empty_shapes() {
        const EMPTY_GROUP: RecordLayout = RecordLayout::new("G", &[Section::group("g", &[])]);
        const EMPTY_ARRAY: RecordLayout =
            RecordLayout::new("A", &[Section::array(Slot::scalar("a"), 0)]);
        const DYN_ARRAY: RecordLayout =
            RecordLayout::new("D", &[Section::array(Slot::dynamic("d"), 3)]);
        const NOTHING: RecordLayout = RecordLayout::new("N", &[]);

        assert!(matches!(
            EMPTY_GROUP.validate(),
            Err(SchemaError::EmptyGroup { .. })
        ));
        assert!(matches!(
            EMPTY_ARRAY.validate(),
            Err(SchemaError::EmptyArray { .. })
        ));
        assert!(matches!(
            DYN_ARRAY.validate(),
            Err(SchemaError::DynamicArrayElement { .. })
        ));
        assert!(matches!(
            NOTHING.validate(),
            Err(SchemaError::EmptyRecord { .. })
        ));
    }
}
