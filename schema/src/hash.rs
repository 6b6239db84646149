//! Deterministic layout fingerprints.

use blake3::Hasher;

use crate::layout::{RecordLayout, Section, Slot, SlotKind};

/// Computes a deterministic fingerprint of a record layout.
///
/// Any change that moves a bit (reordering, inserting, resizing an array)
/// or changes a slot's kind or visibility changes the fingerprint.
#[must_use]
pub fn layout_hash(layout: &RecordLayout) -> u64 {
    let mut hasher = Hasher::new();
    write_str(&mut hasher, layout.name);
    write_u32(&mut hasher, layout.sections.len() as u32);

    for section in layout.sections {
        match section {
            Section::Group { name, slots } => {
                write_u8(&mut hasher, 0);
                write_str(&mut hasher, name);
                write_u32(&mut hasher, slots.len() as u32);
                for slot in *slots {
                    write_slot(&mut hasher, slot);
                }
            }
            Section::Array { slot, len } => {
                write_u8(&mut hasher, 1);
                write_u32(&mut hasher, *len);
                write_slot(&mut hasher, slot);
            }
        }
    }

    let hash = hasher.finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(out)
}

fn write_slot(hasher: &mut Hasher, slot: &Slot) {
    write_str(hasher, slot.name);
    write_u8(
        hasher,
        match slot.kind {
            SlotKind::Scalar => 0,
            SlotKind::Dynamic => 1,
            SlotKind::Nested => 2,
        },
    );
    write_u8(hasher, slot.visibility.bits());
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UpdateFieldFlags;

    const A: RecordLayout = RecordLayout::new(
        "Rec",
        &[Section::group(
            "g",
            &[Slot::scalar("x"), Slot::scalar("y")],
        )],
    );
    const SWAPPED: RecordLayout = RecordLayout::new(
        "Rec",
        &[Section::group(
            "g",
            &[Slot::scalar("y"), Slot::scalar("x")],
        )],
    );
    const GATED: RecordLayout = RecordLayout::new(
        "Rec",
        &[Section::group(
            "g",
            &[
                Slot::scalar("x"),
                Slot::scalar("y").visible_to(UpdateFieldFlags::OWNER),
            ],
        )],
    );

    #[test]
    fn hash_is_stable() {
        assert_eq!(layout_hash(&A), layout_hash(&A));
    }

    #[test]
    fn hash_detects_reordering() {
        assert_ne!(layout_hash(&A), layout_hash(&SWAPPED));
    }

    #[test]
    fn hash_detects_visibility_change() {
        assert_ne!(layout_hash(&A), layout_hash(&GATED));
    }

    #[test]
    fn hash_detects_array_resize() {
        const FOUR: RecordLayout =
            RecordLayout::new("Arr", &[Section::array(Slot::scalar("v"), 4)]);
        const FIVE: RecordLayout =
            RecordLayout::new("Arr", &[Section::array(Slot::scalar("v"), 5)]);
        assert_ne!(layout_hash(&FOUR), layout_hash(&FIVE));
    }
}
