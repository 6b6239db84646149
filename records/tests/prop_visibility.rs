use bitstream::{BitReader, BitWriter};
use fields::{AllowedMask, ChangeMask, ObjectGuid, UpdateFieldFlags, UpdateRecord};
use proptest::prelude::*;
use records::unit::{self, bit, MAX_RESISTANCES, MAX_STATS};
use records::{EntityKind, EntityProfile, ProjectionConfig, UnitData, ViewContext};

const ALLOWED: AllowedMask<{ unit::BLOCKS }> = AllowedMask::from_layout(&unit::LAYOUT);

#[derive(Debug, Clone)]
enum Op {
    Health(i64),
    Level(i32),
    AttackPower(i32),
    CastSpeed(f32),
    Stat(usize, i32),
    Resistance(usize, i32),
    Power(usize, i32),
    Effect(i32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<i64>().prop_map(Op::Health),
        any::<i32>().prop_map(Op::Level),
        any::<i32>().prop_map(Op::AttackPower),
        (0.5f32..2.0).prop_map(Op::CastSpeed),
        (0..MAX_STATS, any::<i32>()).prop_map(|(i, v)| Op::Stat(i, v)),
        (0..MAX_RESISTANCES, any::<i32>()).prop_map(|(i, v)| Op::Resistance(i, v)),
        (0..unit::MAX_POWERS, any::<i32>()).prop_map(|(i, v)| Op::Power(i, v)),
        any::<i32>().prop_map(Op::Effect),
    ]
}

fn apply(unit: &mut UnitData, op: &Op) {
    match *op {
        Op::Health(v) => {
            unit.set_health(v);
        }
        Op::Level(v) => {
            unit.set_level(v);
        }
        Op::AttackPower(v) => {
            unit.set_attack_power(v);
        }
        Op::CastSpeed(v) => {
            unit.set_mod_cast_speed(v);
        }
        Op::Stat(i, v) => {
            unit.set_stats(i, v);
        }
        Op::Resistance(i, v) => {
            unit.set_resistances(i, v);
        }
        Op::Power(i, v) => {
            unit.set_power(i, v);
        }
        Op::Effect(v) => unit.add_state_world_effect(v),
    }
}

fn flags() -> impl Strategy<Value = UpdateFieldFlags> {
    any::<u8>().prop_map(UpdateFieldFlags::from_bits_truncate)
}

fn written_header(unit: &UnitData, flags: UpdateFieldFlags) -> ChangeMask<{ unit::BLOCKS }> {
    let subject = EntityProfile::new(ObjectGuid::new(0, 1), EntityKind::Creature);
    let receiver = EntityProfile::new(ObjectGuid::new(0, 2), EntityKind::Player);
    let config = ProjectionConfig::default();
    let view = ViewContext::new(&subject, &receiver, &config);

    let mut writer = BitWriter::new();
    unit.write_update(&mut writer, flags, false, &view);
    let bytes = writer.finish();
    let mut reader = BitReader::new(&bytes);
    ChangeMask::read_header(&mut reader, unit::LAYOUT.bit_count()).unwrap()
}

proptest! {
    #[test]
    fn header_is_changes_within_allowed(ops in prop::collection::vec(op(), 0..24), flags in flags()) {
        let mut unit = UnitData::new();
        for op in &ops {
            apply(&mut unit, op);
        }

        let header = written_header(&unit, flags);
        prop_assert!(header.is_subset_of(unit.changes()));
        prop_assert!(header.is_subset_of(&ALLOWED.mask_for(flags)));
        prop_assert_eq!(header, *unit.changes() & ALLOWED.mask_for(flags));
    }

    #[test]
    fn more_flags_never_see_less(ops in prop::collection::vec(op(), 1..24), a in flags(), b in flags()) {
        let mut unit = UnitData::new();
        for op in &ops {
            apply(&mut unit, op);
        }

        let narrow = written_header(&unit, a);
        let wide = written_header(&unit, a | b);
        prop_assert!(narrow.is_subset_of(&wide));
    }

    #[test]
    fn strangers_never_see_gated_bits(ops in prop::collection::vec(op(), 1..24)) {
        let mut unit = UnitData::new();
        for op in &ops {
            apply(&mut unit, op);
        }

        let header = written_header(&unit, UpdateFieldFlags::NONE);
        for gated in [bit::COMBAT, bit::ATTACK_POWER, bit::MOD_CAST_SPEED, bit::STATS, bit::RESISTANCES] {
            prop_assert!(!header.get(gated));
        }
        for index in 0..MAX_STATS as u32 {
            prop_assert!(!header.get(bit::STATS + 1 + index));
        }
    }
}
