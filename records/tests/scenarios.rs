use bitstream::{BitReader, BitWriter};
use fields::{ChangeMask, ObjectGuid, SlotValue, UpdateFieldFlags, UpdateRecord};
use records::{
    active_player, object, skill, ActivePlayerData, EntityKind, EntityProfile, ObjectData,
    PlayerData, ProjectionConfig, QuestLog, SkillEntry, UnitData, UnitDynFlags, ViewContext,
};

const LOOTER: ObjectGuid = ObjectGuid::new(0, 10);
const BYSTANDER: ObjectGuid = ObjectGuid::new(0, 11);

fn creature() -> EntityProfile {
    let mut subject = EntityProfile::new(ObjectGuid::new(0xF130, 1), EntityKind::Creature);
    subject.looters.push(LOOTER);
    subject
}

fn player(guid: ObjectGuid) -> EntityProfile {
    EntityProfile::new(guid, EntityKind::Player)
}

fn create_bytes<R>(record: &R, flags: UpdateFieldFlags, view: &ViewContext<'_>) -> Vec<u8>
where
    R: for<'a> UpdateRecord<ViewContext<'a>>,
{
    let mut writer = BitWriter::new();
    record.write_create(&mut writer, flags, view);
    writer.finish()
}

fn update_bytes<R>(
    record: &R,
    flags: UpdateFieldFlags,
    ignore_nested: bool,
    view: &ViewContext<'_>,
) -> Vec<u8>
where
    R: for<'a> UpdateRecord<ViewContext<'a>>,
{
    let mut writer = BitWriter::new();
    record.write_update(&mut writer, flags, ignore_nested, view);
    writer.finish()
}

#[test]
fn lootable_flag_only_reaches_looters() {
    let subject = creature();
    let config = ProjectionConfig::default();
    let mut object = ObjectData::new();
    object.set_dynamic_flags(UnitDynFlags::LOOTABLE.bits());

    for (receiver, expected) in [(LOOTER, UnitDynFlags::LOOTABLE.bits()), (BYSTANDER, 0)] {
        let receiver = player(receiver);
        let view = ViewContext::new(&subject, &receiver, &config);

        let create = create_bytes(&object, UpdateFieldFlags::NONE, &view);
        let mut reader = BitReader::new(&create);
        assert_eq!(reader.read_i32().unwrap(), 0);
        assert_eq!(reader.read_u32().unwrap(), expected);

        let update = update_bytes(&object, UpdateFieldFlags::NONE, false, &view);
        let mut reader = BitReader::new(&update);
        let header =
            ChangeMask::<{ object::BLOCKS }>::read_header(&mut reader, object::LAYOUT.bit_count())
                .unwrap();
        assert_eq!(
            header.iter_set().collect::<Vec<_>>(),
            vec![object::bit::OBJECT, object::bit::DYNAMIC_FLAGS]
        );
        reader.align_to_byte();
        assert_eq!(reader.read_u32().unwrap(), expected);
        assert!(reader.is_empty());
    }

    assert_eq!(object.dynamic_flags(), UnitDynFlags::LOOTABLE.bits());
    assert!(object.changes().get(object::bit::DYNAMIC_FLAGS));
}

#[test]
fn clean_records_write_only_a_header() {
    let subject = creature();
    let receiver = player(LOOTER);
    let config = ProjectionConfig::default();
    let view = ViewContext::new(&subject, &receiver, &config);
    let all = UpdateFieldFlags::all();

    assert_eq!(update_bytes(&ObjectData::new(), all, false, &view), vec![0]);
    assert_eq!(update_bytes(&UnitData::new(), all, false, &view), vec![0]);
    assert_eq!(update_bytes(&PlayerData::new(), all, false, &view), vec![0]);
    assert_eq!(
        update_bytes(&ActivePlayerData::new(), all, false, &view),
        vec![0; active_player::BLOCKS.div_ceil(8)]
    );
}

#[test]
fn cleared_unit_goes_quiet() {
    let subject = creature();
    let receiver = player(LOOTER);
    let config = ProjectionConfig::default();
    let view = ViewContext::new(&subject, &receiver, &config);

    let mut unit = UnitData::new();
    unit.set_health(100);
    unit.add_passive_spell(133, 0);
    assert!(unit.has_changes());

    unit.clear_nested_changes();
    assert!(!unit.has_changes());
    assert!(!unit.passive_spells()[0].has_changes());
    assert_eq!(
        update_bytes(&unit, UpdateFieldFlags::NONE, false, &view),
        vec![0]
    );
}

#[test]
fn full_update_carries_create_values() {
    let subject = creature();
    let receiver = player(LOOTER);
    let config = ProjectionConfig::default();
    let view = ViewContext::new(&subject, &receiver, &config);

    let mut object = ObjectData::new();
    object.set_entry_id(1498);
    object.set_scale(1.5);
    object.clear_nested_changes();

    let create = create_bytes(&object, UpdateFieldFlags::NONE, &view);
    let update = update_bytes(&object, UpdateFieldFlags::NONE, true, &view);
    // one presence bit and one block, padded to a byte
    assert_eq!(&update[5..], &create[..]);

    let mut quest = QuestLog::new(42);
    quest.set_objective_progress(0, 3);
    let mut create = BitWriter::new();
    quest.write_create(&mut create, UpdateFieldFlags::NONE, &());
    let mut update = BitWriter::new();
    quest.write_update(&mut update, UpdateFieldFlags::NONE, true, &());
    assert_eq!(&update.finish()[5..], &create.finish()[..]);
}

#[test]
fn nested_skill_header_spans_two_mask_words() {
    let subject = player(LOOTER);
    let config = ProjectionConfig::default();
    let view = ViewContext::new(&subject, &subject, &config);

    let mut active = ActivePlayerData::new();
    active.skill_mut().set_entry(
        200,
        SkillEntry {
            rank: 5,
            ..SkillEntry::default()
        },
    );

    let bytes = update_bytes(&active, UpdateFieldFlags::OWNER, false, &view);
    let mut reader = BitReader::new(&bytes);
    let parent = ChangeMask::<{ active_player::BLOCKS }>::read_header(
        &mut reader,
        active_player::LAYOUT.bit_count(),
    )
    .unwrap();
    assert_eq!(
        parent.iter_set().collect::<Vec<_>>(),
        vec![active_player::bit::ACTIVE_PLAYER, active_player::bit::SKILL]
    );
    reader.align_to_byte();

    let nested =
        ChangeMask::<{ skill::BLOCKS }>::read_header(&mut reader, skill::LAYOUT.bit_count())
            .unwrap();
    let rank_bit = skill::bit::SKILL_RANK + 1 + 200;
    assert!(skill::BLOCKS > 32);
    assert_eq!(
        nested.iter_set().collect::<Vec<_>>(),
        vec![skill::bit::SKILL_RANK, rank_bit]
    );
    reader.align_to_byte();
    assert_eq!(reader.read_u16().unwrap(), 5);
    assert!(reader.is_empty());
}
