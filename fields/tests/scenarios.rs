use bitstream::{BitReader, BitWriter};
use fields::{
    AllowedMask, ChangeMask, DynamicUpdateField, SlotValue, UpdateField, UpdateFieldArray,
    UpdateFieldFlags, UpdateRecord, DEFAULT_SIZE_BITS,
};
use schema::{RecordLayout, Section, Slot};

// A single int32 behind one group bit.

const SCALAR: RecordLayout =
    RecordLayout::new("Scalar", &[Section::group("root", &[Slot::scalar("value")])]);
const SCALAR_BLOCKS: usize = SCALAR.block_count();
const SCALAR_ROOT: u32 = SCALAR.bit_of("root");
const SCALAR_VALUE: u32 = SCALAR.bit_of("value");
const SCALAR_ALLOWED: AllowedMask<SCALAR_BLOCKS> = AllowedMask::from_layout(&SCALAR);

struct ScalarRecord {
    changes: ChangeMask<SCALAR_BLOCKS>,
    value: UpdateField<i32, SCALAR_ROOT, SCALAR_VALUE>,
}

impl ScalarRecord {
    fn new() -> Self {
        Self {
            changes: ChangeMask::for_layout(&SCALAR),
            value: UpdateField::default(),
        }
    }
}

impl SlotValue for ScalarRecord {
    fn clear_nested_changes(&mut self) {
        self.changes.reset_all();
    }

    fn mark_nested_changes(&mut self) {
        self.changes.set_all();
    }
}

impl UpdateRecord<()> for ScalarRecord {
    fn write_create(&self, data: &mut BitWriter, _flags: UpdateFieldFlags, _view: &()) {
        data.write_i32(*self.value);
    }

    fn write_update(
        &self,
        data: &mut BitWriter,
        flags: UpdateFieldFlags,
        ignore_nested: bool,
        _view: &(),
    ) {
        let mask = SCALAR_ALLOWED.filter(&self.changes, flags, ignore_nested);
        mask.write_header(data);
        data.flush_bits();
        if mask.get(SCALAR_ROOT) && mask.get(SCALAR_VALUE) {
            data.write_i32(*self.value);
        }
    }

    fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }
}

// Sixteen uint16 values behind an array base bit.

const ARRAY: RecordLayout =
    RecordLayout::new("Array", &[Section::array(Slot::scalar("values"), 16)]);
const ARRAY_BLOCKS: usize = ARRAY.block_count();
const ARRAY_BASE: u32 = ARRAY.bit_of("values");
const ARRAY_ALLOWED: AllowedMask<ARRAY_BLOCKS> = AllowedMask::from_layout(&ARRAY);

struct ArrayRecord {
    changes: ChangeMask<ARRAY_BLOCKS>,
    values: UpdateFieldArray<u16, 16, ARRAY_BASE>,
}

impl ArrayRecord {
    fn write_update(&self, data: &mut BitWriter) {
        let mask = ARRAY_ALLOWED.filter(&self.changes, UpdateFieldFlags::NONE, false);
        mask.write_header(data);
        data.flush_bits();
        for (_, value) in self.values.changed(&mask) {
            data.write_u16(*value);
        }
    }
}

// A dynamic list of nested pairs plus a dynamic list of u32.

const PAIR: RecordLayout = RecordLayout::new(
    "Pair",
    &[Section::group("pair", &[Slot::scalar("left"), Slot::scalar("right")])],
);
const PAIR_BLOCKS: usize = PAIR.block_count();
const PAIR_GROUP: u32 = PAIR.bit_of("pair");
const PAIR_LEFT: u32 = PAIR.bit_of("left");
const PAIR_RIGHT: u32 = PAIR.bit_of("right");
const PAIR_ALLOWED: AllowedMask<PAIR_BLOCKS> = AllowedMask::from_layout(&PAIR);

#[derive(Debug, Clone, PartialEq)]
struct Pair {
    changes: ChangeMask<PAIR_BLOCKS>,
    left: UpdateField<u8, PAIR_GROUP, PAIR_LEFT>,
    right: UpdateField<u8, PAIR_GROUP, PAIR_RIGHT>,
}

impl Pair {
    fn new(left: u8, right: u8) -> Self {
        Self {
            changes: ChangeMask::for_layout(&PAIR),
            left: UpdateField::new(left),
            right: UpdateField::new(right),
        }
    }

    fn set_right(&mut self, value: u8) {
        self.right.set(value, &mut self.changes);
    }
}

impl SlotValue for Pair {
    fn clear_nested_changes(&mut self) {
        self.changes.reset_all();
    }

    fn mark_nested_changes(&mut self) {
        self.changes.set_all();
    }
}

impl UpdateRecord<()> for Pair {
    fn write_create(&self, data: &mut BitWriter, _flags: UpdateFieldFlags, _view: &()) {
        data.write_u8(*self.left);
        data.write_u8(*self.right);
    }

    fn write_update(
        &self,
        data: &mut BitWriter,
        flags: UpdateFieldFlags,
        ignore_nested: bool,
        _view: &(),
    ) {
        let mask = PAIR_ALLOWED.filter(&self.changes, flags, ignore_nested);
        mask.write_header(data);
        data.flush_bits();
        if mask.get(PAIR_GROUP) {
            if mask.get(PAIR_LEFT) {
                data.write_u8(*self.left);
            }
            if mask.get(PAIR_RIGHT) {
                data.write_u8(*self.right);
            }
        }
    }

    fn has_changes(&self) -> bool {
        self.changes.is_any_set()
    }
}

const LISTS: RecordLayout = RecordLayout::new(
    "Lists",
    &[Section::group(
        "root",
        &[Slot::dynamic("numbers"), Slot::dynamic("pairs")],
    )],
);
const LISTS_BLOCKS: usize = LISTS.block_count();
const LISTS_ROOT: u32 = LISTS.bit_of("root");
const LISTS_NUMBERS: u32 = LISTS.bit_of("numbers");
const LISTS_PAIRS: u32 = LISTS.bit_of("pairs");
const LISTS_ALLOWED: AllowedMask<LISTS_BLOCKS> = AllowedMask::from_layout(&LISTS);

struct ListsRecord {
    changes: ChangeMask<LISTS_BLOCKS>,
    numbers: DynamicUpdateField<u32, LISTS_ROOT, LISTS_NUMBERS>,
    pairs: DynamicUpdateField<Pair, LISTS_ROOT, LISTS_PAIRS>,
}

impl ListsRecord {
    fn new() -> Self {
        Self {
            changes: ChangeMask::for_layout(&LISTS),
            numbers: DynamicUpdateField::new(),
            pairs: DynamicUpdateField::new(),
        }
    }

    fn clear_changes_mask(&mut self) {
        self.numbers.clear_changes();
        self.pairs.clear_changes();
        self.changes.reset_all();
    }

    fn write_update(&self, data: &mut BitWriter, ignore_nested: bool) {
        let mask = LISTS_ALLOWED.filter(&self.changes, UpdateFieldFlags::NONE, ignore_nested);
        mask.write_header(data);
        if mask.get(LISTS_ROOT) {
            if mask.get(LISTS_NUMBERS) {
                self.numbers
                    .write_update_mask(data, DEFAULT_SIZE_BITS, ignore_nested);
            }
            if mask.get(LISTS_PAIRS) {
                self.pairs.write_update_mask(data, DEFAULT_SIZE_BITS, ignore_nested);
            }
        }
        data.flush_bits();
        if mask.get(LISTS_ROOT) {
            if mask.get(LISTS_NUMBERS) {
                self.numbers.write_update_values(data, ignore_nested);
            }
            if mask.get(LISTS_PAIRS) {
                self.pairs
                    .write_update_records(data, UpdateFieldFlags::NONE, ignore_nested, &());
            }
        }
    }
}

fn update_bytes<R: UpdateRecord<()>>(record: &R, flags: UpdateFieldFlags) -> Vec<u8> {
    let mut writer = BitWriter::new();
    record.write_update(&mut writer, flags, false, &());
    writer.finish()
}

#[test]
fn scalar_update_scenario() {
    let mut record = ScalarRecord::new();
    assert_eq!(SCALAR_VALUE, 1);
    record.value.set(42, &mut record.changes);

    let bytes = update_bytes(&record, UpdateFieldFlags::NONE);
    // presence bit for block 0, block 0 = 0b11, pad, then 42 little-endian
    assert_eq!(
        bytes,
        vec![0x80, 0x00, 0x00, 0x01, 0x80, 0x2A, 0x00, 0x00, 0x00]
    );

    let mut reader = BitReader::new(&bytes);
    let mask = ChangeMask::<SCALAR_BLOCKS>::read_header(&mut reader, SCALAR.bit_count()).unwrap();
    assert_eq!(mask.iter_set().collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(reader.read_i32().unwrap(), 42);
    assert!(reader.is_empty());
}

#[test]
fn clean_scalar_update_is_header_only() {
    let mut record = ScalarRecord::new();
    record.value.set(42, &mut record.changes);
    record.clear_nested_changes();
    assert!(!record.has_changes());
    assert_eq!(update_bytes(&record, UpdateFieldFlags::OWNER), vec![0x00]);
}

#[test]
fn scalar_full_update_matches_create() {
    let mut record = ScalarRecord::new();
    record.value.set(-5, &mut record.changes);

    let mut create = BitWriter::new();
    record.write_create(&mut create, UpdateFieldFlags::NONE, &());
    let create = create.finish();

    let update = update_bytes(&record, UpdateFieldFlags::NONE);
    assert_eq!(&update[5..], create.as_slice());
}

#[test]
fn array_partial_change_scenario() {
    let mut record = ArrayRecord {
        changes: ChangeMask::for_layout(&ARRAY),
        values: UpdateFieldArray::default(),
    };
    record.values.set(3, 0xBEEF, &mut record.changes);
    assert!(record.changes.get(ARRAY_BASE));
    assert!(record.changes.get(ARRAY_BASE + 1 + 3));
    assert_eq!(record.changes.iter_set().count(), 2);

    let mut writer = BitWriter::new();
    record.write_update(&mut writer);
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    let mask = ChangeMask::<ARRAY_BLOCKS>::read_header(&mut reader, ARRAY.bit_count()).unwrap();
    assert_eq!(mask.iter_set().collect::<Vec<_>>(), vec![0, 4]);
    assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
    assert!(reader.is_empty(), "exactly one uint16 payload");
}

#[test]
fn dynamic_sparse_delta_scenario() {
    let mut record = ListsRecord::new();
    for value in 0..8 {
        record.numbers.push(value, &mut record.changes);
    }
    record.clear_changes_mask();

    record.numbers.set(2, 200, &mut record.changes);
    record.numbers.set(5, 500, &mut record.changes);
    assert_eq!(record.numbers.changed_indices().collect::<Vec<_>>(), vec![2, 5]);

    let mut writer = BitWriter::new();
    record.write_update(&mut writer, false);
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    let mask = ChangeMask::<LISTS_BLOCKS>::read_header(&mut reader, LISTS.bit_count()).unwrap();
    assert_eq!(mask.iter_set().collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(reader.read_bits(32).unwrap(), 8, "size");
    assert!(!reader.read_bit().unwrap(), "sparse shape");
    assert_eq!(reader.read_bits(32).unwrap(), 2, "changed count");
    assert_eq!(reader.read_bits(32).unwrap(), 2);
    assert_eq!(reader.read_bits(32).unwrap(), 5);
    assert_eq!(reader.read_u32().unwrap(), 200);
    assert_eq!(reader.read_u32().unwrap(), 500);
    assert!(reader.is_empty(), "exactly two element payloads");
}

#[test]
fn pushed_nested_element_is_sent_in_full() {
    let mut record = ListsRecord::new();
    record.pairs.push(Pair::new(1, 2), &mut record.changes);

    let mut writer = BitWriter::new();
    record.write_update(&mut writer, false);
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    let mask = ChangeMask::<LISTS_BLOCKS>::read_header(&mut reader, LISTS.bit_count()).unwrap();
    assert_eq!(mask.iter_set().collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(reader.read_bits(32).unwrap(), 1);
    assert!(!reader.read_bit().unwrap());
    assert_eq!(reader.read_bits(32).unwrap(), 1);
    assert_eq!(reader.read_bits(32).unwrap(), 0);
    reader.align_to_byte();
    let nested = ChangeMask::<PAIR_BLOCKS>::read_header(&mut reader, PAIR.bit_count()).unwrap();
    assert_eq!(nested.iter_set().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(reader.read_u8().unwrap(), 1);
    assert_eq!(reader.read_u8().unwrap(), 2);
    assert!(reader.is_empty());
}

#[test]
fn nested_element_change_sends_only_that_field() {
    let mut record = ListsRecord::new();
    record.pairs.push(Pair::new(1, 2), &mut record.changes);
    record.pairs.push(Pair::new(3, 4), &mut record.changes);
    record.clear_changes_mask();
    assert!(!record.pairs.get(1).is_some_and(Pair::has_changes));

    record.pairs.modify(1, &mut record.changes).set_right(40);

    let mut writer = BitWriter::new();
    record.write_update(&mut writer, false);
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    ChangeMask::<LISTS_BLOCKS>::read_header(&mut reader, LISTS.bit_count()).unwrap();
    assert_eq!(reader.read_bits(32).unwrap(), 2);
    assert!(!reader.read_bit().unwrap());
    assert_eq!(reader.read_bits(32).unwrap(), 1);
    assert_eq!(reader.read_bits(32).unwrap(), 1);
    reader.align_to_byte();
    let nested = ChangeMask::<PAIR_BLOCKS>::read_header(&mut reader, PAIR.bit_count()).unwrap();
    assert_eq!(nested.iter_set().collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(reader.read_u8().unwrap(), 40);
    assert!(reader.is_empty());
}

#[test]
fn ignore_nested_rewrites_everything() {
    let mut record = ListsRecord::new();
    record.numbers.push(9, &mut record.changes);
    record.pairs.push(Pair::new(5, 6), &mut record.changes);
    record.clear_changes_mask();

    let mut writer = BitWriter::new();
    record.write_update(&mut writer, true);
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    let mask = ChangeMask::<LISTS_BLOCKS>::read_header(&mut reader, LISTS.bit_count()).unwrap();
    assert_eq!(mask.iter_set().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(reader.read_bits(32).unwrap(), 1);
    assert!(reader.read_bit().unwrap(), "full shape");
    assert_eq!(reader.read_bits(32).unwrap(), 1);
    assert!(reader.read_bit().unwrap(), "full shape");
    assert_eq!(reader.read_u32().unwrap(), 9);
    let nested = ChangeMask::<PAIR_BLOCKS>::read_header(&mut reader, PAIR.bit_count()).unwrap();
    assert_eq!(nested.iter_set().count(), 3);
    assert_eq!(reader.read_u8().unwrap(), 5);
    assert_eq!(reader.read_u8().unwrap(), 6);
    assert!(reader.is_empty());
}

#[test]
fn removal_marks_shifted_tail() {
    let mut record = ListsRecord::new();
    for left in 0..4 {
        record.pairs.push(Pair::new(left, 0), &mut record.changes);
    }
    record.clear_changes_mask();

    let removed = record.pairs.remove(1, &mut record.changes);
    assert_eq!(*removed.left.get(), 1);
    assert_eq!(record.pairs.changed_indices().collect::<Vec<_>>(), vec![1, 2]);
    assert!(record.pairs.iter().skip(1).all(Pair::has_changes));
    assert!(!record.pairs.get(0).is_some_and(Pair::has_changes));
}
