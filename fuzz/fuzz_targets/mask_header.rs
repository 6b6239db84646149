#![no_main]

use bitstream::BitReader;
use fields::ChangeMask;
use libfuzzer_sys::fuzz_target;
use records::{skill, unit};

fuzz_target!(|data: &[u8]| {
    // Small header: one presence word.
    let mut reader = BitReader::new(data);
    if let Ok(mask) = ChangeMask::<{ unit::BLOCKS }>::read_header(&mut reader, unit::LAYOUT.bit_count()) {
        assert!(mask.iter_set().all(|bit| bit < unit::LAYOUT.bit_count()));
    }

    // Wide header: two presence words.
    let mut reader = BitReader::new(data);
    if let Ok(mask) =
        ChangeMask::<{ skill::BLOCKS }>::read_header(&mut reader, skill::LAYOUT.bit_count())
    {
        assert!(mask.iter_set().all(|bit| bit < skill::LAYOUT.bit_count()));
    }
});
