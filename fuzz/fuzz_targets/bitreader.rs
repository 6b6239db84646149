#![no_main]

use bitstream::BitReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = BitReader::new(data);
    let mut idx = 0usize;

    // Input bytes pick a bounded sequence of reads.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 8;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_bit();
            }
            1 => {
                let bits = u32::from(data[idx - 1] % 64) + 1;
                let _ = reader.read_bits(bits);
            }
            2 => reader.align_to_byte(),
            3 => {
                let _ = reader.read_u32();
            }
            4 => {
                let _ = reader.read_f64();
            }
            5 => {
                let len = usize::from(data[idx - 1] >> 3);
                let _ = reader.read_string(len);
            }
            6 => {
                let _ = reader.read_packed_guid();
            }
            _ => {
                let len = usize::from(data[idx - 1]);
                let _ = reader.read_bytes(len);
            }
        }
        assert!(reader.bit_position() <= data.len() * 8);
    }
});
