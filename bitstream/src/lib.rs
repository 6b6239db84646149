//! Bit-level encoding primitives for the fieldmask update-field wire format.
//!
//! This crate provides [`BitWriter`] and [`BitReader`]. The writer is the
//! hot path: append-only, forward-only and infallible. The reader mirrors it
//! for verification, tooling and fuzzing, and is fully bounds-checked.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Fixed bit order** - Bits are packed MSB-first within each byte.
//! - **Explicit alignment** - [`BitWriter::flush_bits`] pads to a byte boundary;
//!   typed little-endian helpers flush implicitly.
//! - **No domain knowledge** - This crate knows nothing about records or masks.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bit(true);
//! writer.write_bits(42, 7);
//! writer.write_u16(0xBEEF);
//!
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_bits(7).unwrap(), 42);
//! assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::BitReader;
pub use writer::BitWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roundtrip() {
        let writer = BitWriter::new();
        let bytes = writer.finish();
        assert!(bytes.is_empty());

        let reader = BitReader::new(&bytes);
        assert!(reader.is_empty());
    }

    #[test]
    fn bits_roundtrip_various_sizes() {
        let test_cases = [
            (0b1010u64, 4),
            (0xFFu64, 8),
            (0xABCDu64, 16),
            (0x1234_5678u64, 32),
            (u64::MAX, 64),
        ];

        for (value, bits) in test_cases {
            let mut writer = BitWriter::new();
            writer.write_bits(value, bits);
            let bytes = writer.finish();

            let mut reader = BitReader::new(&bytes);
            let read_value = reader.read_bits(bits).unwrap();
            assert_eq!(
                read_value, value,
                "roundtrip failed for {bits}-bit value {value}"
            );
        }
    }

    #[test]
    fn mixed_roundtrip() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b1010, 4);
        writer.write_i32(-7);
        writer.write_bit(false);
        writer.write_packed_guid(0x42, 0);
        writer.write_bits(5, 6);
        writer.write_string("hello");
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
        assert_eq!(reader.read_i32().unwrap(), -7);
        assert!(!reader.read_bit().unwrap());
        assert_eq!(reader.read_packed_guid().unwrap(), (0x42, 0));
        assert_eq!(reader.read_bits(6).unwrap(), 5);
        assert_eq!(reader.read_string(5).unwrap(), "hello");
        assert!(reader.is_empty());
    }
}
