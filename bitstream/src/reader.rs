//! Bit-level reader with bounded operations.

use crate::error::{BitError, BitResult};

/// A bit-level reader mirroring [`BitWriter`](crate::BitWriter).
///
/// All read operations are bounds-checked and return errors on failure.
/// Typed reads skip padding up to the next byte boundary first, the same
/// way typed writes flush.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Returns the number of bits remaining to read.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.data
            .len()
            .saturating_mul(8)
            .saturating_sub(self.bit_pos)
    }

    /// Returns `true` if there are no more bits to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Returns the current bit position.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Reads a single bit.
    pub fn read_bit(&mut self) -> BitResult<bool> {
        self.ensure_bits(1)?;
        let byte_idx = self.bit_pos / 8;
        let bit_idx = self.bit_pos % 8;
        let bit = (self.data[byte_idx] >> (7 - bit_idx)) & 1;
        self.bit_pos += 1;
        Ok(bit == 1)
    }

    /// Reads up to 64 bits, most significant first.
    pub fn read_bits(&mut self, bits: u32) -> BitResult<u64> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        self.ensure_bits(bits as usize)?;
        let mut value = 0u64;
        for _ in 0..bits {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Skips padding up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        let rem = self.bit_pos % 8;
        if rem != 0 {
            self.bit_pos = (self.bit_pos + 8 - rem).min(self.data.len() * 8);
        }
    }

    /// Reads a byte-aligned `u8`.
    pub fn read_u8(&mut self) -> BitResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Reads a byte-aligned `i8`.
    pub fn read_i8(&mut self) -> BitResult<i8> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    /// Reads a byte-aligned `u16` (little-endian).
    pub fn read_u16(&mut self) -> BitResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Reads a byte-aligned `i16` (little-endian).
    pub fn read_i16(&mut self) -> BitResult<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    /// Reads a byte-aligned `u32` (little-endian).
    pub fn read_u32(&mut self) -> BitResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Reads a byte-aligned `i32` (little-endian).
    pub fn read_i32(&mut self) -> BitResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Reads a byte-aligned `u64` (little-endian).
    pub fn read_u64(&mut self) -> BitResult<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Reads a byte-aligned `i64` (little-endian).
    pub fn read_i64(&mut self) -> BitResult<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// Reads a byte-aligned `f32` (little-endian).
    pub fn read_f32(&mut self) -> BitResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Reads a byte-aligned `f64` (little-endian).
    pub fn read_f64(&mut self) -> BitResult<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Reads `len` byte-aligned raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> BitResult<&'a [u8]> {
        self.align_to_byte();
        self.ensure_bits(len.saturating_mul(8))?;
        let start = self.bit_pos / 8;
        self.bit_pos += len * 8;
        Ok(&self.data[start..start + len])
    }

    /// Reads `len` byte-aligned bytes as a UTF-8 string.
    pub fn read_string(&mut self, len: usize) -> BitResult<&'a str> {
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes).map_err(|_| BitError::InvalidUtf8 { len })
    }

    /// Reads a packed 128-bit identifier, returning `(low, high)`.
    pub fn read_packed_guid(&mut self) -> BitResult<(u64, u64)> {
        let low_mask = self.read_u8()?;
        let high_mask = self.read_u8()?;
        let low = self.read_packed_u64(low_mask)?;
        let high = self.read_packed_u64(high_mask)?;
        Ok((low, high))
    }

    fn read_packed_u64(&mut self, mask: u8) -> BitResult<u64> {
        let mut bytes = [0u8; 8];
        for (i, byte) in bytes.iter_mut().enumerate() {
            if mask & (1 << i) != 0 {
                *byte = self.read_u8()?;
            }
        }
        Ok(u64::from_le_bytes(bytes))
    }

    fn ensure_bits(&self, bits: usize) -> BitResult<()> {
        let available = self.bits_remaining();
        if bits > available {
            return Err(BitError::EndOfBuffer {
                requested: bits,
                available,
            });
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> BitResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }
}
