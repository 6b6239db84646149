//! Bit-level writer for encoding packed update-field payloads.

/// An append-only, bit-level writer.
///
/// Bits are packed MSB-first: the first bit written lands in the most
/// significant free bit of the current byte. Typed helpers (`write_u32`,
/// `write_f32`, ...) are little-endian and byte-aligned; they flush any
/// pending bits first. Call [`finish`](Self::finish) to get the bytes.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    /// Completed bytes.
    bytes: Vec<u8>,
    /// Current byte being written (not yet pushed to bytes).
    current_byte: u8,
    /// Number of bits written to `current_byte` (0-7).
    bit_count: u8,
}

impl BitWriter {
    /// Creates a new empty `BitWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `BitWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            current_byte: 0,
            bit_count: 0,
        }
    }

    /// Returns the number of bits written so far.
    #[must_use]
    pub fn bits_written(&self) -> usize {
        self.bytes.len() * 8 + self.bit_count as usize
    }

    /// Returns `true` if the next write starts on a byte boundary.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_count == 0
    }

    /// Writes a single bit and returns it, so callers can chain
    /// `if writer.write_bit(x) { ... }`.
    pub fn write_bit(&mut self, value: bool) -> bool {
        self.current_byte = (self.current_byte << 1) | u8::from(value);
        self.bit_count += 1;
        if self.bit_count == 8 {
            self.bytes.push(self.current_byte);
            self.current_byte = 0;
            self.bit_count = 0;
        }
        value
    }

    /// Writes the low `bits` bits of `value`, most significant first.
    ///
    /// Bits of `value` above `bits` are ignored. `bits` must be at most 64.
    pub fn write_bits(&mut self, value: u64, bits: u32) {
        debug_assert!(bits <= 64, "write_bits: {bits} exceeds 64");
        for i in (0..bits.min(64)).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    /// Pads the current byte with zero bits. No-op when already aligned.
    pub fn flush_bits(&mut self) {
        if self.bit_count > 0 {
            self.current_byte <<= 8 - self.bit_count;
            self.bytes.push(self.current_byte);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// Writes a byte-aligned `u8`.
    pub fn write_u8(&mut self, value: u8) {
        self.flush_bits();
        self.bytes.push(value);
    }

    /// Writes a byte-aligned `i8`.
    pub fn write_i8(&mut self, value: i8) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes a byte-aligned `u16` (little-endian).
    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes a byte-aligned `i16` (little-endian).
    pub fn write_i16(&mut self, value: i16) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes a byte-aligned `u32` (little-endian).
    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes a byte-aligned `i32` (little-endian).
    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes a byte-aligned `u64` (little-endian).
    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes a byte-aligned `i64` (little-endian).
    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes a byte-aligned `f32` (IEEE-754, little-endian).
    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes a byte-aligned `f64` (IEEE-754, little-endian).
    pub fn write_f64(&mut self, value: f64) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Flushes pending bits and appends raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.flush_bits();
        self.bytes.extend_from_slice(bytes);
    }

    /// Flushes pending bits and appends the UTF-8 bytes of `value`.
    ///
    /// No length or terminator is written; callers emit the length separately.
    pub fn write_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    /// Writes a 128-bit identifier in packed form.
    ///
    /// Layout: a presence mask for `low`, a presence mask for `high`, then
    /// the non-zero bytes of `low` followed by those of `high`, each from
    /// least to most significant. Bit `i` of a mask marks byte `i` present.
    pub fn write_packed_guid(&mut self, low: u64, high: u64) {
        let (low_mask, low_bytes, low_len) = pack_u64(low);
        let (high_mask, high_bytes, high_len) = pack_u64(high);
        self.write_u8(low_mask);
        self.write_u8(high_mask);
        self.bytes.extend_from_slice(&low_bytes[..low_len]);
        self.bytes.extend_from_slice(&high_bytes[..high_len]);
    }

    /// Finishes writing and returns the byte buffer.
    ///
    /// If the last byte is incomplete, it is padded with zeros on the right.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.flush_bits();
        self.bytes
    }

    /// Finishes writing and appends to the provided buffer.
    pub fn finish_into(mut self, buf: &mut Vec<u8>) {
        self.flush_bits();
        buf.append(&mut self.bytes);
    }
}

/// Returns the presence mask, the non-zero bytes and their count.
fn pack_u64(value: u64) -> (u8, [u8; 8], usize) {
    let mut mask = 0u8;
    let mut packed = [0u8; 8];
    let mut len = 0;
    for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
        if byte != 0 {
            mask |= 1 << i;
            packed[len] = byte;
            len += 1;
        }
    }
    (mask, packed, len)
}
