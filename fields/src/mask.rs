//! Fixed-capacity change masks and their two-level wire header.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

use bitstream::{BitReader, BitResult, BitWriter};
use schema::RecordLayout;

/// A fixed-capacity dirty bitset organized in 32-bit blocks.
///
/// `B` is the number of blocks; the bit count is fixed at construction and
/// must fit in `B * 32`. Bits past the bit count are never set. Out-of-range
/// indices are programmer errors and panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeMask<const B: usize> {
    bits: u32,
    blocks: [u32; B],
}

impl<const B: usize> ChangeMask<B> {
    /// Creates an empty mask of `bits` bits.
    #[must_use]
    pub const fn new(bits: u32) -> Self {
        assert!(
            bits as usize <= B * 32,
            "bit count exceeds mask capacity"
        );
        Self {
            bits,
            blocks: [0; B],
        }
    }

    /// Creates an empty mask sized for `layout`.
    #[must_use]
    pub const fn for_layout(layout: &RecordLayout) -> Self {
        Self::new(layout.bit_count())
    }

    /// Creates a mask from raw blocks; bits past `bits` are dropped.
    #[must_use]
    pub fn from_blocks(bits: u32, blocks: [u32; B]) -> Self {
        let mut mask = Self { bits, blocks };
        mask.trim();
        mask
    }

    /// Number of bits in the mask.
    #[must_use]
    pub const fn bit_count(&self) -> u32 {
        self.bits
    }

    /// Number of 32-bit blocks.
    #[must_use]
    pub const fn block_count(&self) -> usize {
        B
    }

    #[must_use]
    pub fn get(&self, index: u32) -> bool {
        debug_assert!(index < self.bits, "bit {index} out of range {}", self.bits);
        self.blocks[(index / 32) as usize] & (1 << (index % 32)) != 0
    }

    pub fn set(&mut self, index: u32) {
        debug_assert!(index < self.bits, "bit {index} out of range {}", self.bits);
        self.blocks[(index / 32) as usize] |= 1 << (index % 32);
    }

    pub fn reset(&mut self, index: u32) {
        debug_assert!(index < self.bits, "bit {index} out of range {}", self.bits);
        self.blocks[(index / 32) as usize] &= !(1 << (index % 32));
    }

    pub fn reset_all(&mut self) {
        self.blocks = [0; B];
    }

    /// Sets every bit below the bit count.
    pub fn set_all(&mut self) {
        self.blocks = [u32::MAX; B];
        self.trim();
    }

    #[must_use]
    pub fn is_any_set(&self) -> bool {
        self.blocks.iter().any(|block| *block != 0)
    }

    /// Returns the `index`-th 32-bit block.
    #[must_use]
    pub fn block(&self, index: usize) -> u32 {
        self.blocks[index]
    }

    /// Returns which of blocks `32 * group .. 32 * group + 32` are non-zero.
    #[must_use]
    pub fn blocks_mask(&self, group: usize) -> u32 {
        let start = group * 32;
        let end = (start + 32).min(B);
        let mut mask = 0u32;
        for (offset, block) in self.blocks[start..end].iter().enumerate() {
            if *block != 0 {
                mask |= 1 << offset;
            }
        }
        mask
    }

    /// Iterates the indices of set bits in ascending order.
    pub fn iter_set(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.bits).filter(move |index| self.get(*index))
    }

    /// Returns `true` if every bit set in `self` is also set in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.blocks
            .iter()
            .zip(other.blocks.iter())
            .all(|(a, b)| a & !b == 0)
    }

    /// Writes the two-level header.
    ///
    /// First one presence bit per block (in words of up to 32, lowest group
    /// first), then every non-zero block as 32 bits in ascending order.
    pub fn write_header(&self, data: &mut BitWriter) {
        for group in 0..B.div_ceil(32) {
            let width = (B - group * 32).min(32) as u32;
            data.write_bits(u64::from(self.blocks_mask(group)), width);
        }
        for block in self.blocks.iter().filter(|block| **block != 0) {
            data.write_bits(u64::from(*block), 32);
        }
    }

    /// Reads a header written by [`write_header`](Self::write_header).
    pub fn read_header(reader: &mut BitReader<'_>, bits: u32) -> BitResult<Self> {
        let mut present = [false; B];
        for group in 0..B.div_ceil(32) {
            let width = (B - group * 32).min(32) as u32;
            let word = reader.read_bits(width)?;
            for offset in 0..width as usize {
                present[group * 32 + offset] = word & (1 << offset) != 0;
            }
        }
        let mut blocks = [0u32; B];
        for (block, present) in blocks.iter_mut().zip(present) {
            if present {
                *block = reader.read_bits(32)? as u32;
            }
        }
        Ok(Self::from_blocks(bits, blocks))
    }

    fn trim(&mut self) {
        let full = (self.bits / 32) as usize;
        let rem = self.bits % 32;
        if full < B {
            self.blocks[full] &= if rem == 0 { 0 } else { (1 << rem) - 1 };
            for block in &mut self.blocks[full + 1..] {
                *block = 0;
            }
        }
    }
}

impl<const B: usize> BitAnd for ChangeMask<B> {
    type Output = Self;

    fn bitand(mut self, rhs: Self) -> Self {
        self &= rhs;
        self
    }
}

impl<const B: usize> BitAndAssign for ChangeMask<B> {
    fn bitand_assign(&mut self, rhs: Self) {
        debug_assert_eq!(self.bits, rhs.bits, "mask capacity mismatch");
        for (a, b) in self.blocks.iter_mut().zip(rhs.blocks) {
            *a &= b;
        }
    }
}

impl<const B: usize> BitOr for ChangeMask<B> {
    type Output = Self;

    fn bitor(mut self, rhs: Self) -> Self {
        self |= rhs;
        self
    }
}

impl<const B: usize> BitOrAssign for ChangeMask<B> {
    fn bitor_assign(&mut self, rhs: Self) {
        debug_assert_eq!(self.bits, rhs.bits, "mask capacity mismatch");
        for (a, b) in self.blocks.iter_mut().zip(rhs.blocks) {
            *a |= b;
        }
    }
}
