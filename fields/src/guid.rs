//! 128-bit object identifiers.

use std::fmt;

use bitstream::{BitReader, BitResult, BitWriter};

/// A 128-bit object identifier, written in packed form on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectGuid {
    high: u64,
    low: u64,
}

impl ObjectGuid {
    /// The empty identifier (all zero), packed as two zero mask bytes.
    pub const EMPTY: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(high: u64, low: u64) -> Self {
        Self { high, low }
    }

    #[must_use]
    pub const fn high(self) -> u64 {
        self.high
    }

    #[must_use]
    pub const fn low(self) -> u64 {
        self.low
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.high == 0 && self.low == 0
    }

    pub fn write(self, data: &mut BitWriter) {
        data.write_packed_guid(self.low, self.high);
    }

    pub fn read(reader: &mut BitReader<'_>) -> BitResult<Self> {
        let (low, high) = reader.read_packed_guid()?;
        Ok(Self::new(high, low))
    }
}

impl fmt::Display for ObjectGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}{:016X}", self.high, self.low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_guid() {
        assert!(ObjectGuid::EMPTY.is_empty());
        assert!(!ObjectGuid::new(0, 1).is_empty());
        assert_eq!(ObjectGuid::default(), ObjectGuid::EMPTY);
    }

    #[test]
    fn packed_roundtrip() {
        let guid = ObjectGuid::new(0x0C00_0000_0000_0001, 0x0000_0000_DEAD_BEEF);
        let mut writer = BitWriter::new();
        guid.write(&mut writer);
        let bytes = writer.finish();
        // two masks + 4 low bytes + 2 high bytes
        assert_eq!(bytes.len(), 8);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(ObjectGuid::read(&mut reader).unwrap(), guid);
    }

    #[test]
    fn display_is_hex() {
        let guid = ObjectGuid::new(1, 2);
        assert_eq!(guid.to_string(), "0x00000000000000010000000000000002");
    }
}
