//! Traits for values stored in update-field slots.

use bitstream::{BitReader, BitResult, BitWriter};

use crate::guid::ObjectGuid;

/// A value that can live in a slot.
///
/// Nested records override both hooks so that clearing or fully re-marking
/// a parent reaches their own change masks; plain values keep the defaults.
pub trait SlotValue {
    /// Clears any change state owned by the value itself.
    fn clear_nested_changes(&mut self) {}

    /// Marks every field owned by the value as changed.
    fn mark_nested_changes(&mut self) {}
}

/// A scalar with a fixed wire encoding.
pub trait WireValue: Sized {
    fn write(&self, data: &mut BitWriter);

    fn read(reader: &mut BitReader<'_>) -> BitResult<Self>;
}

macro_rules! wire_value {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl SlotValue for $ty {}

            impl WireValue for $ty {
                fn write(&self, data: &mut BitWriter) {
                    data.$write(*self);
                }

                fn read(reader: &mut BitReader<'_>) -> BitResult<Self> {
                    reader.$read()
                }
            }
        )*
    };
}

wire_value! {
    u8 => write_u8, read_u8;
    i8 => write_i8, read_i8;
    u16 => write_u16, read_u16;
    i16 => write_i16, read_i16;
    u32 => write_u32, read_u32;
    i32 => write_i32, read_i32;
    u64 => write_u64, read_u64;
    i64 => write_i64, read_i64;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
}

impl SlotValue for bool {}

impl WireValue for bool {
    fn write(&self, data: &mut BitWriter) {
        data.write_bit(*self);
    }

    fn read(reader: &mut BitReader<'_>) -> BitResult<Self> {
        reader.read_bit()
    }
}

impl SlotValue for ObjectGuid {}

impl WireValue for ObjectGuid {
    fn write(&self, data: &mut BitWriter) {
        (*self).write(data);
    }

    fn read(reader: &mut BitReader<'_>) -> BitResult<Self> {
        Self::read(reader)
    }
}

// Strings carry a field-specific length prefix and are written by their records.
impl SlotValue for String {}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: WireValue + PartialEq + std::fmt::Debug>(value: T) {
        let mut writer = BitWriter::new();
        value.write(&mut writer);
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(T::read(&mut reader).unwrap(), value);
    }

    #[test]
    fn primitives_roundtrip() {
        roundtrip(7u8);
        roundtrip(-7i16);
        roundtrip(u32::MAX);
        roundtrip(i64::MIN);
        roundtrip(1.5f32);
        roundtrip(true);
        roundtrip(ObjectGuid::new(3, 4));
    }

    #[test]
    fn bool_is_a_single_bit() {
        let mut writer = BitWriter::new();
        true.write(&mut writer);
        assert_eq!(writer.bits_written(), 1);
    }

    #[test]
    fn default_hooks_are_noops() {
        let mut value = 5u32;
        value.clear_nested_changes();
        value.mark_nested_changes();
        assert_eq!(value, 5);
    }
}
