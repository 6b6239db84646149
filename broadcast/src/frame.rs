//! Per-receiver update frames.
//!
//! ```text
//! u32   block_count
//! bit   has_out_of_range
//!       [flush, u32 count, count packed guids]   if has_out_of_range
//! block_count times:
//!   u8          kind (0 values, 1 create)
//!   packed guid entity
//!   u32         payload length
//!   bytes       payload
//! ```

use bitstream::{BitReader, BitWriter};
use fields::ObjectGuid;

use crate::error::{FrameError, FrameResult};

/// Smallest encoding of one block: kind, empty guid, zero length.
const MIN_BLOCK_BYTES: usize = 1 + 2 + 4;
/// Smallest packed guid.
const MIN_GUID_BYTES: usize = 2;

/// What a block's payload holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockKind {
    /// A values block from [`ReplicatedEntity::write_update`](crate::ReplicatedEntity::write_update).
    Values = 0,
    /// A create block from [`ReplicatedEntity::write_create`](crate::ReplicatedEntity::write_create).
    Create = 1,
}

impl BlockKind {
    fn from_u8(kind: u8) -> FrameResult<Self> {
        match kind {
            0 => Ok(Self::Values),
            1 => Ok(Self::Create),
            kind => Err(FrameError::UnknownBlockKind { kind }),
        }
    }
}

/// One entity's payload inside a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBlock {
    pub kind: BlockKind,
    pub guid: ObjectGuid,
    pub payload: Vec<u8>,
}

/// Everything one receiver is sent for one broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverUpdate {
    pub receiver: ObjectGuid,
    pub blocks: Vec<UpdateBlock>,
    /// Entities the receiver must forget.
    pub out_of_range: Vec<ObjectGuid>,
}

impl ReceiverUpdate {
    #[must_use]
    pub const fn new(receiver: ObjectGuid) -> Self {
        Self {
            receiver,
            blocks: Vec::new(),
            out_of_range: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.out_of_range.is_empty()
    }

    /// Number of create blocks.
    #[must_use]
    pub fn creates(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| block.kind == BlockKind::Create)
            .count()
    }

    /// The block for `guid`, if one was built.
    #[must_use]
    pub fn block(&self, guid: ObjectGuid) -> Option<&UpdateBlock> {
        self.blocks.iter().find(|block| block.guid == guid)
    }

    pub fn write(&self, data: &mut BitWriter) {
        data.write_u32(self.blocks.len() as u32);
        if data.write_bit(!self.out_of_range.is_empty()) {
            data.write_u32(self.out_of_range.len() as u32);
            for guid in &self.out_of_range {
                guid.write(data);
            }
        }
        for block in &self.blocks {
            data.write_u8(block.kind as u8);
            block.guid.write(data);
            data.write_u32(block.payload.len() as u32);
            data.write_bytes(&block.payload);
        }
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload: usize = self.blocks.iter().map(|block| block.payload.len()).sum();
        let mut writer = BitWriter::with_capacity(8 + payload + self.blocks.len() * 24);
        self.write(&mut writer);
        writer.finish()
    }

    /// Reads a frame written by [`write`](Self::write).
    ///
    /// The receiver is not part of the frame and is supplied by the caller.
    pub fn read(receiver: ObjectGuid, reader: &mut BitReader<'_>) -> FrameResult<Self> {
        let block_count = reader.read_u32()? as usize;
        let mut out_of_range = Vec::new();
        if reader.read_bit()? {
            let count = reader.read_u32()? as usize;
            check_count(reader, "out-of-range count", count, MIN_GUID_BYTES)?;
            out_of_range.reserve(count);
            for _ in 0..count {
                out_of_range.push(ObjectGuid::read(reader)?);
            }
        }
        check_count(reader, "block count", block_count, MIN_BLOCK_BYTES)?;
        let mut blocks = Vec::with_capacity(block_count);
        for _ in 0..block_count {
            let kind = BlockKind::from_u8(reader.read_u8()?)?;
            let guid = ObjectGuid::read(reader)?;
            let len = reader.read_u32()? as usize;
            check_count(reader, "payload length", len, 1)?;
            let payload = reader.read_bytes(len)?.to_vec();
            blocks.push(UpdateBlock {
                kind,
                guid,
                payload,
            });
        }
        Ok(Self {
            receiver,
            blocks,
            out_of_range,
        })
    }
}

fn check_count(
    reader: &BitReader<'_>,
    what: &'static str,
    declared: usize,
    min_bytes: usize,
) -> FrameResult<()> {
    let available = reader.bits_remaining() / 8;
    if declared.saturating_mul(min_bytes) > available {
        return Err(FrameError::Truncated {
            what,
            declared,
            available,
        });
    }
    Ok(())
}
