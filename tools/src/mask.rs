//! Decoding a change-mask header against a record layout.

use anyhow::{bail, Context, Result};
use bitstream::BitReader;
use fields::ChangeMask;
use records::{active_player, customization, item, object, player, quest, skill, spell, unit};
use schema::{BitInfo, RecordLayout};
use serde::Serialize;

/// The bits a header announces, with the layout's names for them.
#[derive(Debug, Clone, Serialize)]
pub struct MaskReport {
    pub record: &'static str,
    pub header_bytes: usize,
    pub set: Vec<BitInfo>,
}

fn set_bits<const B: usize>(reader: &mut BitReader<'_>, layout: &RecordLayout) -> Result<Vec<u32>> {
    let mask = ChangeMask::<B>::read_header(reader, layout.bit_count())
        .with_context(|| format!("read {} mask header", layout.name))?;
    Ok(mask.iter_set().collect())
}

/// Reads the mask header at the start of `bytes`.
pub fn decode_mask(layout: &RecordLayout, bytes: &[u8]) -> Result<MaskReport> {
    let mut reader = BitReader::new(bytes);
    let set = match layout.name {
        "ObjectData" => set_bits::<{ object::BLOCKS }>(&mut reader, layout)?,
        "UnitData" => set_bits::<{ unit::BLOCKS }>(&mut reader, layout)?,
        "PlayerData" => set_bits::<{ player::BLOCKS }>(&mut reader, layout)?,
        "ActivePlayerData" => set_bits::<{ active_player::BLOCKS }>(&mut reader, layout)?,
        "VisibleItem" => set_bits::<{ item::BLOCKS }>(&mut reader, layout)?,
        "PassiveSpellHistory" => set_bits::<{ spell::BLOCKS }>(&mut reader, layout)?,
        "ChrCustomizationChoice" => set_bits::<{ customization::BLOCKS }>(&mut reader, layout)?,
        "QuestLog" => set_bits::<{ quest::BLOCKS }>(&mut reader, layout)?,
        "SkillInfo" => set_bits::<{ skill::BLOCKS }>(&mut reader, layout)?,
        name => bail!("no mask width known for record {name}"),
    };
    let bits = layout.bits();
    Ok(MaskReport {
        record: layout.name,
        header_bytes: reader.bit_position().div_ceil(8),
        set: set
            .into_iter()
            .filter_map(|bit| bits.get(bit as usize).copied())
            .collect(),
    })
}
