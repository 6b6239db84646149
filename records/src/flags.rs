//! Flag words stored in unit records and rewritten by projections.

use bitflags::bitflags;

bitflags! {
    /// Per-viewer state flags of a unit (`ObjectData::dynamic_flags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct UnitDynFlags: u32 {
        const HIDE_MODEL = 0x0002;
        const LOOTABLE = 0x0004;
        const TRACK_UNIT = 0x0008;
        const TAPPED = 0x0010;
        const SPECIAL_INFO = 0x0020;
        const CAN_SKIN = 0x0040;
        const REFER_A_FRIEND = 0x0080;

        const _ = !0;
    }
}

bitflags! {
    /// Interaction options a creature offers (`UnitData::npc_flags[0]`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct NpcFlags: u32 {
        const GOSSIP = 0x0000_0001;
        const QUESTGIVER = 0x0000_0002;
        const TRAINER = 0x0000_0010;
        const VENDOR = 0x0000_0080;
        const REPAIR = 0x0000_1000;
        const FLIGHT_MASTER = 0x0000_2000;
        const INNKEEPER = 0x0001_0000;
        const BANKER = 0x0002_0000;
        const SPELLCLICK = 0x0100_0000;

        const _ = !0;
    }
}

bitflags! {
    /// General unit state (`UnitData::flags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct UnitFlags: u32 {
        const SERVER_CONTROLLED = 0x0000_0001;
        const NON_ATTACKABLE = 0x0000_0002;
        const REMOVE_CLIENT_CONTROL = 0x0000_0004;
        const PLAYER_CONTROLLED = 0x0000_0008;
        const IMMUNE_TO_PC = 0x0000_0100;
        const IMMUNE_TO_NPC = 0x0000_0200;
        const IN_COMBAT = 0x0008_0000;
        const UNINTERACTIBLE = 0x0200_0000;
        const SKINNABLE = 0x0400_0000;

        const _ = !0;
    }
}
