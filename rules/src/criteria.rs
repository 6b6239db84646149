//! Criteria definitions.

/// What a criteria measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum CriteriaType {
    ReachLevel = 5,
    EarnMoney = 8,
    CompleteQuest = 27,
    ReachSkillLevel = 40,
    ExploreArea = 43,
    OwnTitle = 101,
    ReachHonorLevel = 133,
}

impl CriteriaType {
    pub const ALL: [Self; 7] = [
        Self::ReachLevel,
        Self::EarnMoney,
        Self::CompleteQuest,
        Self::ReachSkillLevel,
        Self::ExploreArea,
        Self::OwnTitle,
        Self::ReachHonorLevel,
    ];

    /// Tag for a raw criteria type id.
    #[must_use]
    pub fn from_id(id: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| *kind as u16 == id)
    }
}

/// One condition a player can meet.
///
/// `asset` selects what is measured (a quest, skill line, area or title bit)
/// and is ignored by tags that measure a single value. The criteria is met
/// once progress reaches `quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Criteria {
    pub id: u32,
    pub kind: CriteriaType,
    pub asset: u32,
    pub quantity: u64,
}

impl Criteria {
    #[must_use]
    pub const fn new(id: u32, kind: CriteriaType, asset: u32, quantity: u64) -> Self {
        Self {
            id,
            kind,
            asset,
            quantity,
        }
    }

    #[must_use]
    pub const fn is_met(&self, progress: u64) -> bool {
        progress >= self.quantity
    }
}
