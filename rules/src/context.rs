//! Read-only access to the records criteria inspect.

use records::{ActivePlayerData, PlayerData, UnitData};

/// The records of one player, as far as they are loaded.
///
/// Evaluators treat a missing record as zero progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct CriteriaContext<'a> {
    pub unit: Option<&'a UnitData>,
    pub player: Option<&'a PlayerData>,
    pub active_player: Option<&'a ActivePlayerData>,
}

impl<'a> CriteriaContext<'a> {
    #[must_use]
    pub const fn new(
        unit: &'a UnitData,
        player: &'a PlayerData,
        active_player: &'a ActivePlayerData,
    ) -> Self {
        Self {
            unit: Some(unit),
            player: Some(player),
            active_player: Some(active_player),
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: &'a UnitData) -> Self {
        self.unit = Some(unit);
        self
    }

    #[must_use]
    pub fn with_player(mut self, player: &'a PlayerData) -> Self {
        self.player = Some(player);
        self
    }

    #[must_use]
    pub fn with_active_player(mut self, active_player: &'a ActivePlayerData) -> Self {
        self.active_player = Some(active_player);
        self
    }
}
