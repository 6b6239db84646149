//! Rewards granted when criteria are met.

use records::ActivePlayerData;
use tracing::debug;

/// What completing a set of criteria grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reward {
    /// Bit index into the known-titles bitset.
    pub title: Option<u32>,
    /// Copper added to the player's coinage.
    pub coinage: u64,
}

impl Reward {
    /// Grants the reward through the record's setters, so every change
    /// lands in its change mask.
    ///
    /// Returns `true` if anything changed.
    pub fn apply(&self, active: &mut ActivePlayerData) -> bool {
        let mut changed = false;
        if let Some(title) = self.title {
            changed |= active.add_title(title);
        }
        if self.coinage > 0 {
            let amount = i64::try_from(self.coinage).unwrap_or(i64::MAX);
            changed |= active.modify_coinage(amount);
        }
        if changed {
            debug!(title = ?self.title, coinage = self.coinage, "granted reward");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use fields::{SlotValue, UpdateRecord};
    use records::active_player::bit;

    use super::*;

    #[test]
    fn reward_marks_the_record() {
        let mut active = ActivePlayerData::new();
        let reward = Reward {
            title: Some(5),
            coinage: 250,
        };
        assert!(reward.apply(&mut active));
        assert!(active.has_title(5));
        assert_eq!(active.coinage(), 250);
        assert!(active.changes().get(bit::COINAGE));
        assert!(active.changes().get(bit::KNOWN_TITLES));
    }

    #[test]
    fn repeated_title_only_adds_coin() {
        let mut active = ActivePlayerData::new();
        let title_only = Reward {
            title: Some(5),
            coinage: 0,
        };
        assert!(title_only.apply(&mut active));
        active.clear_nested_changes();

        assert!(!title_only.apply(&mut active));
        assert!(!active.has_changes());
    }

    #[test]
    fn coinage_saturates() {
        let mut active = ActivePlayerData::new();
        active.set_coinage(u64::MAX - 1);
        let reward = Reward {
            title: None,
            coinage: 10,
        };
        assert!(reward.apply(&mut active));
        assert_eq!(active.coinage(), u64::MAX);
        assert!(!reward.apply(&mut active));
    }
}
