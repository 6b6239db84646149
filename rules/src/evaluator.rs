//! Criteria evaluators and the registry dispatching to them.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::{Criteria, CriteriaContext, CriteriaType, RulesError, RulesResult};

/// Computes a criteria's progress from the records in a context.
pub trait CriteriaEvaluator: Send + Sync {
    fn progress(&self, criteria: &Criteria, context: &CriteriaContext<'_>) -> u64;
}

impl<F> CriteriaEvaluator for F
where
    F: Fn(&Criteria, &CriteriaContext<'_>) -> u64 + Send + Sync,
{
    fn progress(&self, criteria: &Criteria, context: &CriteriaContext<'_>) -> u64 {
        self(criteria, context)
    }
}

/// Evaluators keyed by [`CriteriaType`].
#[derive(Default)]
pub struct EvaluatorRegistry {
    evaluators: HashMap<CriteriaType, Box<dyn CriteriaEvaluator>>,
}

impl EvaluatorRegistry {
    /// An empty registry; every evaluation fails until something is registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with an evaluator for every [`CriteriaType`].
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CriteriaType::ReachLevel, reach_level);
        registry.register(CriteriaType::EarnMoney, earn_money);
        registry.register(CriteriaType::CompleteQuest, complete_quest);
        registry.register(CriteriaType::ReachSkillLevel, reach_skill_level);
        registry.register(CriteriaType::ExploreArea, explore_area);
        registry.register(CriteriaType::OwnTitle, own_title);
        registry.register(CriteriaType::ReachHonorLevel, reach_honor_level);
        registry
    }

    /// Installs `evaluator` for `kind`, replacing any previous one.
    pub fn register<E>(&mut self, kind: CriteriaType, evaluator: E)
    where
        E: CriteriaEvaluator + 'static,
    {
        if self.evaluators.insert(kind, Box::new(evaluator)).is_some() {
            debug!(?kind, "replaced criteria evaluator");
        } else {
            debug!(?kind, "registered criteria evaluator");
        }
    }

    #[must_use]
    pub fn contains(&self, kind: CriteriaType) -> bool {
        self.evaluators.contains_key(&kind)
    }

    /// Current progress towards `criteria`.
    pub fn evaluate(&self, criteria: &Criteria, context: &CriteriaContext<'_>) -> RulesResult<u64> {
        let evaluator = self
            .evaluators
            .get(&criteria.kind)
            .ok_or(RulesError::NoEvaluator {
                kind: criteria.kind,
            })?;
        let progress = evaluator.progress(criteria, context);
        trace!(
            criteria = criteria.id,
            kind = ?criteria.kind,
            progress,
            "evaluated criteria"
        );
        Ok(progress)
    }

    pub fn is_met(&self, criteria: &Criteria, context: &CriteriaContext<'_>) -> RulesResult<bool> {
        Ok(criteria.is_met(self.evaluate(criteria, context)?))
    }
}

impl fmt::Debug for EvaluatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.evaluators.keys().collect();
        kinds.sort();
        f.debug_struct("EvaluatorRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

fn flag(set: bool) -> u64 {
    u64::from(set)
}

fn reach_level(_: &Criteria, context: &CriteriaContext<'_>) -> u64 {
    context
        .unit
        .map_or(0, |unit| u64::try_from(unit.level()).unwrap_or(0))
}

fn earn_money(_: &Criteria, context: &CriteriaContext<'_>) -> u64 {
    context.active_player.map_or(0, |active| active.coinage())
}

fn complete_quest(criteria: &Criteria, context: &CriteriaContext<'_>) -> u64 {
    context
        .active_player
        .map_or(0, |active| flag(active.has_completed_quest(criteria.asset)))
}

fn reach_skill_level(criteria: &Criteria, context: &CriteriaContext<'_>) -> u64 {
    let Ok(line_id) = u16::try_from(criteria.asset) else {
        return 0;
    };
    context
        .active_player
        .and_then(|active| active.skill().rank_of(line_id))
        .map_or(0, u64::from)
}

fn explore_area(criteria: &Criteria, context: &CriteriaContext<'_>) -> u64 {
    context
        .active_player
        .map_or(0, |active| flag(active.has_explored(criteria.asset)))
}

fn own_title(criteria: &Criteria, context: &CriteriaContext<'_>) -> u64 {
    context
        .active_player
        .map_or(0, |active| flag(active.has_title(criteria.asset)))
}

fn reach_honor_level(_: &Criteria, context: &CriteriaContext<'_>) -> u64 {
    context
        .player
        .map_or(0, |player| u64::try_from(player.honor_level()).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use records::{ActivePlayerData, PlayerData, SkillEntry, UnitData};

    use super::*;

    struct Records {
        unit: UnitData,
        player: PlayerData,
        active: ActivePlayerData,
    }

    impl Records {
        fn new() -> Self {
            Self {
                unit: UnitData::new(),
                player: PlayerData::new(),
                active: ActivePlayerData::new(),
            }
        }

        fn context(&self) -> CriteriaContext<'_> {
            CriteriaContext::new(&self.unit, &self.player, &self.active)
        }
    }

    #[test]
    fn empty_registry_reports_missing_evaluator() {
        let registry = EvaluatorRegistry::new();
        let criteria = Criteria::new(1, CriteriaType::OwnTitle, 3, 1);
        assert_eq!(
            registry.evaluate(&criteria, &CriteriaContext::default()),
            Err(RulesError::NoEvaluator {
                kind: CriteriaType::OwnTitle
            })
        );
    }

    #[test]
    fn defaults_cover_every_tag() {
        let registry = EvaluatorRegistry::with_defaults();
        for kind in CriteriaType::ALL {
            assert!(registry.contains(kind), "{kind:?}");
        }
    }

    #[test]
    fn missing_records_are_zero_progress() {
        let registry = EvaluatorRegistry::with_defaults();
        let context = CriteriaContext::default();
        for kind in CriteriaType::ALL {
            let criteria = Criteria::new(1, kind, 1, 1);
            assert_eq!(registry.evaluate(&criteria, &context), Ok(0), "{kind:?}");
        }
    }

    #[test]
    fn defaults_read_the_records() {
        let mut records = Records::new();
        records.unit.set_level(42);
        records.player.set_honor_level(7);
        records.active.set_coinage(1_000);
        records.active.add_completed_quest(70);
        records.active.add_explored(12);
        records.active.add_title(3);
        records.active.skill_mut().set_entry(
            0,
            SkillEntry {
                line_id: 164,
                rank: 150,
                ..SkillEntry::default()
            },
        );

        let registry = EvaluatorRegistry::with_defaults();
        let context = records.context();
        let progress = |kind, asset| {
            registry
                .evaluate(&Criteria::new(1, kind, asset, 1), &context)
                .unwrap()
        };
        assert_eq!(progress(CriteriaType::ReachLevel, 0), 42);
        assert_eq!(progress(CriteriaType::ReachHonorLevel, 0), 7);
        assert_eq!(progress(CriteriaType::EarnMoney, 0), 1_000);
        assert_eq!(progress(CriteriaType::CompleteQuest, 70), 1);
        assert_eq!(progress(CriteriaType::CompleteQuest, 71), 0);
        assert_eq!(progress(CriteriaType::ExploreArea, 12), 1);
        assert_eq!(progress(CriteriaType::OwnTitle, 3), 1);
        assert_eq!(progress(CriteriaType::OwnTitle, 4), 0);
        assert_eq!(progress(CriteriaType::ReachSkillLevel, 164), 150);
        assert_eq!(progress(CriteriaType::ReachSkillLevel, 165), 0);
        assert_eq!(progress(CriteriaType::ReachSkillLevel, 70_000), 0);
    }

    #[test]
    fn closures_replace_defaults() {
        let mut registry = EvaluatorRegistry::with_defaults();
        registry.register(CriteriaType::ReachLevel, |criteria: &Criteria, _: &CriteriaContext<'_>| {
            criteria.quantity
        });
        let criteria = Criteria::new(9, CriteriaType::ReachLevel, 0, 80);
        assert_eq!(registry.is_met(&criteria, &CriteriaContext::default()), Ok(true));
    }

    #[test]
    fn negative_level_counts_as_zero() {
        let mut records = Records::new();
        records.unit.set_level(-1);
        let registry = EvaluatorRegistry::with_defaults();
        let criteria = Criteria::new(1, CriteriaType::ReachLevel, 0, 1);
        assert_eq!(registry.evaluate(&criteria, &records.context()), Ok(0));
    }
}
