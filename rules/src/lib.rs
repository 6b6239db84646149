//! Achievement-style criteria evaluated against fieldmask records.
//!
//! An [`EvaluatorRegistry`] maps each [`CriteriaType`] to a
//! [`CriteriaEvaluator`] that reads progress from a [`CriteriaContext`].
//! Rewards only go through record setters, so whatever they grant is
//! picked up by the next broadcast.
//!
//! ```
//! use records::{ActivePlayerData, PlayerData, UnitData};
//! use rules::{Criteria, CriteriaContext, CriteriaType, EvaluatorRegistry, Reward};
//!
//! let mut unit = UnitData::new();
//! unit.set_level(10);
//! let player = PlayerData::new();
//! let mut active = ActivePlayerData::new();
//!
//! let registry = EvaluatorRegistry::with_defaults();
//! let criteria = Criteria::new(1, CriteriaType::ReachLevel, 0, 10);
//! let context = CriteriaContext::new(&unit, &player, &active);
//! assert!(registry.is_met(&criteria, &context).unwrap());
//!
//! let reward = Reward { title: Some(2), coinage: 0 };
//! assert!(reward.apply(&mut active));
//! assert!(active.has_title(2));
//! ```

mod context;
mod criteria;
mod error;
mod evaluator;
mod reward;

pub use context::CriteriaContext;
pub use criteria::{Criteria, CriteriaType};
pub use error::{RulesError, RulesResult};
pub use evaluator::{CriteriaEvaluator, EvaluatorRegistry};
pub use reward::Reward;
