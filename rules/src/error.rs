//! Error types for criteria evaluation.

use thiserror::Error;

use crate::CriteriaType;

/// Result type for rules operations.
pub type RulesResult<T> = Result<T, RulesError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RulesError {
    /// No evaluator is registered for the criteria's tag.
    #[error("no evaluator registered for {kind:?}")]
    NoEvaluator { kind: CriteriaType },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names_the_tag() {
        let err = RulesError::NoEvaluator {
            kind: CriteriaType::ExploreArea,
        };
        assert!(err.to_string().contains("ExploreArea"));
    }
}
