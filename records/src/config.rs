//! Configuration for viewer-dependent projections.

/// Realm rules projections depend on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProjectionConfig {
    /// Players of opposing factions may group; raid members then see each
    /// other with the receiver's own faction template.
    pub allow_two_side_interaction_group: bool,
}

impl ProjectionConfig {
    /// Configuration with every optional rule enabled.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            allow_two_side_interaction_group: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_conservative() {
        assert!(!ProjectionConfig::default().allow_two_side_interaction_group);
        assert!(ProjectionConfig::for_testing().allow_two_side_interaction_group);
    }
}
