//! Limits for the broadcast driver.

/// Replicator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReplicatorConfig {
    /// Maximum entities tracked at once (hard safety cap).
    pub max_entities: usize,
    /// Initial capacity of each per-entity payload buffer.
    pub initial_payload_bytes: usize,
}

impl Default for ReplicatorConfig {
    fn default() -> Self {
        Self {
            max_entities: 65_536,
            initial_payload_bytes: 256,
        }
    }
}

impl ReplicatorConfig {
    /// Creates a configuration suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_entities: 64,
            initial_payload_bytes: 32,
        }
    }

    /// Creates a configuration with no entity cap (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_entities: usize::MAX,
            initial_payload_bytes: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testing_config_smaller() {
        let test = ReplicatorConfig::for_testing();
        let default = ReplicatorConfig::default();
        assert!(test.max_entities < default.max_entities);
        assert!(test.initial_payload_bytes < default.initial_payload_bytes);
    }

    #[test]
    fn unlimited_config() {
        assert_eq!(ReplicatorConfig::unlimited().max_entities, usize::MAX);
    }
}
