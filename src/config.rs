//! Query and solver settings.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sizing of the decision-diagram solver context.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Node budget is `2^storage_bits`; exceeding it makes the query indeterminate.
    pub storage_bits: usize,
    pub cache_bits: usize,
}

impl SolverConfig {
    /// Largest accepted `storage_bits`: node indices must fit a reference.
    pub const MAX_STORAGE_BITS: usize = 31;

    pub fn validate(&self) -> Result<()> {
        if self.storage_bits > Self::MAX_STORAGE_BITS {
            return Err(Error::Config(format!(
                "storage_bits must be at most {}, got {}",
                Self::MAX_STORAGE_BITS,
                self.storage_bits
            )));
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            storage_bits: 20,
            cache_bits: 16,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub solver: SolverConfig,
    /// Largest interaction proposed as a candidate (at least 2 to propose any).
    pub max_interaction_arity: usize,
    pub propose_interactions: bool,
    pub propose_random_effects: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            max_interaction_arity: 2,
            propose_interactions: true,
            propose_random_effects: true,
        }
    }
}

impl QueryConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        let config: QueryConfig = serde_json::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.solver.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = QueryConfig::from_json(r#"{ "max_interaction_arity": 3 }"#).unwrap();
        assert_eq!(config.max_interaction_arity, 3);
        assert!(config.propose_interactions);
        assert_eq!(config.solver, SolverConfig::default());

        let config = QueryConfig::from_json(r#"{ "solver": { "storage_bits": 12 } }"#).unwrap();
        assert_eq!(config.solver.storage_bits, 12);
        assert_eq!(config.solver.cache_bits, 16);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(QueryConfig::from_json("{ nope"), Err(Error::Config(_))));
        assert!(matches!(
            QueryConfig::from_json(r#"{ "solver": { "storage_bits": 40 } }"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_validate_storage_bits() {
        let mut config = SolverConfig::default();
        assert!(config.validate().is_ok());
        config.storage_bits = SolverConfig::MAX_STORAGE_BITS;
        assert!(config.validate().is_ok());
        config.storage_bits = 40;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
