//! Query errors.
//!
//! Only the conflict-resolution loop recovers locally (by dropping facts);
//! every error below is fatal for the query that raised it.

use thiserror::Error;

use crate::fact::Fact;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A declared relationship or requested term names an unknown variable,
    /// or the input is otherwise malformed.
    #[error("Compilation error: {0}")]
    Compilation(String),

    /// The requested output kind has no rule batches registered.
    #[error("Grounding error: no rule batches registered for {0}")]
    Grounding(String),

    /// Conflict resolution ran out of contested facts without reaching SAT.
    #[error("Unsatisfiable query; final conflict core: [{}]", join_facts(.core))]
    Unsatisfiable { core: Vec<Fact> },

    /// The solver could not decide satisfiability within its budget.
    #[error("Solver is indeterminate: {0}")]
    SolverIndeterminate(String),

    /// A fact operand does not name a known variable.
    #[error("Unknown variable: {0}")]
    Lookup(String),

    /// The resolver returned a decision that does not shrink the core.
    #[error("Invalid conflict resolution: {0}")]
    InvalidResolution(String),

    /// The resolver was cancelled or timed out.
    #[error("Conflict resolution cancelled: {0}")]
    Cancelled(String),

    /// A random effect was constructed in an invalid state.
    #[error("Invalid random effect: {0}")]
    RandomEffect(String),

    #[error("Missing data column '{column}' for variable '{variable}'")]
    MissingColumn { variable: String, column: String },

    #[error("Data shape error: {0}")]
    DataShape(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn join_facts(facts: &[Fact]) -> String {
    facts.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::Predicate;

    #[test]
    fn test_unsatisfiable_lists_core() {
        let err = Error::Unsatisfiable {
            core: vec![
                Fact::asserted(Predicate::Cause, ["A", "B"]),
                Fact::asserted(Predicate::Cause, ["B", "A"]),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Unsatisfiable query; final conflict core: [Cause(A, B), Cause(B, A)]"
        );
    }

    #[test]
    fn test_missing_column_message() {
        let err = Error::MissingColumn {
            variable: "SES".to_string(),
            column: "ses".to_string(),
        };
        assert_eq!(err.to_string(), "Missing data column 'ses' for variable 'SES'");
    }
}
