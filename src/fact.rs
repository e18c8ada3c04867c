//! Ground propositions about variables.

use std::fmt;

use crate::design::Transform;
use crate::error::{Error, Result};
use crate::family::{Family, Link};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Predicate {
    /// `Cause(x, y)`: x causes y.
    Cause,
    /// `Correlate(x, y)`: x and y are associated.
    Correlate,
    /// `Interaction(x, y, ...)`: the operands interact in their effect on the DV.
    Interaction,
    /// `NestsUnder(x, g)`: units of x are nested within groups of g.
    NestsUnder,
    /// `Has(u, x)`: x is measured on unit u.
    Has,
    /// `MainEffect(x, dv)`.
    MainEffect,
    Numeric,
    Nominal,
    Ordinal,
    Transform(Transform),
    /// `Family(dv)` for the given family.
    Family(Family),
    /// `Link(dv)` for the given link.
    Link(Link),
    /// `RandomIntercept(g)`.
    RandomIntercept,
    /// `RandomSlope(x, g)`.
    RandomSlope,
    CorrelatedSlopeIntercept,
    UncorrelatedSlopeIntercept,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn admits(self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == k,
            Arity::AtLeast(k) => n >= k,
        }
    }
}

impl Predicate {
    pub fn arity(self) -> Arity {
        match self {
            Predicate::Interaction => Arity::AtLeast(2),
            Predicate::Cause
            | Predicate::Correlate
            | Predicate::NestsUnder
            | Predicate::Has
            | Predicate::MainEffect
            | Predicate::RandomSlope
            | Predicate::CorrelatedSlopeIntercept
            | Predicate::UncorrelatedSlopeIntercept => Arity::Exactly(2),
            Predicate::Numeric
            | Predicate::Nominal
            | Predicate::Ordinal
            | Predicate::Transform(_)
            | Predicate::Family(_)
            | Predicate::Link(_)
            | Predicate::RandomIntercept => Arity::Exactly(1),
        }
    }

    /// Order in which facts are applied when casting results.
    ///
    /// Random effects come after main effects, since pairing a slope with an
    /// intercept checks the slope's variable against the main effects.
    pub fn rank(self) -> u8 {
        match self {
            Predicate::MainEffect => 0,
            Predicate::Interaction => 1,
            Predicate::Family(_) | Predicate::Link(_) => 2,
            Predicate::Numeric | Predicate::Nominal | Predicate::Ordinal | Predicate::Transform(_) => 3,
            Predicate::RandomIntercept
            | Predicate::RandomSlope
            | Predicate::CorrelatedSlopeIntercept
            | Predicate::UncorrelatedSlopeIntercept => 4,
            Predicate::Cause | Predicate::Correlate | Predicate::NestsUnder | Predicate::Has => 5,
        }
    }

    pub fn is_random_effect(self) -> bool {
        matches!(
            self,
            Predicate::RandomIntercept
                | Predicate::RandomSlope
                | Predicate::CorrelatedSlopeIntercept
                | Predicate::UncorrelatedSlopeIntercept
        )
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Cause => write!(f, "Cause"),
            Predicate::Correlate => write!(f, "Correlate"),
            Predicate::Interaction => write!(f, "Interaction"),
            Predicate::NestsUnder => write!(f, "NestsUnder"),
            Predicate::Has => write!(f, "Has"),
            Predicate::MainEffect => write!(f, "MainEffect"),
            Predicate::Numeric => write!(f, "NumericDataType"),
            Predicate::Nominal => write!(f, "NominalDataType"),
            Predicate::Ordinal => write!(f, "OrdinalDataType"),
            Predicate::Transform(t) => write!(f, "{}", t),
            Predicate::Family(family) => write!(f, "{}", family),
            Predicate::Link(link) => write!(f, "{}", link),
            Predicate::RandomIntercept => write!(f, "RandomIntercept"),
            Predicate::RandomSlope => write!(f, "RandomSlope"),
            Predicate::CorrelatedSlopeIntercept => write!(f, "CorrelatedSlopeIntercept"),
            Predicate::UncorrelatedSlopeIntercept => write!(f, "UncorrelatedSlopeIntercept"),
        }
    }
}

/// A ground proposition `Predicate(args...)` over variable names.
///
/// Asserted facts carry a known truth value. Ambiguous facts start without
/// one: they are tentatively assumed true while solving, and receive the
/// value of the final model once resolved.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Fact {
    predicate: Predicate,
    args: Vec<String>,
    value: Option<bool>,
    ambiguous: bool,
}

impl Fact {
    fn new<S: Into<String>>(
        predicate: Predicate,
        args: impl IntoIterator<Item = S>,
        value: Option<bool>,
        ambiguous: bool,
    ) -> Self {
        Self {
            predicate,
            args: args.into_iter().map(Into::into).collect(),
            value,
            ambiguous,
        }
    }

    pub fn asserted<S: Into<String>>(predicate: Predicate, args: impl IntoIterator<Item = S>) -> Self {
        Self::new(predicate, args, Some(true), false)
    }

    pub fn negated<S: Into<String>>(predicate: Predicate, args: impl IntoIterator<Item = S>) -> Self {
        Self::new(predicate, args, Some(false), false)
    }

    pub fn ambiguous<S: Into<String>>(predicate: Predicate, args: impl IntoIterator<Item = S>) -> Self {
        Self::new(predicate, args, None, true)
    }

    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn value(&self) -> Option<bool> {
        self.value
    }

    pub fn is_ambiguous(&self) -> bool {
        self.ambiguous
    }

    pub fn is_true(&self) -> bool {
        self.value == Some(true)
    }

    /// Polarity the fact is checked with.
    pub fn assumed_value(&self) -> bool {
        self.value.unwrap_or(true)
    }

    /// Same proposition with a settled truth value.
    pub fn resolved(&self, value: bool) -> Self {
        Self {
            value: Some(value),
            ..self.clone()
        }
    }

    /// Whether both facts state something about the same atom.
    pub fn same_proposition(&self, other: &Fact) -> bool {
        self.predicate == other.predicate && self.args == other.args
    }

    pub fn check_arity(&self) -> Result<()> {
        if self.predicate.arity().admits(self.args.len()) {
            Ok(())
        } else {
            Err(Error::Compilation(format!(
                "{} does not accept {} operand(s)",
                self.predicate,
                self.args.len()
            )))
        }
    }

    /// Proposition without its truth value, e.g. `Cause(A, B)`.
    pub fn proposition(&self) -> String {
        format!("{}({})", self.predicate, self.args.join(", "))
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value == Some(false) {
            write!(f, "Not({})", self.proposition())
        } else {
            write!(f, "{}", self.proposition())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let fact = Fact::asserted(Predicate::Cause, ["HW", "Math"]);
        assert_eq!(fact.to_string(), "Cause(HW, Math)");
        let fact = Fact::negated(Predicate::Correlate, ["Race", "Math"]);
        assert_eq!(fact.to_string(), "Not(Correlate(Race, Math))");
        let fact = Fact::ambiguous(Predicate::Family(Family::Poisson), ["Math"]);
        assert_eq!(fact.to_string(), "PoissonFamily(Math)");
    }

    #[test]
    fn test_ambiguous_is_assumed_true_until_resolved() {
        let fact = Fact::ambiguous(Predicate::Correlate, ["Race", "Math"]);
        assert_eq!(fact.value(), None);
        assert!(fact.assumed_value());
        assert!(!fact.is_true());
        let resolved = fact.resolved(true);
        assert!(resolved.is_true());
        assert!(resolved.is_ambiguous());
        assert!(resolved.same_proposition(&fact));
    }

    #[test]
    fn test_arity() {
        assert!(Fact::asserted(Predicate::Interaction, ["A", "B", "C"]).check_arity().is_ok());
        assert!(Fact::asserted(Predicate::Interaction, ["A"]).check_arity().is_err());
        assert!(Fact::asserted(Predicate::Cause, ["A"]).check_arity().is_err());
        assert!(Fact::asserted(Predicate::RandomIntercept, ["School"]).check_arity().is_ok());
    }

    #[test]
    fn test_rank_orders_main_effects_before_random_effects() {
        assert!(Predicate::MainEffect.rank() < Predicate::CorrelatedSlopeIntercept.rank());
        assert!(Predicate::RandomIntercept.is_random_effect());
        assert!(!Predicate::Interaction.is_random_effect());
    }
}
