//! Probability families and link functions, with their compatibility tables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::variable::MeasurementKind;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Family {
    Gaussian,
    InverseGaussian,
    Gamma,
    Tweedie,
    Poisson,
    Binomial,
    NegativeBinomial,
}

impl Family {
    pub const ALL: [Family; 7] = [
        Family::Gaussian,
        Family::InverseGaussian,
        Family::Gamma,
        Family::Tweedie,
        Family::Poisson,
        Family::Binomial,
        Family::NegativeBinomial,
    ];

    /// Measurement kinds the dependent variable may have under this family.
    pub fn data_types(self) -> &'static [MeasurementKind] {
        match self {
            Family::Binomial => &[MeasurementKind::Nominal, MeasurementKind::Ordinal],
            _ => &[MeasurementKind::Numeric],
        }
    }

    /// Links admissible for this family.
    pub fn links(self) -> &'static [Link] {
        match self {
            Family::Gaussian => &[Link::Identity, Link::Log, Link::Inverse],
            Family::InverseGaussian => &[Link::InverseSquared, Link::Inverse, Link::Identity, Link::Log],
            Family::Gamma => &[Link::Inverse, Link::Identity, Link::Log],
            Family::Tweedie => &[Link::Log, Link::Power, Link::Identity],
            Family::Poisson => &[Link::Log, Link::Identity, Link::Squareroot],
            Family::Binomial => &[Link::Logit, Link::Probit, Link::Cauchy, Link::Log, Link::CLogLog],
            Family::NegativeBinomial => &[
                Link::Log,
                Link::CLogLog,
                Link::Identity,
                Link::NegativeBinomial,
                Link::Power,
            ],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Family::Gaussian => "Gaussian",
            Family::InverseGaussian => "InverseGaussian",
            Family::Gamma => "Gamma",
            Family::Tweedie => "Tweedie",
            Family::Poisson => "Poisson",
            Family::Binomial => "Binomial",
            Family::NegativeBinomial => "NegativeBinomial",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Family", self.name())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Link {
    Identity,
    Inverse,
    InverseSquared,
    Log,
    Logit,
    Probit,
    Cauchy,
    CLogLog,
    Power,
    Squareroot,
    NegativeBinomial,
}

impl Link {
    pub const ALL: [Link; 11] = [
        Link::Identity,
        Link::Inverse,
        Link::InverseSquared,
        Link::Log,
        Link::Logit,
        Link::Probit,
        Link::Cauchy,
        Link::CLogLog,
        Link::Power,
        Link::Squareroot,
        Link::NegativeBinomial,
    ];

    /// Families admitting this link.
    pub fn families(self) -> Vec<Family> {
        Family::ALL
            .into_iter()
            .filter(|family| family.links().contains(&self))
            .collect()
    }

    pub fn name(self) -> &'static str {
        match self {
            Link::Identity => "Identity",
            Link::Inverse => "Inverse",
            Link::InverseSquared => "InverseSquared",
            Link::Log => "Log",
            Link::Logit => "Logit",
            Link::Probit => "Probit",
            Link::Cauchy => "Cauchy",
            Link::CLogLog => "CLogLog",
            Link::Power => "Power",
            Link::Squareroot => "Squareroot",
            Link::NegativeBinomial => "NegativeBinomial",
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Link", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_link_has_a_family() {
        for link in Link::ALL {
            assert!(!link.families().is_empty(), "{} is orphaned", link);
        }
    }

    #[test]
    fn test_link_family_tables_agree() {
        for family in Family::ALL {
            for &link in family.links() {
                assert!(link.families().contains(&family));
            }
        }
        assert_eq!(Link::Logit.families(), vec![Family::Binomial]);
    }

    #[test]
    fn test_binomial_is_categorical() {
        assert!(!Family::Binomial.data_types().contains(&MeasurementKind::Numeric));
        assert!(Family::Poisson.data_types().contains(&MeasurementKind::Numeric));
    }
}
