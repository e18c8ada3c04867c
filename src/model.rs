//! Statistical model specifications: the output of a model query, handed
//! to code generation as JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::design::Transform;
use crate::error::{Error, Result};
use crate::family::{Family, Link};

/// Random-effect term. `groups` names the grouping variable, `iv` the
/// variable whose slope varies across groups.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RandomEffect {
    RandomIntercept { groups: String },
    RandomSlope { iv: String, groups: String },
    CorrelatedSlopeIntercept { iv: String, groups: String },
    UncorrelatedSlopeIntercept { iv: String, groups: String },
}

impl RandomEffect {
    pub fn intercept(groups: impl Into<String>) -> Self {
        RandomEffect::RandomIntercept { groups: groups.into() }
    }

    pub fn slope(iv: impl Into<String>, groups: impl Into<String>) -> Self {
        RandomEffect::RandomSlope {
            iv: iv.into(),
            groups: groups.into(),
        }
    }

    /// Slope and intercept that vary jointly across `groups`.
    ///
    /// Fails if `iv` is not among `main_effects`.
    pub fn correlated(iv: &str, groups: &str, main_effects: &[String]) -> Result<Self> {
        check_main_effect(iv, groups, main_effects)?;
        Ok(RandomEffect::CorrelatedSlopeIntercept {
            iv: iv.to_string(),
            groups: groups.to_string(),
        })
    }

    /// Slope and intercept that vary independently across `groups`.
    ///
    /// Fails if `iv` is not among `main_effects`.
    pub fn uncorrelated(iv: &str, groups: &str, main_effects: &[String]) -> Result<Self> {
        check_main_effect(iv, groups, main_effects)?;
        Ok(RandomEffect::UncorrelatedSlopeIntercept {
            iv: iv.to_string(),
            groups: groups.to_string(),
        })
    }

    /// Combine a random slope with a random intercept over the same groups.
    pub fn pair(slope: &RandomEffect, intercept: &RandomEffect, correlated: bool, main_effects: &[String]) -> Result<Self> {
        let (RandomEffect::RandomSlope { iv, groups }, RandomEffect::RandomIntercept { groups: other }) = (slope, intercept)
        else {
            return Err(Error::RandomEffect(format!(
                "cannot pair {} with {}: expected a slope and an intercept",
                slope, intercept
            )));
        };
        if groups != other {
            return Err(Error::RandomEffect(format!(
                "slope varies across '{}' but intercept across '{}'",
                groups, other
            )));
        }
        if correlated {
            Self::correlated(iv, groups, main_effects)
        } else {
            Self::uncorrelated(iv, groups, main_effects)
        }
    }

    pub fn groups(&self) -> &str {
        match self {
            RandomEffect::RandomIntercept { groups }
            | RandomEffect::RandomSlope { groups, .. }
            | RandomEffect::CorrelatedSlopeIntercept { groups, .. }
            | RandomEffect::UncorrelatedSlopeIntercept { groups, .. } => groups,
        }
    }

    pub fn iv(&self) -> Option<&str> {
        match self {
            RandomEffect::RandomIntercept { .. } => None,
            RandomEffect::RandomSlope { iv, .. }
            | RandomEffect::CorrelatedSlopeIntercept { iv, .. }
            | RandomEffect::UncorrelatedSlopeIntercept { iv, .. } => Some(iv),
        }
    }
}

fn check_main_effect(iv: &str, groups: &str, main_effects: &[String]) -> Result<()> {
    if main_effects.iter().any(|m| m == iv) {
        Ok(())
    } else {
        Err(Error::RandomEffect(format!(
            "slope of '{}' across '{}' requires '{}' to be a main effect",
            iv, groups, iv
        )))
    }
}

impl fmt::Display for RandomEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RandomEffect::RandomIntercept { groups } => write!(f, "RandomIntercept({})", groups),
            RandomEffect::RandomSlope { iv, groups } => write!(f, "RandomSlope({}, {})", iv, groups),
            RandomEffect::CorrelatedSlopeIntercept { iv, groups } => {
                write!(f, "CorrelatedSlopeIntercept({}, {})", iv, groups)
            }
            RandomEffect::UncorrelatedSlopeIntercept { iv, groups } => {
                write!(f, "UncorrelatedSlopeIntercept({}, {})", iv, groups)
            }
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatisticalModelSpec {
    pub dv: String,
    /// Alphabetized.
    pub main_effects: Vec<String>,
    /// Sorted; operands of each interaction are sorted too.
    pub interactions: Vec<Vec<String>>,
    pub random_effects: Vec<RandomEffect>,
    pub family: Option<Family>,
    pub link: Option<Link>,
    pub transformations: Vec<(String, Transform)>,
    pub dataset: Option<String>,
}

impl StatisticalModelSpec {
    pub fn new(dv: impl Into<String>) -> Self {
        Self {
            dv: dv.into(),
            ..Self::default()
        }
    }

    pub fn add_main_effect(&mut self, name: &str) {
        if let Err(i) = self.main_effects.binary_search_by(|m| m.as_str().cmp(name)) {
            self.main_effects.insert(i, name.to_string());
        }
    }

    pub fn add_interaction<S: AsRef<str>>(&mut self, operands: &[S]) {
        let mut operands: Vec<String> = operands.iter().map(|s| s.as_ref().to_string()).collect();
        operands.sort();
        if let Err(i) = self.interactions.binary_search(&operands) {
            self.interactions.insert(i, operands);
        }
    }

    pub fn add_random_effect(&mut self, effect: RandomEffect) {
        if !self.random_effects.contains(&effect) {
            self.random_effects.push(effect);
        }
    }

    pub fn add_transformation(&mut self, name: &str, transform: Transform) {
        if !self.transformations.iter().any(|(n, _)| n == name) {
            self.transformations.push((name.to_string(), transform));
        }
    }

    /// Every variable the model needs data for: the DV, main effects,
    /// interaction operands, and random-effect slopes and groups.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = vec![self.dv.as_str()];
        names.extend(self.main_effects.iter().map(String::as_str));
        names.extend(self.interactions.iter().flatten().map(String::as_str));
        for effect in &self.random_effects {
            names.extend(effect.iv());
            names.push(effect.groups());
        }
        let mut seen = std::collections::BTreeSet::new();
        names.retain(|n| seen.insert(*n));
        names
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

impl fmt::Display for StatisticalModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DV: {}", self.dv)?;
        writeln!(f, "Main effects: {}", self.main_effects.join(", "))?;
        let interactions: Vec<String> = self.interactions.iter().map(|i| i.join(" * ")).collect();
        writeln!(f, "Interactions: {}", interactions.join(", "))?;
        let random: Vec<String> = self.random_effects.iter().map(|r| r.to_string()).collect();
        writeln!(f, "Random effects: {}", random.join(", "))?;
        match (self.family, self.link) {
            (Some(family), Some(link)) => writeln!(f, "Family: {} with {}", family, link)?,
            (Some(family), None) => writeln!(f, "Family: {}", family)?,
            (None, Some(link)) => writeln!(f, "Link: {}", link)?,
            (None, None) => {}
        }
        for (name, transform) in &self.transformations {
            writeln!(f, "Transform: {} of {}", transform, name)?;
        }
        Ok(())
    }
}
