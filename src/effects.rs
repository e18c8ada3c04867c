//! Enumeration of candidate main-effect sets from a conceptual graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::design::Design;
use crate::error::Result;
use crate::graph::ConceptualGraph;
use crate::utils::combinations;

/// Purpose of the model being built.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Only causes of the DV are candidate effects.
    Explanation,
    /// Causes and associated variables are candidate effects.
    Prediction,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct EffectsSet {
    pub dv: String,
    /// Sorted by name.
    pub main_effects: Vec<String>,
}

impl EffectsSet {
    /// A design over the same graph with these main effects as IVs.
    pub fn to_design(&self, graph: &ConceptualGraph) -> Result<Design> {
        let registry = graph.variables();
        let dv = registry.lookup(&self.dv)?.clone();
        let ivs = self
            .main_effects
            .iter()
            .map(|name| registry.lookup(name).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(Design::new(dv).with_ivs(ivs).with_graph(graph.clone()))
    }
}

impl fmt::Display for EffectsSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.dv, self.main_effects.join(" + "))
    }
}

/// Candidate effects of `dv` for the task, sorted by name.
pub fn candidates<'a>(graph: &'a ConceptualGraph, dv: &str, task: Task) -> Vec<&'a str> {
    let mut out = graph.causes_of(dv);
    if task == Task::Prediction {
        out.extend(graph.associates_of(dv));
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// All non-empty sets of candidate effects of `dv`, up to `max_size`
/// elements, ordered by size and then lexicographically by name.
pub fn generate(graph: &ConceptualGraph, dv: &str, task: Task, max_size: Option<usize>) -> Result<Vec<EffectsSet>> {
    graph.variables().lookup(dv)?;
    let candidates = candidates(graph, dv, task);
    let max_size = max_size.unwrap_or(candidates.len()).min(candidates.len());

    let mut out = Vec::new();
    for k in 1..=max_size {
        for subset in combinations(&candidates, k) {
            out.push(EffectsSet {
                dv: dv.to_string(),
                main_effects: subset.into_iter().map(String::from).collect(),
            });
        }
    }
    Ok(out)
}
