//! Study designs: a dependent variable, its candidate predictors, and the
//! conceptual graph they were drawn from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::ConceptualGraph;
use crate::variable::{Variable, VariableRegistry};

/// Data transformation applied to a variable before modeling.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    Log,
    Squareroot,
}

impl Transform {
    pub const ALL: [Transform; 2] = [Transform::Log, Transform::Squareroot];
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Log => write!(f, "LogTransform"),
            Transform::Squareroot => write!(f, "SquarerootTransform"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Design {
    dv: Variable,
    ivs: Vec<Variable>,
    graph: Option<ConceptualGraph>,
    transforms: Vec<(String, Transform)>,
    dataset: Option<String>,
}

impl Design {
    pub fn new(dv: Variable) -> Self {
        Self {
            dv,
            ivs: Vec::new(),
            graph: None,
            transforms: Vec::new(),
            dataset: None,
        }
    }

    /// Add independent variables. Repeated variables are ignored.
    pub fn with_ivs(mut self, ivs: impl IntoIterator<Item = Variable>) -> Self {
        for iv in ivs {
            if !self.ivs.iter().any(|v| v.name() == iv.name()) {
                self.ivs.push(iv);
            }
        }
        self
    }

    pub fn with_graph(mut self, graph: ConceptualGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn with_transform(mut self, variable: &Variable, transform: Transform) -> Self {
        self.transforms.push((variable.name().to_string(), transform));
        self
    }

    /// Reference to the dataset the model will be fitted on.
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    pub fn dv(&self) -> &Variable {
        &self.dv
    }

    pub fn ivs(&self) -> &[Variable] {
        &self.ivs
    }

    pub fn graph(&self) -> Option<&ConceptualGraph> {
        self.graph.as_ref()
    }

    pub fn transforms(&self) -> &[(String, Transform)] {
        &self.transforms
    }

    pub fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref()
    }

    /// All variables the design mentions: DV, IVs, and the graph's.
    pub fn registry(&self) -> VariableRegistry {
        let mut registry: VariableRegistry = std::iter::once(self.dv.clone())
            .chain(self.ivs.iter().cloned())
            .collect();
        if let Some(graph) = &self.graph {
            registry.extend(graph.variables());
        }
        registry
    }
}
