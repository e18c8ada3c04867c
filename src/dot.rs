//! Conceptual graph to DOT (Graphviz) conversion.
//!
//! The generated DOT output follows these conventions:
//! - **Variables** are nodes, labeled with their name and measurement kind
//! - **Edges**:
//!   - Solid arrows represent causal relationships
//!   - Dashed undirected edges represent associations
//!   - Dotted arrows with a diamond represent nesting (unit to group)
//!   - Bold arrows represent measurement ownership (unit to measure)
//!
//! # Examples
//!
//! ```
//! use model_synth::graph::ConceptualGraph;
//! use model_synth::variable::Variable;
//!
//! let hw = Variable::numeric("HW");
//! let math = Variable::numeric("Math");
//! let mut graph = ConceptualGraph::new();
//! graph.causes(&hw, &math);
//!
//! let dot = graph.to_dot().unwrap();
//! assert!(dot.contains("\"HW\" -> \"Math\""));
//! ```

use crate::graph::{ConceptualGraph, RelationshipKind};

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for variable nodes (default: "ellipse")
    pub node_shape: &'static str,
    /// Style for causal edges (default: "solid")
    pub causes_style: &'static str,
    /// Style for association edges (default: "dashed")
    pub associates_style: &'static str,
    /// Style for nesting edges (default: "dotted")
    pub nests_style: &'static str,
    /// Style for measurement edges (default: "bold")
    pub has_style: &'static str,
    /// Whether to show the measurement kind under the name (default: true)
    pub show_kinds: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "ellipse",
            causes_style: "solid",
            associates_style: "dashed",
            nests_style: "dotted",
            has_style: "bold",
            show_kinds: true,
        }
    }
}

impl ConceptualGraph {
    /// Converts the graph to DOT format with the default configuration.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        use std::fmt::Write as _;

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "node [shape={}];", config.node_shape)?;

        for variable in self.variables().iter() {
            let label = if config.show_kinds {
                format!("{}\\n{}", variable.name(), variable.kind())
            } else {
                variable.name().to_string()
            };
            writeln!(dot, "\"{}\" [label=\"{}\"];", variable.name(), label)?;
        }

        for r in self.relationships() {
            let attributes = match r.kind {
                RelationshipKind::Causes => format!("style={}", config.causes_style),
                RelationshipKind::AssociatesWith => format!("style={}, dir=none", config.associates_style),
                RelationshipKind::NestsUnder => format!("style={}, arrowhead=diamond", config.nests_style),
                RelationshipKind::Has => format!("style={}", config.has_style),
            };
            writeln!(dot, "\"{}\" -> \"{}\" [{}];", r.from, r.to, attributes)?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::Variable;

    #[test]
    fn test_to_dot() {
        let race = Variable::nominal("Race");
        let math = Variable::numeric("Math");
        let mut graph = ConceptualGraph::new();
        graph.associates_with(&race, &math);

        let dot = graph.to_dot().unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("\"Race\" [label=\"Race\\nnominal\"];"));
        assert!(dot.contains("\"Race\" -> \"Math\" [style=dashed, dir=none];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_to_dot_without_kinds() {
        let student = Variable::nominal("Student");
        let school = Variable::nominal("School");
        let mut graph = ConceptualGraph::new();
        graph.nests_under(&student, &school);

        let config = DotConfig {
            show_kinds: false,
            ..DotConfig::default()
        };
        let dot = graph.to_dot_with_config(&config).unwrap();
        assert!(dot.contains("\"School\" [label=\"School\"];"));
        assert!(dot.contains("arrowhead=diamond"));
    }
}
