//! Conceptual graphs: declared relationships between variables.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::variable::{Variable, VariableRegistry};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Causes,
    AssociatesWith,
    NestsUnder,
    Has,
}

impl RelationshipKind {
    pub fn is_directed(self) -> bool {
        !matches!(self, RelationshipKind::AssociatesWith)
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipKind::Causes => write!(f, "causes"),
            RelationshipKind::AssociatesWith => write!(f, "associates_with"),
            RelationshipKind::NestsUnder => write!(f, "nests_under"),
            RelationshipKind::Has => write!(f, "has"),
        }
    }
}

/// A typed edge between two variables, by name.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub from: String,
    pub to: String,
}

impl Relationship {
    pub fn new(kind: RelationshipKind, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            kind,
            from: from.into(),
            to: to.into(),
        }
    }

    /// Whether both relationships denote the same edge.
    ///
    /// Associations are symmetric, so `A ~ B` and `B ~ A` coincide.
    pub fn same_edge(&self, other: &Relationship) -> bool {
        if self.kind != other.kind {
            return false;
        }
        (self.from == other.from && self.to == other.to)
            || (!self.kind.is_directed() && self.from == other.to && self.to == other.from)
    }

    /// The endpoint opposite to `name`, if `name` is an endpoint.
    pub fn other(&self, name: &str) -> Option<&str> {
        if self.from == name {
            Some(&self.to)
        } else if self.to == name {
            Some(&self.from)
        } else {
            None
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from, self.kind, self.to)
    }
}

/// Variables plus their outgoing relationships.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ConceptualGraph {
    variables: VariableRegistry,
    adjacency: BTreeMap<String, Vec<Relationship>>,
}

impl ConceptualGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph over the same variables, without any edges.
    pub fn empty_like(&self) -> Self {
        Self {
            variables: self.variables.clone(),
            adjacency: BTreeMap::new(),
        }
    }

    /// Add a variable. Adding one that is already present is a no-op.
    pub fn add_variable(&mut self, variable: Variable) -> bool {
        self.variables.insert(variable)
    }

    /// Add an edge between names; returns `false` for a duplicate edge.
    ///
    /// Endpoints are not checked here: fact compilation rejects edges whose
    /// endpoints are not registered.
    pub fn add_relationship(&mut self, relationship: Relationship) -> bool {
        if self.relationships().any(|r| r.same_edge(&relationship)) {
            return false;
        }
        self.adjacency
            .entry(relationship.from.clone())
            .or_default()
            .push(relationship);
        true
    }

    fn relate(&mut self, kind: RelationshipKind, from: &Variable, to: &Variable) -> bool {
        self.add_variable(from.clone());
        self.add_variable(to.clone());
        self.add_relationship(Relationship::new(kind, from.name(), to.name()))
    }

    pub fn causes(&mut self, cause: &Variable, effect: &Variable) -> bool {
        self.relate(RelationshipKind::Causes, cause, effect)
    }

    pub fn associates_with(&mut self, a: &Variable, b: &Variable) -> bool {
        self.relate(RelationshipKind::AssociatesWith, a, b)
    }

    pub fn nests_under(&mut self, unit: &Variable, group: &Variable) -> bool {
        self.relate(RelationshipKind::NestsUnder, unit, group)
    }

    pub fn has(&mut self, unit: &Variable, measure: &Variable) -> bool {
        self.relate(RelationshipKind::Has, unit, measure)
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// All relationships, grouped by source variable in name order.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.adjacency.values().flatten()
    }

    /// Relationships with `name` at either end.
    pub fn relationships_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships().filter(move |r| r.from == name || r.to == name)
    }

    pub fn num_edges(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn has_edge(&self, kind: RelationshipKind, from: &str, to: &str) -> bool {
        let probe = Relationship::new(kind, from, to);
        self.relationships().any(|r| r.same_edge(&probe))
    }

    /// Whether any edge of any kind joins the two variables.
    pub fn are_adjacent(&self, a: &str, b: &str) -> bool {
        self.relationships_of(a).any(|r| r.other(a) == Some(b))
    }

    /// Variables declared to cause `name`, sorted.
    pub fn causes_of(&self, name: &str) -> Vec<&str> {
        self.collect_sorted(|r| r.kind == RelationshipKind::Causes && r.to == name, |r| &r.from)
    }

    /// Variables associated with `name`, sorted.
    pub fn associates_of(&self, name: &str) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .relationships()
            .filter(|r| r.kind == RelationshipKind::AssociatesWith)
            .filter_map(|r| r.other(name))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Groups that `unit` is nested under, sorted.
    pub fn groups_of(&self, unit: &str) -> Vec<&str> {
        self.collect_sorted(|r| r.kind == RelationshipKind::NestsUnder && r.from == unit, |r| &r.to)
    }

    /// Units on which `measure` is recorded, sorted.
    pub fn units_of(&self, measure: &str) -> Vec<&str> {
        self.collect_sorted(|r| r.kind == RelationshipKind::Has && r.to == measure, |r| &r.from)
    }

    fn collect_sorted<'a>(
        &'a self,
        keep: impl Fn(&Relationship) -> bool,
        pick: impl Fn(&'a Relationship) -> &'a String,
    ) -> Vec<&'a str> {
        let mut out: Vec<&str> = self
            .relationships()
            .filter(|r| keep(r))
            .map(|r| pick(r).as_str())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}
