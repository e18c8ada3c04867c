//! Compilation of graphs and designs into facts.

use std::collections::BTreeSet;

use log::debug;

use crate::config::QueryConfig;
use crate::design::Design;
use crate::error::{Error, Result};
use crate::fact::{Fact, Predicate};
use crate::family::{Family, Link};
use crate::graph::{ConceptualGraph, RelationshipKind};
use crate::kb::OutputKind;
use crate::utils::combinations;
use crate::variable::VariableRegistry;

/// Facts of one query, split by whether their truth is already known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledFacts {
    pub asserted: Vec<Fact>,
    pub ambiguous: Vec<Fact>,
}

impl CompiledFacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fact unless the same proposition is already present.
    pub fn push(&mut self, fact: Fact) {
        if self.iter().any(|f| f.same_proposition(&fact)) {
            return;
        }
        if fact.is_ambiguous() {
            self.ambiguous.push(fact);
        } else {
            self.asserted.push(fact);
        }
    }

    /// Asserted facts first, then ambiguous ones.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.asserted.iter().chain(self.ambiguous.iter())
    }

    pub fn len(&self) -> usize {
        self.asserted.len() + self.ambiguous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_facts(self) -> Vec<Fact> {
        let mut facts = self.asserted;
        facts.extend(self.ambiguous);
        facts
    }

    pub fn as_set(&self) -> BTreeSet<&Fact> {
        self.iter().collect()
    }
}

/// An input that can be compiled into facts for a query.
pub trait Compile {
    /// Every variable the input mentions.
    fn registry(&self) -> VariableRegistry;

    /// The dependent variable, for inputs that have one.
    fn dependent(&self) -> Option<&str> {
        None
    }

    fn compile(&self, output: OutputKind, config: &QueryConfig) -> Result<CompiledFacts>;
}

fn compile_relationships(graph: &ConceptualGraph, registry: &VariableRegistry, out: &mut CompiledFacts) -> Result<()> {
    for r in graph.relationships() {
        for name in [&r.from, &r.to] {
            if !registry.contains(name) {
                return Err(Error::Compilation(format!(
                    "relationship '{}' names unknown variable '{}'",
                    r, name
                )));
            }
        }
        let args = [r.from.as_str(), r.to.as_str()];
        let fact = match r.kind {
            RelationshipKind::Causes => Fact::asserted(Predicate::Cause, args),
            RelationshipKind::AssociatesWith => Fact::ambiguous(Predicate::Correlate, args),
            RelationshipKind::NestsUnder => Fact::asserted(Predicate::NestsUnder, args),
            RelationshipKind::Has => Fact::asserted(Predicate::Has, args),
        };
        out.push(fact);
    }
    Ok(())
}

impl Compile for ConceptualGraph {
    fn registry(&self) -> VariableRegistry {
        self.variables().clone()
    }

    fn compile(&self, _output: OutputKind, _config: &QueryConfig) -> Result<CompiledFacts> {
        let mut out = CompiledFacts::new();
        compile_relationships(self, self.variables(), &mut out)?;
        debug!("compiled graph into {} facts", out.len());
        Ok(out)
    }
}

impl Compile for Design {
    fn registry(&self) -> VariableRegistry {
        Design::registry(self)
    }

    fn dependent(&self) -> Option<&str> {
        Some(self.dv().name())
    }

    fn compile(&self, output: OutputKind, config: &QueryConfig) -> Result<CompiledFacts> {
        let registry = Design::registry(self);
        let dv = self.dv().name();
        let mut out = CompiledFacts::new();

        if let Some(graph) = self.graph() {
            compile_relationships(graph, &registry, &mut out)?;
        }

        if self.ivs().iter().any(|iv| iv.name() == dv) {
            return Err(Error::Compilation(format!(
                "'{}' cannot be both the dependent and an independent variable",
                dv
            )));
        }

        for variable in std::iter::once(self.dv()).chain(self.ivs()) {
            out.push(Fact::asserted(variable.kind().predicate(), [variable.name()]));
        }
        for iv in self.ivs() {
            out.push(Fact::asserted(Predicate::MainEffect, [iv.name(), dv]));
        }
        for (name, transform) in self.transforms() {
            if !registry.contains(name) {
                return Err(Error::Compilation(format!(
                    "{} requested for unknown variable '{}'",
                    transform, name
                )));
            }
            out.push(Fact::asserted(Predicate::Transform(*transform), [name.as_str()]));
        }

        if output == OutputKind::StatisticalModel {
            self.deny_undeclared_relationships(&mut out);
            self.propose_candidates(config, &mut out);
        }

        debug!("compiled design for {} into {} facts", output, out.len());
        Ok(out)
    }
}

impl Design {
    /// IV to DV relationships are closed-world: whatever the attached graph
    /// does not declare is asserted false.
    fn deny_undeclared_relationships(&self, out: &mut CompiledFacts) {
        let dv = self.dv().name();
        let declared = |kind: RelationshipKind, from: &str, to: &str| {
            self.graph()
                .map_or(false, |g| g.relationships().any(|r| r.kind == kind && r.from == from && r.to == to))
        };
        for iv in self.ivs() {
            let x = iv.name();
            for (kind, predicate, from, to) in [
                (RelationshipKind::Causes, Predicate::Cause, x, dv),
                (RelationshipKind::AssociatesWith, Predicate::Correlate, x, dv),
                (RelationshipKind::AssociatesWith, Predicate::Correlate, dv, x),
            ] {
                if !declared(kind, from, to) {
                    out.push(Fact::negated(predicate, [from, to]));
                }
            }
        }
    }

    fn propose_candidates(&self, config: &QueryConfig, out: &mut CompiledFacts) {
        let dv = self.dv().name();
        let mut ivs: Vec<&str> = self.ivs().iter().map(|v| v.name()).collect();
        ivs.sort_unstable();

        if config.propose_interactions {
            for k in 2..=config.max_interaction_arity {
                for operands in combinations(&ivs, k) {
                    out.push(Fact::ambiguous(Predicate::Interaction, operands));
                }
            }
        }

        for family in Family::ALL {
            out.push(Fact::ambiguous(Predicate::Family(family), [dv]));
        }
        for link in Link::ALL {
            out.push(Fact::ambiguous(Predicate::Link(link), [dv]));
        }

        if !config.propose_random_effects {
            return;
        }
        let Some(graph) = self.graph() else {
            return;
        };
        for unit in graph.units_of(dv) {
            for group in graph.groups_of(unit) {
                out.push(Fact::ambiguous(Predicate::RandomIntercept, [group]));
                for &iv in &ivs {
                    if graph.units_of(iv).contains(&unit) {
                        out.push(Fact::ambiguous(Predicate::CorrelatedSlopeIntercept, [iv, group]));
                        out.push(Fact::ambiguous(Predicate::UncorrelatedSlopeIntercept, [iv, group]));
                    }
                }
            }
        }
    }
}
