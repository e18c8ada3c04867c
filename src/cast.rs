//! Casting solved facts into query outputs.

use log::debug;

use crate::error::Result;
use crate::fact::{Fact, Predicate};
use crate::graph::ConceptualGraph;
use crate::model::{RandomEffect, StatisticalModelSpec};
use crate::schema::DataSchema;
use crate::variable::{MeasurementKind, VariableRegistry};

/// An output that true facts can be written into.
pub trait CastTarget {
    /// Apply one true fact whose operands are known variables. Returns
    /// whether the fact affected the output.
    fn apply_fact(&mut self, fact: &Fact, registry: &VariableRegistry) -> Result<bool>;
}

/// Apply every true fact to `output`, in predicate rank order.
///
/// Returns the number of facts that affected the output.
pub fn cast<T: CastTarget + ?Sized>(output: &mut T, facts: &[Fact], registry: &VariableRegistry) -> Result<usize> {
    let mut true_facts: Vec<&Fact> = facts.iter().filter(|f| f.is_true()).collect();
    true_facts.sort_by(|a, b| {
        a.predicate()
            .rank()
            .cmp(&b.predicate().rank())
            .then_with(|| a.cmp(b))
    });

    let mut applied = 0;
    for fact in true_facts {
        for name in fact.args() {
            registry.lookup(name)?;
        }
        if output.apply_fact(fact, registry)? {
            applied += 1;
        } else {
            debug!("cast: {} does not apply", fact);
        }
    }
    Ok(applied)
}

impl CastTarget for ConceptualGraph {
    fn apply_fact(&mut self, fact: &Fact, registry: &VariableRegistry) -> Result<bool> {
        let vars = fact
            .args()
            .iter()
            .map(|name| registry.lookup(name))
            .collect::<Result<Vec<_>>>()?;
        let changed = match fact.predicate() {
            Predicate::Cause => self.causes(vars[0], vars[1]),
            Predicate::Correlate => self.associates_with(vars[0], vars[1]),
            Predicate::Interaction => {
                let mut changed = false;
                for (i, a) in vars.iter().enumerate() {
                    for b in &vars[i + 1..] {
                        changed |= self.associates_with(a, b);
                    }
                }
                changed
            }
            Predicate::Has => self.has(vars[0], vars[1]),
            Predicate::NestsUnder => self.nests_under(vars[0], vars[1]),
            _ => return Ok(false),
        };
        Ok(changed)
    }
}

impl CastTarget for StatisticalModelSpec {
    fn apply_fact(&mut self, fact: &Fact, _registry: &VariableRegistry) -> Result<bool> {
        let args = fact.args();
        match fact.predicate() {
            Predicate::MainEffect => self.add_main_effect(&args[0]),
            Predicate::Interaction => self.add_interaction(args),
            Predicate::RandomIntercept => self.add_random_effect(RandomEffect::intercept(&args[0])),
            Predicate::RandomSlope => self.add_random_effect(RandomEffect::slope(&args[0], &args[1])),
            Predicate::CorrelatedSlopeIntercept => {
                let effect = RandomEffect::correlated(&args[0], &args[1], &self.main_effects)?;
                self.add_random_effect(effect);
            }
            Predicate::UncorrelatedSlopeIntercept => {
                let effect = RandomEffect::uncorrelated(&args[0], &args[1], &self.main_effects)?;
                self.add_random_effect(effect);
            }
            Predicate::Family(family) => self.family = Some(family),
            Predicate::Link(link) => self.link = Some(link),
            Predicate::Transform(t) => self.add_transformation(&args[0], t),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl CastTarget for DataSchema {
    fn apply_fact(&mut self, fact: &Fact, registry: &VariableRegistry) -> Result<bool> {
        let name = &fact.args()[0];
        match fact.predicate() {
            Predicate::Numeric => self.set_kind(name, MeasurementKind::Numeric),
            Predicate::Nominal => self.set_kind(name, MeasurementKind::Nominal),
            Predicate::Ordinal => self.set_kind(name, MeasurementKind::Ordinal),
            Predicate::Transform(t) => {
                let kind = registry.lookup(name)?.kind();
                self.set_transform(name, kind, t);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Transform;
    use crate::error::Error;
    use crate::family::Family;
    use crate::graph::RelationshipKind;
    use crate::variable::Variable;

    fn registry() -> VariableRegistry {
        [
            Variable::numeric("Math"),
            Variable::numeric("HW"),
            Variable::nominal("Race"),
            Variable::nominal("School"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_cast_graph() {
        let registry = registry();
        let mut graph = ConceptualGraph::new();
        let facts = vec![
            Fact::asserted(Predicate::Cause, ["HW", "Math"]),
            Fact::ambiguous(Predicate::Correlate, ["Race", "Math"]).resolved(true),
            Fact::ambiguous(Predicate::Interaction, ["HW", "Race"]).resolved(true),
            Fact::ambiguous(Predicate::Correlate, ["School", "Math"]).resolved(false),
        ];
        assert_eq!(cast(&mut graph, &facts, &registry).unwrap(), 3);
        assert!(graph.has_edge(RelationshipKind::Causes, "HW", "Math"));
        assert!(graph.has_edge(RelationshipKind::AssociatesWith, "Math", "Race"));
        assert!(graph.has_edge(RelationshipKind::AssociatesWith, "HW", "Race"));
        assert!(!graph.are_adjacent("School", "Math"));
    }

    #[test]
    fn test_cast_model_applies_main_effects_first() {
        let registry = registry();
        let mut spec = StatisticalModelSpec::new("Math");
        let facts = vec![
            Fact::ambiguous(Predicate::CorrelatedSlopeIntercept, ["HW", "School"]).resolved(true),
            Fact::ambiguous(Predicate::Family(Family::Gaussian), ["Math"]).resolved(true),
            Fact::ambiguous(Predicate::Family(Family::Poisson), ["Math"]).resolved(false),
            Fact::asserted(Predicate::MainEffect, ["HW", "Math"]),
            Fact::asserted(Predicate::Transform(Transform::Log), ["HW"]),
            Fact::asserted(Predicate::Cause, ["HW", "Math"]),
        ];
        assert_eq!(cast(&mut spec, &facts, &registry).unwrap(), 4);
        assert_eq!(spec.main_effects, vec!["HW"]);
        assert_eq!(spec.family, Some(Family::Gaussian));
        assert_eq!(
            spec.random_effects,
            vec![RandomEffect::CorrelatedSlopeIntercept {
                iv: "HW".to_string(),
                groups: "School".to_string(),
            }]
        );
        assert_eq!(spec.transformations, vec![("HW".to_string(), Transform::Log)]);
    }

    #[test]
    fn test_cast_unknown_variable() {
        let registry = registry();
        let mut schema = DataSchema::new();
        let facts = vec![Fact::asserted(Predicate::Numeric, ["Income"])];
        let err = cast(&mut schema, &facts, &registry).unwrap_err();
        assert!(matches!(err, Error::Lookup(name) if name == "Income"));
    }

    #[test]
    fn test_cast_schema() {
        let registry = registry();
        let mut schema = DataSchema::new();
        let facts = vec![
            Fact::asserted(Predicate::Transform(Transform::Squareroot), ["HW"]),
            Fact::asserted(Predicate::Numeric, ["HW"]),
            Fact::asserted(Predicate::Nominal, ["Race"]),
        ];
        cast(&mut schema, &facts, &registry).unwrap();
        assert_eq!(schema.column("HW").unwrap().transform, Some(Transform::Squareroot));
        assert_eq!(schema.column("Race").unwrap().kind, MeasurementKind::Nominal);
    }
}
