//! Rule grounding: instantiating rule templates over the constants of a query.
//!
//! Grounding is a pure function of the template and the [`GroundingContext`],
//! so grounding the same batch twice yields the same clauses.

use log::debug;

use crate::constants::{Atom, Constant, ConstantBinding};
use crate::design::Transform;
use crate::error::{Error, Result};
use crate::fact::{Fact, Predicate};
use crate::family::{Family, Link};
use crate::formula::Formula;
use crate::kb::{RuleBatch, RuleTemplate};
use crate::variable::MeasurementKind;

/// Candidate sets the rule templates quantify over.
#[derive(Debug, Clone, Default)]
pub struct GroundingContext {
    pub dv: Option<Constant>,
    pub variables: Vec<Constant>,
    pub interactions: Vec<Vec<Constant>>,
    /// `(unit, group)` pairs declared by `NestsUnder` facts.
    pub nestings: Vec<(Constant, Constant)>,
    /// Groups proposed for random intercepts.
    pub groups: Vec<Constant>,
    /// `(iv, group)` pairs proposed for random slopes.
    pub slopes: Vec<(Constant, Constant)>,
}

impl GroundingContext {
    pub fn new(binding: &ConstantBinding, facts: &[Fact], dv: Option<&str>) -> Result<Self> {
        let dv = match dv {
            Some(name) => Some(
                binding
                    .get(name)
                    .ok_or_else(|| Error::Compilation(format!("dependent variable '{}' is not bound", name)))?,
            ),
            None => None,
        };

        let mut ctx = Self {
            dv,
            variables: binding.constants().collect(),
            ..Self::default()
        };
        for fact in facts {
            fact.check_arity()?;
            let atom = binding.atom(fact)?;
            let args = atom.args;
            match fact.predicate() {
                Predicate::Interaction => push_unique(&mut ctx.interactions, args),
                Predicate::NestsUnder => push_unique(&mut ctx.nestings, (args[0], args[1])),
                Predicate::RandomIntercept => push_unique(&mut ctx.groups, args[0]),
                Predicate::RandomSlope
                | Predicate::CorrelatedSlopeIntercept
                | Predicate::UncorrelatedSlopeIntercept => push_unique(&mut ctx.slopes, (args[0], args[1])),
                _ => {}
            }
        }
        Ok(ctx)
    }
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

fn atom(predicate: Predicate, args: impl IntoIterator<Item = Constant>) -> Formula {
    Formula::atom(Atom::new(predicate, args))
}

fn data_type(kind: MeasurementKind, x: Constant) -> Formula {
    atom(kind.predicate(), [x])
}

/// Ground one rule template.
pub fn ground(template: RuleTemplate, ctx: &GroundingContext) -> Vec<Formula> {
    use RuleTemplate::*;

    let mut out = Vec::new();
    match template {
        InteractionRequiresMainEffects => {
            let Some(dv) = ctx.dv else { return out };
            for operands in &ctx.interactions {
                let lhs = atom(Predicate::Interaction, operands.iter().copied());
                let rhs = Formula::and(operands.iter().map(|&x| atom(Predicate::MainEffect, [x, dv])));
                out.push(Formula::implies(lhs, rhs));
            }
        }
        InteractionRequiresRelationship => {
            let Some(dv) = ctx.dv else { return out };
            for operands in &ctx.interactions {
                let lhs = atom(Predicate::Interaction, operands.iter().copied());
                for &x in operands {
                    let rhs = Formula::or([
                        atom(Predicate::Cause, [x, dv]),
                        atom(Predicate::Correlate, [x, dv]),
                        atom(Predicate::Correlate, [dv, x]),
                    ]);
                    out.push(Formula::implies(lhs.clone(), rhs));
                }
            }
        }
        ExclusiveDataTypes => {
            for &x in &ctx.variables {
                let kinds: Vec<Formula> = MeasurementKind::ALL
                    .iter()
                    .map(|&kind| data_type(kind, x))
                    .collect();
                out.extend(Formula::at_most_one(&kinds));
            }
        }
        TransformRequiresNumeric => {
            for &x in &ctx.variables {
                for t in Transform::ALL {
                    out.push(Formula::implies(
                        atom(Predicate::Transform(t), [x]),
                        atom(Predicate::Numeric, [x]),
                    ));
                }
            }
        }
        ExclusiveTransforms => {
            for &x in &ctx.variables {
                let transforms: Vec<Formula> = Transform::ALL
                    .iter()
                    .map(|&t| atom(Predicate::Transform(t), [x]))
                    .collect();
                out.extend(Formula::at_most_one(&transforms));
            }
        }
        FamilyRequiresDataType => {
            let Some(dv) = ctx.dv else { return out };
            for family in Family::ALL {
                let kinds = family.data_types().iter().map(|&kind| data_type(kind, dv));
                out.push(Formula::implies(atom(Predicate::Family(family), [dv]), Formula::or(kinds)));
            }
        }
        ExclusiveFamilies => {
            let Some(dv) = ctx.dv else { return out };
            let families: Vec<Formula> = Family::ALL
                .iter()
                .map(|&f| atom(Predicate::Family(f), [dv]))
                .collect();
            out.extend(Formula::at_most_one(&families));
        }
        FamilyRequiresLink => {
            let Some(dv) = ctx.dv else { return out };
            for family in Family::ALL {
                let links = family.links().iter().map(|&l| atom(Predicate::Link(l), [dv]));
                out.push(Formula::implies(atom(Predicate::Family(family), [dv]), Formula::or(links)));
            }
        }
        LinkRequiresFamily => {
            let Some(dv) = ctx.dv else { return out };
            for link in Link::ALL {
                let families = link.families().into_iter().map(|f| atom(Predicate::Family(f), [dv]));
                out.push(Formula::implies(atom(Predicate::Link(link), [dv]), Formula::or(families)));
            }
        }
        ExclusiveLinks => {
            let Some(dv) = ctx.dv else { return out };
            let links: Vec<Formula> = Link::ALL.iter().map(|&l| atom(Predicate::Link(l), [dv])).collect();
            out.extend(Formula::at_most_one(&links));
        }
        InterceptRequiresNesting => {
            for &g in &ctx.groups {
                let nested = ctx
                    .nestings
                    .iter()
                    .filter(|&&(_, group)| group == g)
                    .map(|&(unit, group)| atom(Predicate::NestsUnder, [unit, group]));
                out.push(Formula::implies(atom(Predicate::RandomIntercept, [g]), Formula::or(nested)));
            }
        }
        SlopeRequiresMainEffect => {
            let Some(dv) = ctx.dv else { return out };
            for &(x, g) in &ctx.slopes {
                for p in [
                    Predicate::RandomSlope,
                    Predicate::CorrelatedSlopeIntercept,
                    Predicate::UncorrelatedSlopeIntercept,
                ] {
                    out.push(Formula::implies(atom(p, [x, g]), atom(Predicate::MainEffect, [x, dv])));
                }
            }
        }
        PairedSlopesExclusive => {
            for &(x, g) in &ctx.slopes {
                out.push(Formula::not(Formula::and([
                    atom(Predicate::CorrelatedSlopeIntercept, [x, g]),
                    atom(Predicate::UncorrelatedSlopeIntercept, [x, g]),
                ])));
            }
        }
        CauseExcludesCorrelate => {
            for &a in &ctx.variables {
                for &b in &ctx.variables {
                    if a == b {
                        continue;
                    }
                    out.push(Formula::implies(
                        atom(Predicate::Cause, [a, b]),
                        Formula::and([
                            Formula::not(atom(Predicate::Correlate, [a, b])),
                            Formula::not(atom(Predicate::Correlate, [b, a])),
                        ]),
                    ));
                }
            }
        }
        CauseAntisymmetric | NestingAntisymmetric => {
            let p = if template == CauseAntisymmetric {
                Predicate::Cause
            } else {
                Predicate::NestsUnder
            };
            for (i, &a) in ctx.variables.iter().enumerate() {
                for &b in &ctx.variables[i + 1..] {
                    out.push(Formula::not(Formula::and([atom(p, [a, b]), atom(p, [b, a])])));
                }
            }
        }
    }
    out
}

/// The clauses of one rule batch, ready to be added to the solver.
#[derive(Debug, Clone)]
pub struct GroundedBatch {
    pub batch: RuleBatch,
    pub clauses: Vec<Formula>,
}

pub fn ground_batch(batch: RuleBatch, templates: &[RuleTemplate], ctx: &GroundingContext) -> GroundedBatch {
    let clauses: Vec<Formula> = templates.iter().flat_map(|&t| ground(t, ctx)).collect();
    debug!("grounded {} batch into {} clauses", batch, clauses.len());
    GroundedBatch { batch, clauses }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn context() -> (ConstantBinding, GroundingContext) {
        let mut binding = ConstantBinding::new();
        for name in ["Math", "HW", "SES", "Student", "School"] {
            binding.bind(name);
        }
        let facts = vec![
            Fact::ambiguous(Predicate::Interaction, ["HW", "SES"]),
            Fact::asserted(Predicate::NestsUnder, ["Student", "School"]),
            Fact::ambiguous(Predicate::RandomIntercept, ["School"]),
            Fact::ambiguous(Predicate::CorrelatedSlopeIntercept, ["HW", "School"]),
            Fact::ambiguous(Predicate::UncorrelatedSlopeIntercept, ["HW", "School"]),
        ];
        let ctx = GroundingContext::new(&binding, &facts, Some("Math")).unwrap();
        (binding, ctx)
    }

    #[test]
    fn test_context() {
        let (binding, ctx) = context();
        assert_eq!(ctx.dv, binding.get("Math"));
        assert_eq!(ctx.interactions.len(), 1);
        assert_eq!(ctx.groups, vec![binding.get("School").unwrap()]);
        assert_eq!(ctx.slopes.len(), 1);
    }

    #[test]
    fn test_grounding_is_deterministic() {
        let (_, ctx) = context();
        for template in [
            RuleTemplate::InteractionRequiresRelationship,
            RuleTemplate::CauseExcludesCorrelate,
            RuleTemplate::LinkRequiresFamily,
        ] {
            let a: BTreeSet<Formula> = ground(template, &ctx).into_iter().collect();
            let b: BTreeSet<Formula> = ground(template, &ctx).into_iter().collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_clause_counts() {
        let (_, ctx) = context();
        // Three pairs per variable.
        assert_eq!(ground(RuleTemplate::ExclusiveDataTypes, &ctx).len(), 5 * 3);
        assert_eq!(ground(RuleTemplate::ExclusiveFamilies, &ctx).len(), 7 * 6 / 2);
        assert_eq!(ground(RuleTemplate::CauseAntisymmetric, &ctx).len(), 5 * 4 / 2);
        assert_eq!(ground(RuleTemplate::CauseExcludesCorrelate, &ctx).len(), 5 * 4);
        assert_eq!(ground(RuleTemplate::InteractionRequiresRelationship, &ctx).len(), 2);
        assert_eq!(ground(RuleTemplate::PairedSlopesExclusive, &ctx).len(), 1);
    }

    #[test]
    fn test_variance_rules_need_dv() {
        let mut binding = ConstantBinding::new();
        binding.bind("A");
        let ctx = GroundingContext::new(&binding, &[], None).unwrap();
        assert!(ground(RuleTemplate::FamilyRequiresLink, &ctx).is_empty());
        assert!(ground(RuleTemplate::InteractionRequiresMainEffects, &ctx).is_empty());
        assert_eq!(ground(RuleTemplate::ExclusiveTransforms, &ctx).len(), 1);
    }

    #[test]
    fn test_intercept_without_nesting_is_forbidden() {
        let mut binding = ConstantBinding::new();
        binding.bind("Math");
        let g = binding.bind("Classroom");
        let facts = vec![Fact::ambiguous(Predicate::RandomIntercept, ["Classroom"])];
        let ctx = GroundingContext::new(&binding, &facts, Some("Math")).unwrap();
        let clauses = ground(RuleTemplate::InterceptRequiresNesting, &ctx);
        assert_eq!(clauses.len(), 1);
        let intercept = Atom::new(Predicate::RandomIntercept, [g]);
        assert!(!clauses[0].eval(&|a: &Atom| *a == intercept));
    }
}
