//! Rule knowledge base: rule templates grouped into named batches, and the
//! routing of batches to query outputs.

use std::fmt;

use crate::error::{Error, Result};

/// What a query produces.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum OutputKind {
    ConceptualGraph,
    StatisticalModel,
    DataSchema,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::ConceptualGraph => write!(f, "conceptual graph"),
            OutputKind::StatisticalModel => write!(f, "statistical model"),
            OutputKind::DataSchema => write!(f, "data schema"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RuleBatch {
    Interaction,
    DataType,
    Transformation,
    VarianceFunction,
    RandomEffects,
    GraphConsistency,
}

impl RuleBatch {
    pub fn name(self) -> &'static str {
        match self {
            RuleBatch::Interaction => "interaction",
            RuleBatch::DataType => "data-type",
            RuleBatch::Transformation => "transformation",
            RuleBatch::VarianceFunction => "variance-function",
            RuleBatch::RandomEffects => "random-effects",
            RuleBatch::GraphConsistency => "graph-consistency",
        }
    }
}

impl fmt::Display for RuleBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A universally quantified rule, grounded once the query's constants are known.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RuleTemplate {
    /// `Interaction(xs) -> MainEffect(x, dv)` for every operand `x`.
    InteractionRequiresMainEffects,
    /// `Interaction(xs) -> Cause(x, dv) | Correlate(x, dv) | Correlate(dv, x)` for every operand.
    InteractionRequiresRelationship,
    /// At most one of the data-type predicates holds for a variable.
    ExclusiveDataTypes,
    /// `Transform(t)(x) -> Numeric(x)`.
    TransformRequiresNumeric,
    ExclusiveTransforms,
    /// `Family(f)(dv) -> DataType(dv)` for one of the kinds admitted by `f`.
    FamilyRequiresDataType,
    ExclusiveFamilies,
    /// `Family(f)(dv) -> Link(l)(dv)` for one of the links admitted by `f`.
    FamilyRequiresLink,
    /// `Link(l)(dv) -> Family(f)(dv)` for one of the families admitting `l`.
    LinkRequiresFamily,
    ExclusiveLinks,
    /// `RandomIntercept(g) -> NestsUnder(u, g)` for some unit `u`.
    InterceptRequiresNesting,
    /// Any random slope on `x` requires `MainEffect(x, dv)`.
    SlopeRequiresMainEffect,
    /// Correlated and uncorrelated slope-intercept pairs exclude each other.
    PairedSlopesExclusive,
    /// `Cause(a, b) -> !Correlate(a, b) & !Correlate(b, a)`.
    CauseExcludesCorrelate,
    CauseAntisymmetric,
    NestingAntisymmetric,
}

#[derive(Debug, Clone)]
struct BatchEntry {
    batch: RuleBatch,
    templates: Vec<RuleTemplate>,
    outputs: Vec<OutputKind>,
}

/// Ordered collection of rule batches.
///
/// Batches are returned in registration order, which is the order in which
/// the solver adds them.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<BatchEntry>,
}

impl KnowledgeBase {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard rule set.
    pub fn standard() -> Self {
        use OutputKind::*;
        use RuleTemplate::*;

        let mut kb = Self::empty();
        kb.register(
            RuleBatch::Interaction,
            [InteractionRequiresMainEffects, InteractionRequiresRelationship],
        );
        kb.register(RuleBatch::DataType, [ExclusiveDataTypes]);
        kb.register(
            RuleBatch::Transformation,
            [TransformRequiresNumeric, ExclusiveTransforms],
        );
        kb.register(
            RuleBatch::VarianceFunction,
            [
                FamilyRequiresDataType,
                ExclusiveFamilies,
                FamilyRequiresLink,
                LinkRequiresFamily,
                ExclusiveLinks,
            ],
        );
        kb.register(
            RuleBatch::RandomEffects,
            [InterceptRequiresNesting, SlopeRequiresMainEffect, PairedSlopesExclusive],
        );
        kb.register(
            RuleBatch::GraphConsistency,
            [CauseExcludesCorrelate, CauseAntisymmetric, NestingAntisymmetric],
        );

        kb.route(StatisticalModel, RuleBatch::Interaction);
        kb.route(StatisticalModel, RuleBatch::DataType);
        kb.route(StatisticalModel, RuleBatch::Transformation);
        kb.route(StatisticalModel, RuleBatch::VarianceFunction);
        kb.route(StatisticalModel, RuleBatch::RandomEffects);
        kb.route(ConceptualGraph, RuleBatch::GraphConsistency);
        kb.route(DataSchema, RuleBatch::DataType);
        kb.route(DataSchema, RuleBatch::Transformation);
        kb.route(DataSchema, RuleBatch::VarianceFunction);
        kb
    }

    /// Register templates under a batch. Registering an existing batch
    /// appends to it without changing its position.
    pub fn register(&mut self, batch: RuleBatch, templates: impl IntoIterator<Item = RuleTemplate>) {
        match self.entries.iter_mut().find(|e| e.batch == batch) {
            Some(entry) => entry.templates.extend(templates),
            None => self.entries.push(BatchEntry {
                batch,
                templates: templates.into_iter().collect(),
                outputs: Vec::new(),
            }),
        }
    }

    /// Make `batch` apply to queries producing `output`.
    ///
    /// # Panics
    ///
    /// Panics if `batch` was not registered.
    pub fn route(&mut self, output: OutputKind, batch: RuleBatch) {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.batch == batch)
            .unwrap_or_else(|| panic!("Batch {} is not registered", batch));
        if !entry.outputs.contains(&output) {
            entry.outputs.push(output);
        }
    }

    /// Batches for the given output, in registration order.
    pub fn batches_for(&self, output: OutputKind) -> Result<Vec<(RuleBatch, &[RuleTemplate])>> {
        let batches: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.outputs.contains(&output))
            .map(|e| (e.batch, e.templates.as_slice()))
            .collect();
        if batches.is_empty() {
            return Err(Error::Grounding(output.to_string()));
        }
        Ok(batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_routing_order() {
        let kb = KnowledgeBase::standard();
        let names: Vec<RuleBatch> = kb
            .batches_for(OutputKind::StatisticalModel)
            .unwrap()
            .into_iter()
            .map(|(b, _)| b)
            .collect();
        assert_eq!(
            names,
            vec![
                RuleBatch::Interaction,
                RuleBatch::DataType,
                RuleBatch::Transformation,
                RuleBatch::VarianceFunction,
                RuleBatch::RandomEffects,
            ]
        );

        let graph = kb.batches_for(OutputKind::ConceptualGraph).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph[0].0, RuleBatch::GraphConsistency);
        assert_eq!(kb.batches_for(OutputKind::DataSchema).unwrap().len(), 3);
    }

    #[test]
    fn test_unrouted_output_is_an_error() {
        let mut kb = KnowledgeBase::empty();
        kb.register(RuleBatch::DataType, [RuleTemplate::ExclusiveDataTypes]);
        kb.route(OutputKind::DataSchema, RuleBatch::DataType);
        let err = kb.batches_for(OutputKind::StatisticalModel).unwrap_err();
        assert!(matches!(err, Error::Grounding(_)));
    }

    #[test]
    fn test_register_appends() {
        let mut kb = KnowledgeBase::empty();
        kb.register(RuleBatch::GraphConsistency, [RuleTemplate::CauseAntisymmetric]);
        kb.register(RuleBatch::GraphConsistency, [RuleTemplate::NestingAntisymmetric]);
        kb.route(OutputKind::ConceptualGraph, RuleBatch::GraphConsistency);
        let batches = kb.batches_for(OutputKind::ConceptualGraph).unwrap();
        assert_eq!(batches[0].1.len(), 2);
    }
}
