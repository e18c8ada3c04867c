//! Query pipeline: compile, bind, ground, solve, cast.

use log::info;
use num_bigint::BigUint;

use crate::cast::{cast, CastTarget};
use crate::compile::Compile;
use crate::config::QueryConfig;
use crate::constants::ConstantBinding;
use crate::design::Design;
use crate::error::Result;
use crate::fact::Fact;
use crate::graph::ConceptualGraph;
use crate::ground::{ground_batch, GroundedBatch, GroundingContext};
use crate::kb::{KnowledgeBase, OutputKind};
use crate::model::StatisticalModelSpec;
use crate::resolve::ConflictResolver;
use crate::schema::DataSchema;
use crate::solve::solve;
use crate::solver::Solver;

#[derive(Debug, Clone)]
pub struct QueryOutcome<T> {
    pub output: T,
    /// Every compiled fact with its final truth value.
    pub facts: Vec<Fact>,
    pub discarded: Vec<Fact>,
    pub rounds: usize,
    pub model_count: BigUint,
}

/// Runs queries against a knowledge base.
///
/// Each query gets its own solver context and constant binding; nothing is
/// shared between queries except the knowledge base and the configuration.
#[derive(Debug, Clone)]
pub struct Query<'kb> {
    kb: &'kb KnowledgeBase,
    config: QueryConfig,
}

impl<'kb> Query<'kb> {
    pub fn new(kb: &'kb KnowledgeBase) -> Self {
        Self {
            kb,
            config: QueryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Settle the ambiguous relationships of a graph.
    pub fn infer_graph(
        &self,
        graph: &ConceptualGraph,
        resolver: &mut dyn ConflictResolver,
    ) -> Result<QueryOutcome<ConceptualGraph>> {
        self.run(graph, OutputKind::ConceptualGraph, graph.empty_like(), resolver)
    }

    pub fn infer_model(
        &self,
        design: &Design,
        resolver: &mut dyn ConflictResolver,
    ) -> Result<QueryOutcome<StatisticalModelSpec>> {
        let mut spec = StatisticalModelSpec::new(design.dv().name());
        spec.dataset = design.dataset().map(String::from);
        self.run(design, OutputKind::StatisticalModel, spec, resolver)
    }

    pub fn infer_schema(&self, design: &Design, resolver: &mut dyn ConflictResolver) -> Result<QueryOutcome<DataSchema>> {
        self.run(design, OutputKind::DataSchema, DataSchema::new(), resolver)
    }

    /// Run the full pipeline for `input`, casting the result into `output`.
    pub fn run<I, T>(
        &self,
        input: &I,
        kind: OutputKind,
        mut output: T,
        resolver: &mut dyn ConflictResolver,
    ) -> Result<QueryOutcome<T>>
    where
        I: Compile + ?Sized,
        T: CastTarget,
    {
        let templates = self.kb.batches_for(kind)?;
        let registry = input.registry();
        let compiled = input.compile(kind, &self.config)?;
        info!(
            "Query for {}: {} asserted and {} ambiguous facts over {} variables",
            kind,
            compiled.asserted.len(),
            compiled.ambiguous.len(),
            registry.len()
        );
        let facts = compiled.into_facts();

        let mut binding = ConstantBinding::new();
        for name in registry.names() {
            binding.bind(name);
        }
        let ctx = GroundingContext::new(&binding, &facts, input.dependent())?;
        let batches: Vec<GroundedBatch> = templates
            .iter()
            .map(|&(batch, templates)| ground_batch(batch, templates, &ctx))
            .collect();

        let mut solver = Solver::new(&self.config.solver)?;
        let solution = solve(&mut solver, &binding, &facts, &batches, resolver)?;
        cast(&mut output, &solution.facts, &registry)?;

        Ok(QueryOutcome {
            output,
            facts: solution.facts,
            discarded: solution.discarded,
            rounds: solution.rounds,
            model_count: solution.model_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::config::SolverConfig;
    use crate::error::Error;
    use crate::graph::RelationshipKind;
    use crate::kb::{RuleBatch, RuleTemplate};
    use crate::resolve::{Resolution, ScriptedResolver};
    use crate::variable::Variable;

    #[test]
    fn test_infer_graph_without_conflicts() {
        let hw = Variable::numeric("HW");
        let math = Variable::numeric("Math");
        let race = Variable::nominal("Race");
        let mut graph = ConceptualGraph::new();
        graph.causes(&hw, &math);
        graph.associates_with(&race, &math);

        let kb = KnowledgeBase::standard();
        let mut resolver = ScriptedResolver::default();
        let outcome = Query::new(&kb).infer_graph(&graph, &mut resolver).unwrap();
        assert_eq!(outcome.rounds, 0);
        assert_eq!(outcome.output, graph);
    }

    #[test]
    fn test_cause_cycle_is_resolved() {
        let a = Variable::numeric("A");
        let b = Variable::numeric("B");
        let mut graph = ConceptualGraph::new();
        graph.causes(&a, &b);
        graph.causes(&b, &a);

        let kb = KnowledgeBase::standard();
        let mut resolver = ScriptedResolver::new([Resolution::Retain(vec![0])]);
        let outcome = Query::new(&kb).infer_graph(&graph, &mut resolver).unwrap();
        assert_eq!(outcome.rounds, 1);
        assert!(outcome.output.has_edge(RelationshipKind::Causes, "A", "B"));
        assert!(!outcome.output.has_edge(RelationshipKind::Causes, "B", "A"));
    }

    #[test]
    fn test_missing_batches() {
        let mut kb = KnowledgeBase::empty();
        kb.register(RuleBatch::DataType, [RuleTemplate::ExclusiveDataTypes]);
        let mut resolver = ScriptedResolver::default();
        let err = Query::new(&kb)
            .infer_graph(&ConceptualGraph::new(), &mut resolver)
            .unwrap_err();
        assert!(matches!(err, Error::Grounding(_)));
    }

    #[test]
    fn test_oversized_solver_config() {
        let math = Variable::numeric("Math");
        let design = Design::new(math);
        let config = QueryConfig {
            solver: SolverConfig {
                storage_bits: 40,
                cache_bits: 16,
            },
            ..QueryConfig::default()
        };

        let kb = KnowledgeBase::standard();
        let mut resolver = ScriptedResolver::default();
        let err = Query::new(&kb)
            .with_config(config)
            .infer_schema(&design, &mut resolver)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
