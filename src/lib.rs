//! # model-synth: statistical models from conceptual graphs
//!
//! **`model-synth`** turns a graph of declared relationships between variables
//! (causes, associations, nesting, measurement) into a concrete statistical
//! model specification: dependent variable, main effects, interactions,
//! random effects, probability family and link function.
//!
//! ## How it works
//!
//! 1. A [`ConceptualGraph`][crate::graph::ConceptualGraph] or a
//!    [`Design`][crate::design::Design] is compiled into facts. Declared
//!    relationships become asserted facts; associations and model candidates
//!    (interactions, families, links, random effects) become ambiguous facts.
//! 2. The rules of a [`KnowledgeBase`][crate::kb::KnowledgeBase] are grounded
//!    over the variables of the query.
//! 3. Rule batches are added one by one to a solver context, a reduced
//!    ordered binary decision diagram ([`Bdd`][crate::bdd::Bdd]). After every
//!    batch the facts are checked; a conflict is reduced to a minimal core and
//!    handed to a [`ConflictResolver`][crate::resolve::ConflictResolver],
//!    which decides which facts survive.
//! 4. The true facts of the final model are cast into the requested output.
//!
//! ## Basic Usage
//!
//! ```rust
//! use model_synth::graph::{ConceptualGraph, RelationshipKind};
//! use model_synth::kb::KnowledgeBase;
//! use model_synth::query::Query;
//! use model_synth::resolve::ScriptedResolver;
//! use model_synth::variable::Variable;
//!
//! let hw = Variable::numeric("HW");
//! let math = Variable::numeric("Math");
//! let race = Variable::nominal("Race");
//!
//! let mut graph = ConceptualGraph::new();
//! graph.causes(&hw, &math);
//! graph.associates_with(&race, &math);
//!
//! let kb = KnowledgeBase::standard();
//! let mut resolver = ScriptedResolver::default();
//! let outcome = Query::new(&kb).infer_graph(&graph, &mut resolver).unwrap();
//! assert!(outcome.output.has_edge(RelationshipKind::AssociatesWith, "Race", "Math"));
//! ```
//!
//! ## Core Components
//!
//! - **[`compile`]**, **[`ground`]**, **[`solve`]**, **[`cast`]**: the pipeline stages, tied together by [`query`].
//! - **[`bdd`]**, **[`sat`]**: the decision-diagram engine used as the solver context.
//! - **[`resolve`]**: conflict resolution strategies (scripted, closure, prompt, channel).
//! - **[`effects`]**: enumeration of candidate main-effect sets.

pub mod bdd;
pub mod cache;
pub mod cast;
pub mod compile;
pub mod config;
pub mod constants;
pub mod data;
pub mod design;
pub mod dot;
pub mod effects;
pub mod error;
pub mod fact;
pub mod family;
pub mod formula;
pub mod graph;
pub mod ground;
pub mod kb;
pub mod model;
pub mod query;
pub mod reference;
pub mod resolve;
pub mod sat;
pub mod schema;
pub mod solve;
pub mod solver;
pub mod storage;
pub mod types;
pub mod utils;
pub mod variable;
