use test_log::test;

use model_synth::data::{InMemoryDataset, ModelData};
use model_synth::design::{Design, Transform};
use model_synth::effects::{self, Task};
use model_synth::error::Result;
use model_synth::fact::{Fact, Predicate};
use model_synth::family::{Family, Link};
use model_synth::graph::{ConceptualGraph, RelationshipKind};
use model_synth::kb::KnowledgeBase;
use model_synth::model::RandomEffect;
use model_synth::query::Query;
use model_synth::resolve::{ConflictCore, FnResolver, Resolution, ScriptedResolver};
use model_synth::variable::{MeasurementKind, Variable};

struct School {
    student: Variable,
    school: Variable,
    math: Variable,
    hw: Variable,
    race: Variable,
    ses: Variable,
}

impl School {
    fn new() -> Self {
        Self {
            student: Variable::nominal("Student"),
            school: Variable::nominal("School"),
            math: Variable::numeric("Math"),
            hw: Variable::numeric("HW"),
            race: Variable::nominal("Race"),
            ses: Variable::numeric("SES"),
        }
    }

    fn conceptual(&self) -> ConceptualGraph {
        let mut graph = ConceptualGraph::new();
        graph.causes(&self.hw, &self.math);
        graph.associates_with(&self.race, &self.math);
        graph.associates_with(&self.ses, &self.math);
        graph
    }

    fn multilevel(&self) -> ConceptualGraph {
        let mut graph = self.conceptual();
        graph.has(&self.student, &self.math);
        graph.has(&self.student, &self.hw);
        graph.nests_under(&self.student, &self.school);
        graph
    }
}

/// Keeps every fact except candidate families, links and slope pairings
/// that are not in `preferred`.
fn preferring(preferred: &'static [&'static str]) -> FnResolver<impl FnMut(&ConflictCore) -> Result<Resolution>> {
    FnResolver(move |core: &ConflictCore| {
        let keep: Vec<usize> = core
            .facts()
            .iter()
            .enumerate()
            .filter(|(_, f)| {
                let contested = f.is_ambiguous()
                    && matches!(
                        f.predicate(),
                        Predicate::Family(_)
                            | Predicate::Link(_)
                            | Predicate::CorrelatedSlopeIntercept
                            | Predicate::UncorrelatedSlopeIntercept
                    );
                !contested || preferred.contains(&f.proposition().as_str())
            })
            .map(|(i, _)| i)
            .collect();
        if keep.is_empty() {
            Ok(Resolution::DiscardAll)
        } else {
            Ok(Resolution::Retain(keep))
        }
    })
}

#[test]
fn test_graph_query() {
    let s = School::new();
    let graph = s.conceptual();
    let kb = KnowledgeBase::standard();
    let mut resolver = ScriptedResolver::default();

    let outcome = Query::new(&kb).infer_graph(&graph, &mut resolver).unwrap();

    assert_eq!(outcome.rounds, 0);
    assert!(resolver.seen().is_empty());
    let out = &outcome.output;
    assert!(out.has_edge(RelationshipKind::Causes, "HW", "Math"));
    assert!(out.has_edge(RelationshipKind::AssociatesWith, "Race", "Math"));
    assert!(out.has_edge(RelationshipKind::AssociatesWith, "SES", "Math"));
    assert_eq!(out.num_edges(), 3);
    assert!(outcome.facts.iter().all(Fact::is_true));
}

#[test]
fn test_graph_casting_is_sound() {
    let s = School::new();
    let mut graph = s.multilevel();
    graph.causes(&s.math, &s.hw);
    let kb = KnowledgeBase::standard();
    let mut resolver = ScriptedResolver::new([Resolution::Retain(vec![0])]);

    let outcome = Query::new(&kb).infer_graph(&graph, &mut resolver).unwrap();

    for fact in &outcome.facts {
        let args = fact.args();
        let kind = match fact.predicate() {
            Predicate::Cause => RelationshipKind::Causes,
            Predicate::Correlate => RelationshipKind::AssociatesWith,
            Predicate::Has => RelationshipKind::Has,
            Predicate::NestsUnder => RelationshipKind::NestsUnder,
            other => panic!("unexpected predicate {}", other),
        };
        assert_eq!(
            outcome.output.has_edge(kind, &args[0], &args[1]),
            fact.is_true(),
            "{}",
            fact
        );
    }
    assert_eq!(outcome.rounds, 1);
    assert_eq!(outcome.discarded.len(), 1);
}

#[test]
fn test_data_type_conflict() {
    let s = School::new();
    let design = Design::new(s.math.clone())
        .with_ivs([s.race.clone()])
        .with_transform(&s.race, Transform::Log);
    let kb = KnowledgeBase::standard();
    let mut resolver = ScriptedResolver::new([Resolution::Retain(vec![0])]);

    let outcome = Query::new(&kb).infer_schema(&design, &mut resolver).unwrap();

    let nominal = Fact::asserted(Predicate::Nominal, ["Race"]);
    let log = Fact::asserted(Predicate::Transform(Transform::Log), ["Race"]);
    assert_eq!(resolver.seen().len(), 1);
    assert_eq!(resolver.seen()[0].facts(), &[nominal.clone(), log.clone()]);
    assert_eq!(outcome.discarded, vec![log.clone()]);

    let settled = |fact: &Fact| {
        outcome
            .facts
            .iter()
            .find(|f| f.same_proposition(fact))
            .and_then(|f| f.value())
    };
    assert_eq!(settled(&nominal), Some(true));
    assert_eq!(settled(&log), Some(false));

    let race = outcome.output.column("Race").unwrap();
    assert_eq!(race.kind, MeasurementKind::Nominal);
    assert_eq!(race.transform, None);
    assert_eq!(outcome.output.column("Math").unwrap().kind, MeasurementKind::Numeric);
}

#[test]
fn test_model_query() {
    let s = School::new();
    let design = Design::new(s.math.clone())
        .with_ivs([s.hw.clone(), s.race.clone()])
        .with_graph(s.multilevel())
        .with_dataset("kreft_de_leeuw.csv");
    let kb = KnowledgeBase::standard();
    let mut resolver = preferring(&[
        "GaussianFamily(Math)",
        "IdentityLink(Math)",
        "CorrelatedSlopeIntercept(HW, School)",
    ]);

    let outcome = Query::new(&kb).infer_model(&design, &mut resolver).unwrap();
    let spec = &outcome.output;

    assert_eq!(spec.dv, "Math");
    assert_eq!(spec.main_effects, vec!["HW", "Race"]);
    assert_eq!(spec.interactions, vec![vec!["HW".to_string(), "Race".to_string()]]);
    assert_eq!(spec.family, Some(Family::Gaussian));
    assert_eq!(spec.link, Some(Link::Identity));
    assert_eq!(
        spec.random_effects,
        vec![
            RandomEffect::intercept("School"),
            RandomEffect::correlated("HW", "School", &spec.main_effects).unwrap(),
        ]
    );
    assert_eq!(spec.dataset.as_deref(), Some("kreft_de_leeuw.csv"));

    // Every round drops at least one contested fact.
    let contested = outcome.facts.iter().filter(|f| f.is_ambiguous()).count();
    assert!(outcome.rounds >= 1);
    assert!(outcome.rounds <= contested);
    assert!(outcome.discarded.iter().all(|f| !f.is_true()));

    let json = spec.to_json().unwrap();
    assert!(json.contains("\"family\": \"Gaussian\""));

    let data = InMemoryDataset::new()
        .with_numeric("Math", [52.0, 61.0, 48.0, 70.0])
        .with_numeric("HW", [1.0, 3.0, 0.0, 5.0])
        .with_categorical("Race", ["White", "Black", "Asian", "White"])
        .with_categorical("School", ["A", "A", "B", "B"]);
    let model_data = ModelData::assemble(spec, &design.registry(), &data).unwrap();
    assert_eq!(model_data.rows, 4);
    assert_eq!(model_data.columns.len(), 4);
}

#[test]
fn test_interaction_needs_declared_relationship() {
    let s = School::new();
    let mut graph = ConceptualGraph::new();
    graph.causes(&s.hw, &s.math);
    graph.add_variable(s.ses.clone());
    let design = Design::new(s.math.clone())
        .with_ivs([s.hw.clone(), s.ses.clone()])
        .with_graph(graph);
    let kb = KnowledgeBase::standard();
    let preferred = ["GaussianFamily(Math)", "IdentityLink(Math)"];
    let mut cores = Vec::new();
    let mut resolver = FnResolver(|core: &ConflictCore| {
        cores.push(core.clone());
        let keep: Vec<usize> = core
            .facts()
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_ambiguous() || preferred.contains(&f.proposition().as_str()))
            .map(|(i, _)| i)
            .collect();
        if keep.is_empty() {
            Ok(Resolution::DiscardAll)
        } else {
            Ok(Resolution::Retain(keep))
        }
    });

    let outcome = Query::new(&kb).infer_model(&design, &mut resolver).unwrap();

    let interaction = Fact::ambiguous(Predicate::Interaction, ["HW", "SES"]);
    assert!(outcome.output.interactions.is_empty());
    assert!(outcome.discarded.contains(&interaction));
    assert_eq!(outcome.output.main_effects, vec!["HW", "SES"]);
    assert_eq!(outcome.output.family, Some(Family::Gaussian));

    let first = &cores[0];
    assert!(first.position(&interaction.proposition()).is_some());
    assert!(first.facts().contains(&Fact::negated(Predicate::Cause, ["SES", "Math"])));
    assert_eq!(first.len(), 4);
}

#[test]
fn test_model_query_needs_decisions() {
    let s = School::new();
    let design = Design::new(s.math.clone()).with_ivs([s.hw.clone()]);
    let kb = KnowledgeBase::standard();
    let mut resolver = ScriptedResolver::default();

    let err = Query::new(&kb).infer_model(&design, &mut resolver).unwrap_err();
    assert!(matches!(err, model_synth::error::Error::Cancelled(_)));
    assert_eq!(resolver.seen().len(), 1);
}

#[test]
fn test_effects_sets() {
    let s = School::new();
    let graph = s.conceptual();

    let explain = effects::generate(&graph, "Math", Task::Explanation, None).unwrap();
    let explain: Vec<Vec<String>> = explain.into_iter().map(|e| e.main_effects).collect();
    assert_eq!(explain, vec![vec!["HW".to_string()]]);

    let predict = effects::generate(&graph, "Math", Task::Prediction, None).unwrap();
    let predict: Vec<String> = predict.iter().map(|e| e.main_effects.join("+")).collect();
    assert_eq!(
        predict,
        vec!["HW", "Race", "SES", "HW+Race", "HW+SES", "Race+SES", "HW+Race+SES"]
    );
}
