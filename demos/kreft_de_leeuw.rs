//! Kreft & de Leeuw (1989): math achievement of students nested in schools.
//!
//! Conflicts are resolved interactively on stdin unless `--auto` is given.

use std::io;

use clap::Parser;

use model_synth::config::QueryConfig;
use model_synth::design::Design;
use model_synth::effects::{self, Task};
use model_synth::graph::ConceptualGraph;
use model_synth::kb::KnowledgeBase;
use model_synth::query::Query;
use model_synth::resolve::{ConflictCore, ConflictResolver, FnResolver, PromptResolver, Resolution};
use model_synth::variable::Variable;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Largest interaction to propose.
    #[arg(long, value_name = "INT", default_value = "2")]
    max_arity: usize,

    /// Keep the first fact of every conflict instead of asking.
    #[arg(long)]
    auto: bool,

    /// Print the conceptual graph in DOT format and exit.
    #[arg(long)]
    dot: bool,

    /// Query configuration as JSON.
    #[arg(long, value_name = "JSON")]
    config: Option<String>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    let student = Variable::nominal("Student");
    let school = Variable::nominal("School");
    let math = Variable::numeric("MathAchievement");
    let hw = Variable::numeric("HomeWork");
    let race = Variable::nominal("Race");
    let ses = Variable::numeric("SES");
    let mean_ses = Variable::numeric("MeanSES");

    let mut graph = ConceptualGraph::new();
    graph.causes(&hw, &math);
    graph.associates_with(&race, &math);
    graph.associates_with(&ses, &math);
    graph.associates_with(&mean_ses, &math);
    graph.has(&student, &math);
    graph.has(&student, &hw);
    graph.has(&student, &race);
    graph.has(&student, &ses);
    graph.has(&school, &mean_ses);
    graph.nests_under(&student, &school);

    if args.dot {
        print!("{}", graph.to_dot()?);
        return Ok(());
    }

    for set in effects::generate(&graph, math.name(), Task::Explanation, None)? {
        println!("explanation candidate: {}", set);
    }

    let mut config = match &args.config {
        Some(json) => QueryConfig::from_json(json)?,
        None => QueryConfig::default(),
    };
    config.max_interaction_arity = args.max_arity;

    let design = Design::new(math.clone())
        .with_ivs([hw.clone(), race.clone()])
        .with_graph(graph);

    let kb = KnowledgeBase::standard();
    let query = Query::new(&kb).with_config(config);

    let mut resolver: Box<dyn ConflictResolver> = if args.auto {
        Box::new(FnResolver(|core: &ConflictCore| {
            if core.len() > 1 {
                Ok(Resolution::Retain(vec![0]))
            } else {
                Ok(Resolution::DiscardAll)
            }
        }))
    } else {
        Box::new(PromptResolver::new(io::stdin().lock(), io::stdout()))
    };

    let outcome = query.infer_model(&design, resolver.as_mut())?;
    println!("Resolved {} conflict(s); {} model(s) remain", outcome.rounds, outcome.model_count);
    for fact in &outcome.discarded {
        println!("discarded: {}", fact);
    }
    print!("{}", outcome.output);
    println!("{}", outcome.output.to_json()?);

    Ok(())
}
