//! The incremental solve loop: add rule batches, check the facts, and ask
//! the resolver to settle every conflict.

use log::{debug, info, warn};
use num_bigint::BigUint;

use crate::constants::{Atom, ConstantBinding};
use crate::error::{Error, Result};
use crate::fact::Fact;
use crate::ground::GroundedBatch;
use crate::resolve::{ConflictCore, ConflictResolver};
use crate::solver::{Assignment, SolveStatus, Solver};
use crate::types::Lit;

#[derive(Debug, Clone)]
pub struct Solution {
    pub assignment: Assignment,
    /// Every input fact, with the truth value it has in the final model.
    pub facts: Vec<Fact>,
    /// Facts dropped while resolving conflicts, in the order they were dropped.
    pub discarded: Vec<Fact>,
    /// Number of conflicts presented to the resolver.
    pub rounds: usize,
    /// Number of models of the final constraints over all solver atoms.
    pub model_count: BigUint,
}

struct Checked<'a> {
    facts: &'a [Fact],
    atoms: Vec<Atom>,
    active: Vec<bool>,
}

impl Checked<'_> {
    fn live(&self) -> Vec<usize> {
        (0..self.facts.len()).filter(|&i| self.active[i]).collect()
    }

    fn literals(&self, solver: &mut Solver, live: &[usize]) -> Vec<Lit> {
        live.iter()
            .map(|&i| solver.literal(&self.atoms[i], self.facts[i].assumed_value()))
            .collect()
    }
}

/// Add `batches` to `solver` in order, checking `facts` after each one.
///
/// On a conflict, the minimal core is handed to `resolver` and the facts it
/// gives up are no longer assumed. Every round drops at least one fact, so
/// the loop ends after at most `facts.len()` conflicts.
pub fn solve(
    solver: &mut Solver,
    binding: &ConstantBinding,
    facts: &[Fact],
    batches: &[GroundedBatch],
    resolver: &mut dyn ConflictResolver,
) -> Result<Solution> {
    let mut checked = Checked {
        facts,
        atoms: facts.iter().map(|f| binding.atom(f)).collect::<Result<_>>()?,
        active: vec![true; facts.len()],
    };
    let mut discarded = Vec::new();
    let mut last_core: Vec<Fact> = Vec::new();
    let mut rounds = 0;

    for batch in batches {
        info!("Adding {} rules ({} clauses)", batch.batch, batch.clauses.len());
        solver.add_clauses(&batch.clauses);

        loop {
            let live = checked.live();
            let lits = checked.literals(solver, &live);
            match solver.check(&lits) {
                SolveStatus::Sat => break,
                SolveStatus::Unknown => return Err(solver.indeterminate()),
                SolveStatus::Unsat => {}
            }

            let positions: Vec<usize> = solver.unsat_core(&lits)?.into_iter().map(|p| live[p]).collect();
            if positions.is_empty() {
                return Err(Error::Unsatisfiable { core: last_core });
            }
            let core = ConflictCore::new(positions.iter().map(|&i| facts[i].clone()).collect());
            rounds += 1;
            debug!("conflict #{} after {} rules:\n{}", rounds, batch.batch, core);

            let resolution = resolver.resolve(&core)?;
            for p in resolution.discarded(&core)? {
                let i = positions[p];
                warn!("Discarding {}", facts[i]);
                checked.active[i] = false;
                discarded.push(facts[i].clone());
            }
            last_core = core.facts().to_vec();
        }
    }

    let live = checked.live();
    let lits = checked.literals(solver, &live);
    let assignment = solver
        .model(&lits)
        .ok_or_else(|| Error::Unsatisfiable { core: last_core.clone() })?;
    let model_count = solver.count_models(&lits);
    info!("Solved in {} conflict round(s); {} models remain", rounds, model_count);

    let resolved = facts
        .iter()
        .zip(&checked.atoms)
        .map(|(fact, atom)| fact.resolved(assignment.value(atom).unwrap_or(false)))
        .collect();

    Ok(Solution {
        assignment,
        facts: resolved,
        discarded,
        rounds,
        model_count,
    })
}
