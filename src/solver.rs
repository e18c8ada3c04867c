//! Incremental solver context.
//!
//! Rules are conjoined into a single decision diagram as batches arrive.
//! Facts are never added as rules: they are passed to every check as
//! assumption literals, so that dropping a fact needs no retraction.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::debug;
use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::config::SolverConfig;
use crate::constants::Atom;
use crate::error::{Error, Result};
use crate::formula::Formula;
use crate::reference::Ref;
use crate::types::{Lit, Var};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SolveStatus {
    Sat,
    Unsat,
    /// The node budget was exceeded.
    Unknown,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Sat => write!(f, "SAT"),
            SolveStatus::Unsat => write!(f, "UNSAT"),
            SolveStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Truth values of every atom known to the solver.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Assignment {
    values: BTreeMap<Atom, bool>,
}

impl Assignment {
    pub fn value(&self, atom: &Atom) -> Option<bool> {
        self.values.get(atom).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn true_atoms(&self) -> impl Iterator<Item = &Atom> {
        self.values.iter().filter(|(_, &v)| v).map(|(a, _)| a)
    }
}

pub struct Solver {
    bdd: Bdd,
    vars: HashMap<Atom, Var>,
    atoms: Vec<Atom>,
    rules: Ref,
    num_clauses: usize,
}

impl fmt::Debug for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver")
            .field("atoms", &self.atoms.len())
            .field("clauses", &self.num_clauses)
            .field("bdd", &self.bdd)
            .finish()
    }
}

impl Solver {
    pub fn new(config: &SolverConfig) -> Result<Self> {
        config.validate()?;
        let bdd = Bdd::new(config.storage_bits, config.cache_bits);
        let rules = bdd.one;
        Ok(Self {
            bdd,
            vars: HashMap::new(),
            atoms: Vec::new(),
            rules,
            num_clauses: 0,
        })
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn num_clauses(&self) -> usize {
        self.num_clauses
    }

    /// Whether the conjunction of all rules so far is unsatisfiable.
    pub fn rules_are_unsat(&self) -> bool {
        self.bdd.is_zero(self.rules)
    }

    /// Decision-diagram variable of an atom, allocated on first use.
    pub fn var(&mut self, atom: &Atom) -> Var {
        if let Some(&v) = self.vars.get(atom) {
            return v;
        }
        self.atoms.push(atom.clone());
        let v = Var::new(self.atoms.len() as u32);
        self.vars.insert(atom.clone(), v);
        v
    }

    pub fn literal(&mut self, atom: &Atom, value: bool) -> Lit {
        Lit::new(self.var(atom), value)
    }

    fn encode(&mut self, formula: &Formula) -> Ref {
        match formula {
            Formula::Const(true) => self.bdd.one,
            Formula::Const(false) => self.bdd.zero,
            Formula::Atom(atom) => {
                let v = self.var(atom);
                self.bdd.mk_var(v.id())
            }
            Formula::Not(inner) => -self.encode(inner),
            Formula::And(items) => {
                let nodes: Vec<Ref> = items.iter().map(|f| self.encode(f)).collect();
                self.bdd.apply_and_many(nodes)
            }
            Formula::Or(items) => {
                let nodes: Vec<Ref> = items.iter().map(|f| self.encode(f)).collect();
                self.bdd.apply_or_many(nodes)
            }
            Formula::Implies(lhs, rhs) => {
                let lhs = self.encode(lhs);
                let rhs = self.encode(rhs);
                self.bdd.apply_imply(lhs, rhs)
            }
        }
    }

    /// Conjoin clauses to the persistent rule set.
    pub fn add_clauses(&mut self, clauses: &[Formula]) {
        for clause in clauses {
            let f = self.encode(clause);
            self.rules = self.bdd.apply_and(self.rules, f);
        }
        self.num_clauses += clauses.len();
        let (hits, misses) = self.bdd.cache_stats();
        debug!(
            "rules: {} clauses over {} atoms, {} nodes, cache {}/{} hits",
            self.num_clauses,
            self.atoms.len(),
            self.bdd.num_nodes(),
            hits,
            hits + misses
        );
    }

    /// Cofactor of the rules under the assumptions, or `None` if two
    /// assumptions contradict each other.
    fn restricted(&self, assumptions: &[Lit]) -> Option<Ref> {
        let mut values = HashMap::with_capacity(assumptions.len());
        for lit in assumptions {
            if let Some(previous) = values.insert(lit.var().id(), lit.is_positive()) {
                if previous != lit.is_positive() {
                    return None;
                }
            }
        }
        Some(self.bdd.restrict(self.rules, &values))
    }

    pub fn check(&self, assumptions: &[Lit]) -> SolveStatus {
        let status = match self.restricted(assumptions) {
            None => SolveStatus::Unsat,
            Some(f) if self.bdd.is_zero(f) => SolveStatus::Unsat,
            Some(_) => SolveStatus::Sat,
        };
        if self.bdd.is_overflowed() {
            return SolveStatus::Unknown;
        }
        status
    }

    /// A minimal subset of `assumptions` that is unsatisfiable with the rules,
    /// as positions into `assumptions`.
    ///
    /// Deletion-based: each assumption is dropped in turn and kept out if the
    /// remainder is still unsatisfiable. The result is empty iff the rules
    /// alone are unsatisfiable.
    pub fn unsat_core(&self, assumptions: &[Lit]) -> Result<Vec<usize>> {
        match self.check(assumptions) {
            SolveStatus::Unsat => {}
            SolveStatus::Sat => panic!("Assumptions are satisfiable, there is no conflict core"),
            SolveStatus::Unknown => return Err(self.indeterminate()),
        }

        let mut core: Vec<usize> = (0..assumptions.len()).collect();
        let mut i = 0;
        while i < core.len() {
            let trial: Vec<Lit> = core
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &k)| assumptions[k])
                .collect();
            match self.check(&trial) {
                SolveStatus::Unsat => {
                    core.remove(i);
                }
                SolveStatus::Sat => i += 1,
                SolveStatus::Unknown => return Err(self.indeterminate()),
            }
        }
        debug!("unsat core of size {} out of {} assumptions", core.len(), assumptions.len());
        Ok(core)
    }

    /// A satisfying assignment of the rules under the assumptions.
    ///
    /// Atoms left unconstrained are reported false.
    pub fn model(&self, assumptions: &[Lit]) -> Option<Assignment> {
        let f = self.restricted(assumptions)?;
        let path = self.bdd.one_sat_lazy(f)?;

        let mut values: BTreeMap<Atom, bool> = self.atoms.iter().map(|a| (a.clone(), false)).collect();
        for lit in assumptions.iter().chain(path.iter()) {
            let atom = &self.atoms[lit.var().id() as usize - 1];
            values.insert(atom.clone(), lit.is_positive());
        }
        Some(Assignment { values })
    }

    /// Number of assignments to all known atoms satisfying the rules and the assumptions.
    pub fn count_models(&self, assumptions: &[Lit]) -> BigUint {
        let cube = self
            .bdd
            .apply_and_many(assumptions.iter().map(|&lit| self.bdd.mk_lit(lit)));
        let f = self.bdd.apply_and(self.rules, cube);
        self.bdd.sat_count(f, self.atoms.len())
    }

    pub fn indeterminate(&self) -> Error {
        Error::SolverIndeterminate(format!(
            "node budget exceeded ({} nodes for {} atoms)",
            self.bdd.num_nodes(),
            self.atoms.len()
        ))
    }
}
