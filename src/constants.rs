//! Per-query binding between variable names and solver constants.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::fact::{Fact, Predicate};

/// Solver-internal symbolic constant standing for one variable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Constant(u32);

impl Constant {
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A predicate applied to constants: the unit the solver assigns truth to.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Atom {
    pub predicate: Predicate,
    pub args: Vec<Constant>,
}

impl Atom {
    pub fn new(predicate: Predicate, args: impl IntoIterator<Item = Constant>) -> Self {
        Self {
            predicate,
            args: args.into_iter().collect(),
        }
    }
}

/// Bijective mapping between variable names and constants.
///
/// Constants are handed out in binding order and stay stable for the
/// lifetime of the binding.
#[derive(Debug, Clone, Default)]
pub struct ConstantBinding {
    by_name: BTreeMap<String, Constant>,
    names: Vec<String>,
}

impl ConstantBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a name, returning the existing constant if already bound.
    pub fn bind(&mut self, name: &str) -> Constant {
        if let Some(&c) = self.by_name.get(name) {
            return c;
        }
        let c = Constant(self.names.len() as u32);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), c);
        c
    }

    pub fn get(&self, name: &str) -> Option<Constant> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, c: Constant) -> &str {
        &self.names[c.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All constants in binding order.
    pub fn constants(&self) -> impl Iterator<Item = Constant> {
        (0..self.names.len() as u32).map(Constant)
    }

    /// The atom a fact speaks about.
    pub fn atom(&self, fact: &Fact) -> Result<Atom> {
        let args = fact
            .args()
            .iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| Error::Compilation(format!("no constant bound for '{}' in {}", name, fact)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Atom::new(fact.predicate(), args))
    }

    pub fn display_atom(&self, atom: &Atom) -> String {
        let args: Vec<&str> = atom.args.iter().map(|&c| self.name(c)).collect();
        format!("{}({})", atom.predicate, args.join(", "))
    }
}
