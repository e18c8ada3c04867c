//! Quantifier-free formulas over atoms, as produced by rule grounding.

use std::collections::BTreeSet;

use crate::constants::Atom;

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Formula {
    Const(bool),
    Atom(Atom),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn atom(atom: Atom) -> Self {
        Formula::Atom(atom)
    }

    pub fn not(value: Self) -> Self {
        match value {
            Formula::Const(b) => Formula::Const(!b),
            Formula::Not(inner) => *inner,
            _ => Formula::Not(Box::new(value)),
        }
    }

    /// Conjunction; the empty conjunction is true.
    pub fn and(items: impl IntoIterator<Item = Formula>) -> Self {
        let mut items: Vec<Formula> = items.into_iter().collect();
        match items.len() {
            0 => Formula::Const(true),
            1 => items.remove(0),
            _ => Formula::And(items),
        }
    }

    /// Disjunction; the empty disjunction is false.
    pub fn or(items: impl IntoIterator<Item = Formula>) -> Self {
        let mut items: Vec<Formula> = items.into_iter().collect();
        match items.len() {
            0 => Formula::Const(false),
            1 => items.remove(0),
            _ => Formula::Or(items),
        }
    }

    pub fn implies(lhs: Self, rhs: Self) -> Self {
        Formula::Implies(Box::new(lhs), Box::new(rhs))
    }

    /// Pairwise exclusion: at most one of `items` holds.
    pub fn at_most_one(items: &[Formula]) -> Vec<Formula> {
        let mut clauses = Vec::new();
        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                clauses.push(Formula::not(Formula::and([a.clone(), b.clone()])));
            }
        }
        clauses
    }

    /// Collect all atoms occurring in the formula.
    pub fn atoms(&self) -> BTreeSet<&Atom> {
        let mut out = BTreeSet::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms<'a>(&'a self, out: &mut BTreeSet<&'a Atom>) {
        match self {
            Formula::Const(_) => {}
            Formula::Atom(a) => {
                out.insert(a);
            }
            Formula::Not(inner) => inner.collect_atoms(out),
            Formula::And(items) | Formula::Or(items) => {
                for item in items {
                    item.collect_atoms(out);
                }
            }
            Formula::Implies(lhs, rhs) => {
                lhs.collect_atoms(out);
                rhs.collect_atoms(out);
            }
        }
    }

    /// Evaluate under a total valuation of atoms.
    pub fn eval(&self, value: &impl Fn(&Atom) -> bool) -> bool {
        match self {
            Formula::Const(b) => *b,
            Formula::Atom(a) => value(a),
            Formula::Not(inner) => !inner.eval(value),
            Formula::And(items) => items.iter().all(|f| f.eval(value)),
            Formula::Or(items) => items.iter().any(|f| f.eval(value)),
            Formula::Implies(lhs, rhs) => !lhs.eval(value) || rhs.eval(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ConstantBinding;
    use crate::fact::Predicate;

    fn atoms() -> (Formula, Formula) {
        let mut binding = ConstantBinding::new();
        let x = binding.bind("X");
        let y = binding.bind("Y");
        (
            Formula::atom(Atom::new(Predicate::Cause, [x, y])),
            Formula::atom(Atom::new(Predicate::Correlate, [x, y])),
        )
    }

    #[test]
    fn test_double_negation() {
        let (a, _) = atoms();
        assert_eq!(Formula::not(Formula::not(a.clone())), a);
        assert_eq!(Formula::not(Formula::Const(true)), Formula::Const(false));
    }

    #[test]
    fn test_empty_connectives() {
        assert_eq!(Formula::and(Vec::<Formula>::new()), Formula::Const(true));
        assert_eq!(Formula::or(Vec::<Formula>::new()), Formula::Const(false));
        let (a, _) = atoms();
        assert_eq!(Formula::or([a.clone()]), a);
    }

    #[test]
    fn test_at_most_one() {
        let (a, b) = atoms();
        let clauses = Formula::at_most_one(&[a.clone(), b.clone()]);
        assert_eq!(clauses.len(), 1);
        let both = |_: &Atom| true;
        assert!(!clauses[0].eval(&both));
        let only_a = |atom: &Atom| atom.predicate == Predicate::Cause;
        assert!(clauses[0].eval(&only_a));
    }

    #[test]
    fn test_atoms() {
        let (a, b) = atoms();
        let f = Formula::implies(a, Formula::not(b));
        assert_eq!(f.atoms().len(), 2);
    }
}
