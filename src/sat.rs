use std::collections::HashMap;

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::types::{Lit, Var};

impl Bdd {
    /// Returns one satisfying path of the BDD, if any exists.
    ///
    /// The low branch is preferred, so variables on the path are set to
    /// false whenever possible; variables not on the path are unconstrained.
    ///
    /// Returns `None` if the BDD represents the constant false function.
    pub fn one_sat_lazy(&self, node: Ref) -> Option<Vec<Lit>> {
        if self.is_zero(node) {
            return None;
        }

        let mut path = Vec::new();
        let mut current = node;

        while !self.is_one(current) {
            let var = Var::new(self.variable(current.id()));
            let low = self.low_node(current);
            if self.is_zero(low) {
                path.push(var.pos());
                current = self.high_node(current);
            } else {
                path.push(var.neg());
                current = low;
            }
        }

        Some(path)
    }

    /// Number of satisfying assignments over `num_vars` variables.
    ///
    /// All variables in the support of `node` must be at most `num_vars`.
    pub fn sat_count(&self, node: Ref, num_vars: usize) -> BigUint {
        let mut cache = HashMap::new();
        let max = BigUint::from(1u32) << num_vars;
        self.sat_count_(node, &max, &mut cache)
    }

    fn sat_count_(&self, node: Ref, max: &BigUint, cache: &mut HashMap<Ref, BigUint>) -> BigUint {
        if self.is_zero(node) {
            return BigUint::ZERO;
        } else if self.is_one(node) {
            return max.clone();
        }

        if let Some(count) = cache.get(&node) {
            return count.clone();
        }

        // Count the regular node, then complement if needed.
        let low = self.low(node.id());
        let high = self.high(node.id());

        let count_low = self.sat_count_(low, max, cache);
        let count_high = self.sat_count_(high, max, cache);

        let count: BigUint = (count_low + count_high) >> 1;
        let count = if node.is_negated() { max - count } else { count };

        cache.insert(node, count.clone());
        count
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn lit(x: i32) -> Lit {
        Lit::new(Var::new(x.unsigned_abs()), x > 0)
    }

    #[test]
    fn test_one_sat_lazy_prefers_low() {
        let bdd = Bdd::default();

        let f = bdd.apply_or(bdd.mk_var(1), bdd.mk_var(2));
        assert_eq!(bdd.one_sat_lazy(f), Some(vec![lit(-1), lit(2)]));
        assert_eq!(bdd.one_sat_lazy(bdd.one), Some(vec![]));
        assert_eq!(bdd.one_sat_lazy(bdd.zero), None);
    }

    #[test]
    fn test_one_sat_lazy_follows_forced_literals() {
        let bdd = Bdd::default();

        let f = bdd.apply_and_many([bdd.mk_lit(lit(1)), bdd.mk_lit(lit(-2)), bdd.mk_lit(lit(3))]);
        assert_eq!(bdd.one_sat_lazy(f), Some(vec![lit(1), lit(-2), lit(3)]));
    }

    #[test]
    fn test_sat_count_terminal() {
        let bdd = Bdd::default();

        assert_eq!(bdd.sat_count(bdd.zero, 2), BigUint::from(0u32));
        assert_eq!(bdd.sat_count(bdd.one, 3), BigUint::from(8u32));
    }

    #[test]
    fn test_sat_count_clause() {
        let bdd = Bdd::default();

        let f = bdd.apply_or(bdd.mk_var(1), bdd.mk_var(2));
        assert_eq!(bdd.sat_count(f, 2), BigUint::from(3u32));
        assert_eq!(bdd.sat_count(f, 3), BigUint::from(6u32));
        assert_eq!(bdd.sat_count(-f, 2), BigUint::from(1u32));
    }

    #[test]
    fn test_sat_count_cube() {
        let bdd = Bdd::default();

        let f = bdd.apply_and(bdd.mk_var(1), bdd.mk_var(2));
        assert_eq!(bdd.sat_count(f, 2), BigUint::from(1u32));
        assert_eq!(bdd.sat_count(f, 4), BigUint::from(4u32));
    }
}
