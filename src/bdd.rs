//! Reduced ordered binary decision diagrams with complement edges.
//!
//! The [`Bdd`] manager is the solver context of a query: every grounded
//! rule and every fact assumption is a boolean function over atom
//! variables, and satisfiability is a comparison against the zero terminal.
//!
//! Canonicity is maintained by [`Bdd::mk_node`]: high edges are never
//! complemented, and nodes with equal children collapse.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Debug;

use log::debug;

use crate::cache::Cache;
use crate::reference::Ref;
use crate::storage::{Node, Storage};
use crate::types::Lit;
use crate::utils::{pairing3, MyHash};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct IteKey(Ref, Ref, Ref);

impl MyHash for IteKey {
    fn hash(&self) -> u64 {
        pairing3(
            self.0.unsigned() as u64,
            self.1.unsigned() as u64,
            self.2.unsigned() as u64,
        )
    }
}

pub struct Bdd {
    storage: RefCell<Storage>,
    cache: RefCell<Cache<IteKey, Ref>>,
    overflowed: Cell<bool>,
    pub zero: Ref,
    pub one: Ref,
}

impl Bdd {
    pub fn new(storage_bits: usize, cache_bits: usize) -> Self {
        assert!(
            storage_bits <= 31,
            "Storage bits should be in the range 0..=31"
        );

        let one = Ref::positive(1);
        Self {
            storage: RefCell::new(Storage::new(storage_bits)),
            cache: RefCell::new(Cache::new(cache_bits.min(storage_bits))),
            overflowed: Cell::new(false),
            zero: -one,
            one,
        }
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new(20, 16)
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.borrow();
        f.debug_struct("Bdd")
            .field("capacity", &storage.capacity())
            .field("size", &storage.size())
            .field("cache", &self.cache_stats())
            .finish()
    }
}

impl Bdd {
    fn node(&self, index: u32) -> Node {
        *self.storage.borrow().node(index)
    }

    /// Variable labelling the node, `0` for the terminal.
    pub fn variable(&self, index: u32) -> u32 {
        self.node(index).variable
    }
    pub fn low(&self, index: u32) -> Ref {
        self.node(index).low
    }
    pub fn high(&self, index: u32) -> Ref {
        self.node(index).high
    }

    pub fn low_node(&self, node: Ref) -> Ref {
        let low = self.low(node.id());
        if node.is_negated() {
            -low
        } else {
            low
        }
    }
    pub fn high_node(&self, node: Ref) -> Ref {
        let high = self.high(node.id());
        if node.is_negated() {
            -high
        } else {
            high
        }
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == self.zero
    }
    pub fn is_one(&self, node: Ref) -> bool {
        node == self.one
    }
    pub fn is_terminal(&self, node: Ref) -> bool {
        node.id() == 1
    }

    /// Number of allocated nodes.
    pub fn num_nodes(&self) -> usize {
        self.storage.borrow().size()
    }

    /// Hits and misses of the ITE cache.
    pub fn cache_stats(&self) -> (usize, usize) {
        let cache = self.cache.borrow();
        (cache.hits(), cache.misses())
    }

    /// Whether the node budget was exceeded at any point.
    ///
    /// Results computed after an overflow are still correct, but the caller
    /// asked not to go that far, so solving treats this as indeterminate.
    pub fn is_overflowed(&self) -> bool {
        self.overflowed.get()
    }

    pub fn mk_node(&self, v: u32, low: Ref, high: Ref) -> Ref {
        assert_ne!(v, 0, "Variable index should not be zero");

        // Handle canonicity
        if high.is_negated() {
            return -self.mk_node(v, -low, -high);
        }

        // Handle duplicates
        if low == high {
            return low;
        }

        let mut storage = self.storage.borrow_mut();
        let i = storage.put(Node {
            variable: v,
            low,
            high,
        });
        if storage.is_overflowed() && !self.overflowed.get() {
            debug!("mk: node budget of {} exceeded", storage.capacity());
            self.overflowed.set(true);
        }
        Ref::positive(i)
    }

    pub fn mk_var(&self, v: u32) -> Ref {
        assert_ne!(v, 0, "Variable index should not be zero");
        self.mk_node(v, self.zero, self.one)
    }

    pub fn mk_lit(&self, lit: Lit) -> Ref {
        let x = self.mk_var(lit.var().id());
        if lit.is_positive() {
            x
        } else {
            -x
        }
    }

    pub fn top_cofactors(&self, node: Ref, v: u32) -> (Ref, Ref) {
        assert_ne!(v, 0, "Variable index should not be zero");

        if self.is_terminal(node) || v < self.variable(node.id()) {
            return (node, node);
        }
        assert_eq!(v, self.variable(node.id()));
        (self.low_node(node), self.high_node(node))
    }

    /// Apply the ITE operation to the arguments.
    ///
    /// ```text
    /// ITE(x, y, z) = (x ∧ y) ∨ (¬x ∧ z)
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use model_synth::bdd::Bdd;
    ///
    /// let bdd = Bdd::default();
    /// let x = bdd.mk_var(1);
    /// let y = bdd.mk_var(2);
    /// let z = bdd.mk_var(3);
    /// let f = bdd.apply_ite(x, y, z);
    /// let x_and_y = bdd.apply_and(x, y);
    /// let not_x_and_z = bdd.apply_and(-x, z);
    /// assert_eq!(f, bdd.apply_or(x_and_y, not_x_and_z));
    /// ```
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> Ref {
        // Base cases:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        if self.is_one(f) {
            return g;
        }
        if self.is_zero(f) {
            return h;
        }

        // Standard triples:
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,~F,H) => ite(F,0,H)
        //   ite(F,G,F) => ite(F,G,0)
        //   ite(F,G,~F) => ite(F,G,1)
        let g = if g == f {
            self.one
        } else if g == -f {
            self.zero
        } else {
            g
        };
        let h = if h == f {
            self.zero
        } else if h == -f {
            self.one
        } else {
            h
        };

        //   ite(F,G,G) => G
        //   ite(F,1,0) => F
        //   ite(F,0,1) => ~F
        if g == h {
            return g;
        }
        if self.is_one(g) && self.is_zero(h) {
            return f;
        }
        if self.is_zero(g) && self.is_one(h) {
            return -f;
        }

        // ite(~F,G,H) => ite(F,H,G)
        let (f, g, h) = if f.is_negated() { (-f, h, g) } else { (f, g, h) };

        // ite(F,~G,H) => ~ite(F,G,~H)
        let (g, h, n) = if g.is_negated() {
            (-g, -h, true)
        } else {
            (g, h, false)
        };

        let key = IteKey(f, g, h);
        if let Some(&res) = self.cache.borrow().get(&key) {
            return if n { -res } else { res };
        }

        // Determine the top variable:
        let mut m = self.variable(f.id());
        for x in [g, h] {
            if !self.is_terminal(x) {
                m = m.min(self.variable(x.id()));
            }
        }
        assert_ne!(m, 0);

        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);
        let (h0, h1) = self.top_cofactors(h, m);

        let e = self.apply_ite(f0, g0, h0);
        let t = self.apply_ite(f1, g1, h1);
        let res = self.mk_node(m, e, t);
        debug!("computed: ite({}, {}, {}) -> {}", f, g, h, res);
        self.cache.borrow_mut().insert(key, res);

        if n {
            -res
        } else {
            res
        }
    }

    pub fn apply_and(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, self.zero)
    }

    pub fn apply_or(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, self.one, v)
    }

    pub fn apply_imply(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, self.one)
    }

    pub fn apply_and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = self.one;
        for node in nodes {
            res = self.apply_and(res, node);
            if self.is_zero(res) {
                break;
            }
        }
        res
    }

    pub fn apply_or_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = self.zero;
        for node in nodes {
            res = self.apply_or(res, node);
            if self.is_one(res) {
                break;
            }
        }
        res
    }

    /// Cofactor of `f` with respect to a partial assignment.
    pub fn restrict(&self, f: Ref, values: &HashMap<u32, bool>) -> Ref {
        let mut cache = HashMap::new();
        self.restrict_(f, values, &mut cache)
    }

    fn restrict_(&self, f: Ref, values: &HashMap<u32, bool>, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if self.is_terminal(f) || values.is_empty() {
            return f;
        }

        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let i = self.variable(f.id());
        let res = match values.get(&i) {
            Some(true) => self.restrict_(self.high_node(f), values, cache),
            Some(false) => self.restrict_(self.low_node(f), values, cache),
            None => {
                let low = self.restrict_(self.low_node(f), values, cache);
                let high = self.restrict_(self.high_node(f), values, cache);
                self.mk_node(i, low, high)
            }
        };
        cache.insert(f, res);
        res
    }
}
