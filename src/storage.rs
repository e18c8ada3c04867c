use std::collections::HashMap;

use crate::reference::Ref;

/// Decision node: `if variable then high else low`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Node {
    pub variable: u32,
    pub low: Ref,
    pub high: Ref,
}

/// Hash-consed node storage (the unique table).
///
/// Cell 0 is a sentry and cell 1 is the terminal, so real nodes start at 2.
/// The capacity is a soft budget: inserting past it still succeeds, but the
/// storage reports itself as overflowed from then on.
pub struct Storage {
    nodes: Vec<Node>,
    unique: HashMap<Node, u32>,
    capacity: usize,
}

impl Storage {
    /// Create a new storage with a budget of `2^bits` nodes.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Storage bits should be in the range 0..=31");

        let sentry = Node {
            variable: 0,
            low: Ref::positive(1),
            high: Ref::positive(1),
        };
        Self {
            // Sentry at 0, terminal at 1.
            nodes: vec![sentry, sentry],
            unique: HashMap::new(),
            capacity: 1 << bits,
        }
    }

    /// Budgeted number of nodes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of allocated cells, including the sentry and the terminal.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Whether more nodes were allocated than the budget allows.
    pub fn is_overflowed(&self) -> bool {
        self.nodes.len() > self.capacity
    }

    pub fn node(&self, index: u32) -> &Node {
        assert_ne!(index, 0, "Index is 0");
        &self.nodes[index as usize]
    }

    /// Return the index of the given node, allocating it if it is new.
    pub fn put(&mut self, node: Node) -> u32 {
        assert_ne!(node.variable, 0, "Variable index should not be zero");
        if let Some(&index) = self.unique.get(&node) {
            return index;
        }
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        self.unique.insert(node, index);
        index
    }
}
