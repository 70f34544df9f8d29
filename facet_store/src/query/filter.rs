//! Predicate trees
//!
//! A [`WhereTree`] is a mapping from field name to a [`WhereNode`]: a
//! literal value (equality), an operator map, or one of the boolean group
//! nodes stored under the reserved keys `_and`, `_or`, and `_not`. Trees
//! nest to unbounded depth and are acyclic by construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved key for conjunction groups
pub const ALL_KEY: &str = "_and";
/// Reserved key for disjunction groups
pub const ANY_KEY: &str = "_or";
/// Reserved key for negation groups
pub const NOT_KEY: &str = "_not";

/// One node of a predicate tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WhereNode {
    /// Literal value, matched by equality
    Value(Value),
    /// Operator map: operator name to operand (e.g. `contains`, `gt`)
    Ops(BTreeMap<String, Value>),
    /// All child trees must match
    All(Vec<WhereTree>),
    /// At least one child tree must match
    Any(Vec<WhereTree>),
    /// The child tree must not match
    Not(Box<WhereTree>),
}

/// Recursive boolean filter over record fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WhereTree {
    nodes: BTreeMap<String, WhereNode>,
}

impl WhereTree {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Single-field equality tree
    pub fn eq(field: &str, value: Value) -> Self {
        Self::new().with(field, WhereNode::Value(value))
    }

    /// Single-field substring-match tree
    pub fn contains(field: &str, query: &str) -> Self {
        Self::op(field, "contains", Value::String(query.to_string()))
    }

    /// Single-field tree with one named operator
    pub fn op(field: &str, operator: &str, operand: Value) -> Self {
        let mut ops = BTreeMap::new();
        ops.insert(operator.to_string(), operand);
        Self::new().with(field, WhereNode::Ops(ops))
    }

    /// Conjunction of child trees
    pub fn all(children: Vec<WhereTree>) -> Self {
        Self::new().with(ALL_KEY, WhereNode::All(children))
    }

    /// Disjunction of child trees
    pub fn any(children: Vec<WhereTree>) -> Self {
        Self::new().with(ANY_KEY, WhereNode::Any(children))
    }

    /// Negation of a child tree
    pub fn negate(child: WhereTree) -> Self {
        Self::new().with(NOT_KEY, WhereNode::Not(Box::new(child)))
    }

    /// Insert a node, overwriting any prior node at the same key
    pub fn insert(&mut self, field: &str, node: WhereNode) {
        self.nodes.insert(field.to_string(), node);
    }

    /// Chainable [`WhereTree::insert`]
    pub fn with(mut self, field: &str, node: WhereNode) -> Self {
        self.insert(field, node);
        self
    }

    pub fn get(&self, field: &str) -> Option<&WhereNode> {
        self.nodes.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate entries in field order
    pub fn entries(&self) -> std::collections::btree_map::Iter<'_, String, WhereNode> {
        self.nodes.iter()
    }
}
