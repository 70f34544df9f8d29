//! Caller-facing query options and the engine-facing compiled form

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::filter::{WhereNode, WhereTree};
use crate::query::ordering::SortOrder;

/// Declarative description of a find-many request
///
/// `search` is caller-side sugar: [`QueryOptions::compile`] folds it into
/// the filter as `contains` conditions, and the engine-facing
/// [`EngineQuery`] has no `search` field at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub filter: WhereTree,
    pub skip: Option<u64>,
    pub take: Option<u64>,
    pub cursor: Option<Value>,
    pub order_by: Vec<(String, SortOrder)>,
    pub select: Vec<String>,
    pub include: Vec<String>,
    pub search: BTreeMap<String, String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the filter tree
    pub fn filter(mut self, filter: WhereTree) -> Self {
        self.filter = filter;
        self
    }

    /// Skip the first `skip` matching records
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Return at most `take` records
    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }

    /// Continue from an opaque position token
    pub fn cursor(mut self, cursor: Value) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Add an ordering key
    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by.push((field.to_string(), order));
        self
    }

    /// Project the result down to the named fields
    pub fn select(mut self, fields: Vec<String>) -> Self {
        self.select = fields;
        self
    }

    /// Request relation expansion for the named associations
    pub fn include(mut self, relations: Vec<String>) -> Self {
        self.include = relations;
        self
    }

    /// Add a substring-match query for one field
    pub fn search(mut self, field: &str, query: &str) -> Self {
        self.search.insert(field.to_string(), query.to_string());
        self
    }

    /// Merge every search entry into the filter as a `contains` condition,
    /// overwriting any prior node at the same field. Idempotent; a no-op
    /// when `search` is empty.
    pub fn expand_search(mut self) -> Self {
        for (field, query) in &self.search {
            let mut ops = BTreeMap::new();
            ops.insert("contains".to_string(), Value::String(query.clone()));
            self.filter.insert(field, WhereNode::Ops(ops));
        }
        self
    }

    /// Compile into the engine-facing form, expanding and dropping `search`
    pub fn compile(self) -> EngineQuery {
        let expanded = self.expand_search();
        EngineQuery {
            filter: expanded.filter,
            skip: expanded.skip,
            take: expanded.take,
            cursor: expanded.cursor,
            order_by: expanded.order_by,
            select: expanded.select,
            include: expanded.include,
        }
    }
}

/// The clause structure a data engine consumes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineQuery {
    pub filter: WhereTree,
    pub skip: Option<u64>,
    pub take: Option<u64>,
    pub cursor: Option<Value>,
    pub order_by: Vec<(String, SortOrder)>,
    pub select: Vec<String>,
    pub include: Vec<String>,
}
