//! In-memory reference engine
//!
//! A complete [`DataEngine`] over plain vectors, used as the default
//! backend for local development and as the test double for the whole
//! stack. The model set is fixed at connect time; rows live behind
//! per-model locks.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::engine::{DataEngine, EngineConnector, KeyMatch, ModelAccessor, Record};
use crate::errors::EngineError;
use crate::query::{EngineQuery, SortOrder, WhereNode, WhereTree};

/// Error code reported when update/delete matches no record
pub const RECORD_NOT_FOUND: &str = "record_not_found";

/// Rows of one model
pub struct MemoryModel {
    name: String,
    rows: Mutex<Vec<Record>>,
}

impl MemoryModel {
    fn not_found(&self) -> EngineError {
        EngineError::KnownRequest {
            code: RECORD_NOT_FOUND.to_string(),
            message: format!("no {} record matches the given key", self.name),
        }
    }
}

#[async_trait]
impl ModelAccessor for MemoryModel {
    async fn find_many(&self, query: EngineQuery) -> Result<Vec<Record>, EngineError> {
        let rows = self.rows.lock().await;
        let mut matched: Vec<Record> = rows
            .iter()
            .filter(|record| eval_tree(&query.filter, record))
            .cloned()
            .collect();
        drop(rows);

        if !query.order_by.is_empty() {
            matched.sort_by(|a, b| cmp_records(a, b, &query.order_by));
        }

        if let Some(cursor) = &query.cursor {
            let from = cursor_position(&matched, cursor);
            matched.drain(..from);
        }
        if let Some(skip) = query.skip {
            let skip = (skip as usize).min(matched.len());
            matched.drain(..skip);
        }
        if let Some(take) = query.take {
            matched.truncate(take as usize);
        }
        if !query.select.is_empty() {
            matched = matched
                .into_iter()
                .map(|record| project(record, &query.select))
                .collect();
        }

        Ok(matched)
    }

    async fn find_unique(&self, key: KeyMatch) -> Result<Option<Record>, EngineError> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|record| matches_key(record, &key)).cloned())
    }

    async fn create(&self, data: Record) -> Result<Record, EngineError> {
        let mut rows = self.rows.lock().await;
        rows.push(data.clone());
        Ok(data)
    }

    async fn update(&self, key: KeyMatch, data: Record) -> Result<Record, EngineError> {
        let mut rows = self.rows.lock().await;
        let record = rows
            .iter_mut()
            .find(|record| matches_key(record, &key))
            .ok_or_else(|| self.not_found())?;

        for (field, value) in data {
            record.insert(field, value);
        }
        Ok(record.clone())
    }

    async fn delete(&self, key: KeyMatch) -> Result<Record, EngineError> {
        let mut rows = self.rows.lock().await;
        let position = rows
            .iter()
            .position(|record| matches_key(record, &key))
            .ok_or_else(|| self.not_found())?;

        Ok(rows.remove(position))
    }
}

/// Engine over an in-memory model set fixed at connect time
pub struct MemoryEngine {
    models: HashMap<String, Arc<MemoryModel>>,
}

#[async_trait]
impl DataEngine for MemoryEngine {
    fn model(&self, name: &str) -> Option<Arc<dyn ModelAccessor>> {
        self.models
            .get(name)
            .map(|model| Arc::clone(model) as Arc<dyn ModelAccessor>)
    }

    fn model_names(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    async fn disconnect(&self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Connector producing [`MemoryEngine`] clients with optional seed rows
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    seed: HashMap<String, Vec<Record>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an empty model
    pub fn with_model(mut self, name: &str) -> Self {
        self.seed.entry(name.to_string()).or_default();
        self
    }

    /// Declare a model seeded with rows
    pub fn with_rows(mut self, name: &str, rows: Vec<Record>) -> Self {
        self.seed.insert(name.to_string(), rows);
        self
    }
}

#[async_trait]
impl EngineConnector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn DataEngine>, EngineError> {
        let models = self
            .seed
            .iter()
            .map(|(name, rows)| {
                (
                    name.clone(),
                    Arc::new(MemoryModel {
                        name: name.clone(),
                        rows: Mutex::new(rows.clone()),
                    }),
                )
            })
            .collect();

        Ok(Arc::new(MemoryEngine { models }))
    }
}

fn matches_key(record: &Record, key: &KeyMatch) -> bool {
    key.iter()
        .all(|(field, value)| record.get(field) == Some(value))
}

fn eval_tree(tree: &WhereTree, record: &Record) -> bool {
    tree.entries()
        .all(|(field, node)| eval_node(field, node, record))
}

fn eval_node(field: &str, node: &WhereNode, record: &Record) -> bool {
    match node {
        WhereNode::Value(value) => record.get(field) == Some(value),
        WhereNode::Ops(ops) => ops
            .iter()
            .all(|(operator, operand)| eval_op(record.get(field), operator, operand)),
        WhereNode::All(children) => children.iter().all(|child| eval_tree(child, record)),
        WhereNode::Any(children) => children.iter().any(|child| eval_tree(child, record)),
        WhereNode::Not(child) => !eval_tree(child, record),
    }
}

fn eval_op(value: Option<&Value>, operator: &str, operand: &Value) -> bool {
    let Some(value) = value else {
        return false;
    };

    match operator {
        "equals" => value == operand,
        "contains" => match (value.as_str(), operand.as_str()) {
            (Some(value), Some(operand)) => value.contains(operand),
            _ => false,
        },
        "gt" => cmp_values(value, operand) == Ordering::Greater,
        "gte" => cmp_values(value, operand) != Ordering::Less,
        "lt" => cmp_values(value, operand) == Ordering::Less,
        "lte" => cmp_values(value, operand) != Ordering::Greater,
        "in" => operand
            .as_array()
            .map(|candidates| candidates.contains(value))
            .unwrap_or(false),
        other => {
            tracing::warn!(operator = %other, "unsupported filter operator");
            false
        }
    }
}

/// Total order over JSON values: null < bool < number < string < array < object
fn cmp_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn cmp_records(a: &Record, b: &Record, order_by: &[(String, SortOrder)]) -> Ordering {
    for (field, order) in order_by {
        let left = a.get(field).unwrap_or(&Value::Null);
        let right = b.get(field).unwrap_or(&Value::Null);

        let ordering = match order {
            SortOrder::Asc => cmp_values(left, right),
            SortOrder::Desc => cmp_values(right, left),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Index of the row the cursor points at, inclusive; past the end when no
/// row matches every cursor field.
fn cursor_position(rows: &[Record], cursor: &Value) -> usize {
    let Some(cursor) = cursor.as_object() else {
        return rows.len();
    };

    rows.iter()
        .position(|record| {
            cursor
                .iter()
                .all(|(field, value)| record.get(field) == Some(value))
        })
        .unwrap_or(rows.len())
}

fn project(record: Record, select: &[String]) -> Record {
    record
        .into_iter()
        .filter(|(field, _)| select.iter().any(|selected| selected == field))
        .collect()
}
