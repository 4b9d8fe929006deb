// libs/shared/database/src/gateway.rs
use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::Value;

use shared_models::{Collection, Document, Fields, StoreError};

/// A single filter on a document field.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(String, Value),
    Lt(String, Value),
    Gt(String, Value),
}

impl Predicate {
    pub fn field(&self) -> &str {
        match self {
            Predicate::Eq(field, _) | Predicate::Lt(field, _) | Predicate::Gt(field, _) => field,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            Predicate::Eq(_, value) | Predicate::Lt(_, value) | Predicate::Gt(_, value) => value,
        }
    }

    /// PostgREST operator prefix.
    pub fn operator(&self) -> &'static str {
        match self {
            Predicate::Eq(..) => "eq",
            Predicate::Lt(..) => "lt",
            Predicate::Gt(..) => "gt",
        }
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        let actual = fields.get(self.field()).unwrap_or(&Value::Null);
        match self {
            Predicate::Eq(_, expected) => values_equal(actual, expected),
            Predicate::Lt(_, bound) => compare_values(actual, bound) == Some(Ordering::Less),
            Predicate::Gt(_, bound) => compare_values(actual, bound) == Some(Ordering::Greater),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Eq(field.to_string(), value.into()));
        self
    }

    pub fn filter_lt(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Lt(field.to_string(), value.into()));
        self
    }

    pub fn filter_gt(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Gt(field.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, field: &str) -> Self {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            descending: false,
        });
        self
    }

    pub fn order_by_desc(mut self, field: &str) -> Self {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            descending: true,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        self.predicates.iter().all(|p| p.matches(fields))
    }

    /// Orders documents by the query's sort keys. Missing fields sort first.
    pub fn compare(&self, a: &Fields, b: &Fields) -> Ordering {
        for key in &self.order_by {
            let left = a.get(&key.field).unwrap_or(&Value::Null);
            let right = b.get(&key.field).unwrap_or(&Value::Null);
            let ordering = compare_values(left, right).unwrap_or(Ordering::Equal);
            let ordering = if key.descending { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Total order within one JSON type; `None` across incompatible types.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) => Some(Ordering::Less),
        (_, Value::Null) => Some(Ordering::Greater),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// CRUD and query access to the remote document store.
///
/// Reads of a missing document return `Ok(None)` / an empty vector. Writes that
/// target a missing document fail with [`StoreError::NotFound`].
#[async_trait]
pub trait StoreGateway: Send + Sync {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    async fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Creates a document and returns its generated id.
    async fn create(&self, collection: Collection, fields: Fields) -> Result<String, StoreError>;

    /// Merges `delta` into an existing document.
    async fn update(&self, collection: Collection, id: &str, delta: Fields) -> Result<(), StoreError>;

    /// Merges `delta` only if `condition` holds on the stored document.
    /// Returns whether the write was applied.
    async fn update_if(
        &self,
        collection: Collection,
        id: &str,
        condition: &Predicate,
        delta: Fields,
    ) -> Result<bool, StoreError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;
}
