//! Remote store adapter trait.
//!
//! A uniform async interface over the persistent store: rows of fixed schema
//! columns in named collections. Adapters surface backend failures verbatim
//! and never retry.

use ::async_trait::async_trait;
use kennel_core::{Collection, KennelResult, OrderBy, Row};
use serde_json::Value;

/// A row filter. Only equality is needed by the repositories.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { column: String, value: Value },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Whether a row passes this filter. A missing column compares as null.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::Eq { column, value } => row.get(column).unwrap_or(&Value::Null) == value,
        }
    }
}

/// Parameters of a `list` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bulk-load query for a collection: its declared ordering, no filter.
    pub fn for_collection(collection: Collection) -> Self {
        Self {
            order: collection.ordering(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Async CRUD over store collections.
///
/// Rows use store column names. `insert` and `update` return the stored row
/// with `id`, `created_at` and `updated_at` filled in by the store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// List rows matching every filter, in the requested order.
    async fn list(&self, collection: Collection, query: &ListQuery) -> KennelResult<Vec<Row>>;

    /// Fetch one row. Fails with `StorageError::NotFound` when absent.
    async fn get(&self, collection: Collection, id: &str) -> KennelResult<Row>;

    /// Insert a row and return it as stored.
    async fn insert(&self, collection: Collection, row: Row) -> KennelResult<Row>;

    /// Overwrite the given columns of an existing row and return it as stored.
    async fn update(&self, collection: Collection, id: &str, row: Row) -> KennelResult<Row>;

    /// Delete a row by id.
    async fn delete(&self, collection: Collection, id: &str) -> KennelResult<()>;
}
