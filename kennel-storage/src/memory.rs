//! In-memory store backend.
//!
//! The on-device key space: every collection is a vector of rows in insertion
//! order. Ids are UUIDv7 and timestamps strictly increase, so rows created
//! later always sort after earlier ones by `created_at`.

use crate::store::{ListQuery, RemoteStore};
use ::async_trait::async_trait;
use chrono::{Duration, SecondsFormat, Utc};
use kennel_core::schema::{row_id, CREATED_AT_COLUMN, ID_COLUMN, UPDATED_AT_COLUMN};
use kennel_core::{Collection, KennelResult, Row, StorageError, Timestamp};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

/// In-memory [`RemoteStore`]. Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Arc<RwLock<HashMap<Collection, Vec<Row>>>>,
    clock: Arc<Mutex<Option<Timestamp>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put raw rows into a collection exactly as given, bypassing id and
    /// timestamp assignment.
    pub fn seed(&self, collection: Collection, rows: Vec<Row>) -> KennelResult<()> {
        let mut all = self.rows.write().map_err(|_| StorageError::LockPoisoned)?;
        all.entry(collection).or_default().extend(rows);
        Ok(())
    }

    /// Copy of every row in a collection, in insertion order.
    pub fn rows(&self, collection: Collection) -> KennelResult<Vec<Row>> {
        let all = self.rows.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(all.get(&collection).cloned().unwrap_or_default())
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.rows
            .read()
            .map(|all| all.get(&collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    /// Next timestamp, strictly after the previous one handed out.
    fn tick(&self) -> KennelResult<String> {
        let mut last = self.clock.lock().map_err(|_| StorageError::LockPoisoned)?;
        let now = Utc::now();
        let next = match *last {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        Ok(next.to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, collection: Collection, query: &ListQuery) -> KennelResult<Vec<Row>> {
        let all = self.rows.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut rows: Vec<Row> = all
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| f.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(all);

        if let Some(order) = query.order {
            rows.sort_by(|a, b| {
                compare_values(a.get(order.column), b.get(order.column), order.ascending)
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn get(&self, collection: Collection, id: &str) -> KennelResult<Row> {
        let all = self.rows.read().map_err(|_| StorageError::LockPoisoned)?;
        all.get(&collection)
            .and_then(|rows| rows.iter().find(|row| row_id(row) == Some(id)))
            .cloned()
            .ok_or_else(|| {
                StorageError::NotFound {
                    collection,
                    id: id.to_string(),
                }
                .into()
            })
    }

    async fn insert(&self, collection: Collection, mut row: Row) -> KennelResult<Row> {
        let stamp = self.tick()?;
        let mut all = self.rows.write().map_err(|_| StorageError::LockPoisoned)?;
        let rows = all.entry(collection).or_default();

        let id = match row_id(&row) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::now_v7().to_string(),
        };
        if rows.iter().any(|r| row_id(r) == Some(id.as_str())) {
            return Err(StorageError::Backend {
                collection,
                status: Some(409),
                message: format!(
                    "duplicate key value violates unique constraint \"{collection}_pkey\""
                ),
            }
            .into());
        }

        row.insert(ID_COLUMN.to_string(), Value::String(id));
        row.insert(CREATED_AT_COLUMN.to_string(), Value::String(stamp.clone()));
        row.insert(UPDATED_AT_COLUMN.to_string(), Value::String(stamp));
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, collection: Collection, id: &str, row: Row) -> KennelResult<Row> {
        let stamp = self.tick()?;
        let mut all = self.rows.write().map_err(|_| StorageError::LockPoisoned)?;
        let stored = all
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r) == Some(id)))
            .ok_or_else(|| StorageError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        for (column, value) in row {
            if column == ID_COLUMN || column == CREATED_AT_COLUMN {
                continue;
            }
            stored.insert(column, value);
        }
        stored.insert(UPDATED_AT_COLUMN.to_string(), Value::String(stamp));
        Ok(stored.clone())
    }

    async fn delete(&self, collection: Collection, id: &str) -> KennelResult<()> {
        let mut all = self.rows.write().map_err(|_| StorageError::LockPoisoned)?;
        let rows = all.entry(collection).or_default();
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id));
        if rows.len() == before {
            return Err(StorageError::NotFound {
                collection,
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Column ordering: numbers numerically, strings lexicographically, booleans
/// false first. Nulls and missing values sort last in either direction.
pub(crate) fn compare_values(a: Option<&Value>, b: Option<&Value>, ascending: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    let ordering = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    };
    if ascending {
        ordering
    } else {
        ordering.reverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Filter;
    use kennel_core::{KennelError, OrderBy};
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_increasing_timestamps() {
        let store = MemoryStore::new();
        let first = store
            .insert(Collection::Dogs, row(&[("name", json!("Juniper"))]))
            .await
            .unwrap();
        let second = store
            .insert(Collection::Dogs, row(&[("name", json!("Maple"))]))
            .await
            .unwrap();

        assert!(row_id(&first).is_some());
        assert_ne!(row_id(&first), row_id(&second));
        let t1 = first[CREATED_AT_COLUMN].as_str().unwrap();
        let t2 = second[CREATED_AT_COLUMN].as_str().unwrap();
        assert!(t1 < t2);
        assert_eq!(store.len(Collection::Dogs), 2);
    }

    #[tokio::test]
    async fn test_update_merges_columns() {
        let store = MemoryStore::new();
        let stored = store
            .insert(
                Collection::Puppies,
                row(&[("name", json!("Biscuit")), ("status", json!("available"))]),
            )
            .await
            .unwrap();
        let id = row_id(&stored).unwrap().to_string();

        let updated = store
            .update(Collection::Puppies, &id, row(&[("status", json!("sold"))]))
            .await
            .unwrap();
        assert_eq!(updated["name"], json!("Biscuit"));
        assert_eq!(updated["status"], json!("sold"));
        assert_eq!(updated[CREATED_AT_COLUMN], stored[CREATED_AT_COLUMN]);
        assert_ne!(updated[UPDATED_AT_COLUMN], stored[UPDATED_AT_COLUMN]);
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let store = MemoryStore::new();
        let err = store.get(Collection::Faq, "nope").await.unwrap_err();
        assert!(matches!(
            err,
            KennelError::Storage(StorageError::NotFound { .. })
        ));
        assert!(store.delete(Collection::Faq, "nope").await.is_err());
        assert!(store
            .update(Collection::Faq, "nope", Row::new())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_backend_conflict() {
        let store = MemoryStore::new();
        let with_id = row(&[("id", json!("fixed"))]);
        store.insert(Collection::Faq, with_id.clone()).await.unwrap();
        let err = store.insert(Collection::Faq, with_id).await.unwrap_err();
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn test_list_filters_orders_and_limits() {
        let store = MemoryStore::new();
        store
            .seed(
                Collection::Litters,
                vec![
                    row(&[("id", json!("a")), ("expected_date", json!("2024-03-01"))]),
                    row(&[("id", json!("b")), ("expected_date", Value::Null)]),
                    row(&[("id", json!("c")), ("expected_date", json!("2024-09-01"))]),
                    row(&[("id", json!("d")), ("expected_date", json!("2024-05-01"))]),
                ],
            )
            .unwrap();

        let query = ListQuery::new().order_by(OrderBy::desc("expected_date"));
        let ids: Vec<String> = store
            .list(Collection::Litters, &query)
            .await
            .unwrap()
            .iter()
            .filter_map(|r| row_id(r).map(str::to_string))
            .collect();
        assert_eq!(ids, vec!["c", "d", "a", "b"]);

        let filtered = store
            .list(
                Collection::Litters,
                &ListQuery::new()
                    .filter(Filter::eq("expected_date", "2024-05-01"))
                    .limit(5),
            )
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);

        let limited = store
            .list(Collection::Litters, &query.clone().limit(2))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_compare_values_numbers_and_nulls() {
        assert_eq!(
            compare_values(Some(&json!(2)), Some(&json!(10)), true),
            Ordering::Less
        );
        assert_eq!(
            compare_values(None, Some(&json!(1)), true),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(Some(&Value::Null), Some(&json!(1)), false),
            Ordering::Greater
        );
    }
}
