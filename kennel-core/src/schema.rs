//! Store schema: collections, rows and the domain↔column field table.
//!
//! The remote store speaks in rows of snake_case columns. Domain structs are
//! declared with [`entity_schema!`](crate::entity_schema), which emits the
//! struct, its [`StoreRecord`] impl and the `FIELD_MAP` constant from one
//! table. A domain field without a column cannot be declared, so nothing is
//! silently lost between the two representations.

use crate::{EntityIdType, KennelError, KennelResult, StorageError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A store row: column name to JSON value.
pub type Row = serde_json::Map<String, Value>;

/// Column holding the store-assigned id.
pub const ID_COLUMN: &str = "id";
/// Column holding the creation timestamp.
pub const CREATED_AT_COLUMN: &str = "created_at";
/// Column holding the last-update timestamp.
pub const UPDATED_AT_COLUMN: &str = "updated_at";

// ============================================================================
// COLLECTIONS
// ============================================================================

/// Named collections in the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Dogs,
    Litters,
    Puppies,
    Customers,
    Purchases,
    Expenses,
    VetRecords,
    Waitlist,
    Reminders,
    Files,
    Testimonials,
    Gallery,
    Faq,
    Settings,
}

impl Collection {
    /// Every collection, in bulk-load order.
    pub const ALL: [Collection; 14] = [
        Collection::Dogs,
        Collection::Litters,
        Collection::Puppies,
        Collection::Customers,
        Collection::Purchases,
        Collection::Expenses,
        Collection::VetRecords,
        Collection::Waitlist,
        Collection::Reminders,
        Collection::Files,
        Collection::Testimonials,
        Collection::Gallery,
        Collection::Faq,
        Collection::Settings,
    ];

    /// Store-side collection name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Dogs => "dogs",
            Collection::Litters => "litters",
            Collection::Puppies => "puppies",
            Collection::Customers => "customers",
            Collection::Purchases => "purchases",
            Collection::Expenses => "expenses",
            Collection::VetRecords => "vet_records",
            Collection::Waitlist => "waitlist",
            Collection::Reminders => "reminders",
            Collection::Files => "files",
            Collection::Testimonials => "testimonials",
            Collection::Gallery => "gallery",
            Collection::Faq => "faq",
            Collection::Settings => "settings",
        }
    }

    /// Ordering used by the bulk load. Cached sequences keep this order and
    /// several derived computations rely on it.
    pub fn ordering(&self) -> Option<OrderBy> {
        let order = match self {
            Collection::Dogs => OrderBy::asc("name"),
            Collection::Litters => OrderBy::desc("expected_date"),
            Collection::Puppies => OrderBy::desc(CREATED_AT_COLUMN),
            Collection::Customers => OrderBy::asc("name"),
            Collection::Purchases => OrderBy::desc("purchase_date"),
            Collection::Expenses => OrderBy::desc("date"),
            Collection::VetRecords => OrderBy::desc("visit_date"),
            Collection::Waitlist => OrderBy::asc(CREATED_AT_COLUMN),
            Collection::Reminders => OrderBy::asc("date"),
            Collection::Files => OrderBy::desc(CREATED_AT_COLUMN),
            Collection::Testimonials => OrderBy::asc("display_order"),
            Collection::Gallery => OrderBy::asc("display_order"),
            Collection::Faq => OrderBy::asc("display_order"),
            Collection::Settings => return None,
        };
        Some(order)
    }

    /// Where a freshly inserted row goes in the cached sequence.
    pub fn insert_position(&self) -> InsertPosition {
        match self.ordering() {
            Some(order) if !order.ascending => InsertPosition::Prepend,
            _ => InsertPosition::Append,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort specification for a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub ascending: bool,
}

impl OrderBy {
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            ascending: true,
        }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            ascending: false,
        }
    }
}

/// Placement of newly created entries in a cached sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Oldest-first collections grow at the end.
    Append,
    /// Most-recent-first collections grow at the front.
    Prepend,
}

// ============================================================================
// FIELD TABLE
// ============================================================================

/// One row of an entity's domain↔schema field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    /// Domain field name.
    pub field: &'static str,
    /// Store column name.
    pub column: &'static str,
}

/// A typed reference from one entity to another, checked at the repository
/// boundary before a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub field: &'static str,
    pub collection: Collection,
    pub id: String,
}

/// An entity that maps to rows of one store collection.
pub trait StoreRecord:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Typed identifier of this entity kind.
    type Id: EntityIdType;

    /// Collection holding this entity.
    const COLLECTION: Collection;

    /// Exhaustive field table, including `id` and the two timestamps.
    const FIELD_MAP: &'static [FieldMapping];

    /// Store-assigned id, absent until the first save.
    fn id(&self) -> Option<&Self::Id>;

    /// Encode every mapped field except the store-managed `id`,
    /// `created_at` and `updated_at` columns.
    fn to_row(&self) -> KennelResult<Row>;

    /// Decode a stored row. Missing or null columns take the field default.
    fn from_row(row: &Row) -> KennelResult<Self>;

    /// References to other entities that must exist for a save to proceed.
    fn references(&self) -> Vec<Reference>;

    /// Look up the store column for a domain field.
    fn column_for(field: &str) -> Option<&'static str> {
        Self::FIELD_MAP
            .iter()
            .find(|m| m.field == field)
            .map(|m| m.column)
    }
}

/// Encode one domain field to its JSON column value.
pub fn encode_field<T: Serialize>(field: &str, value: &T) -> KennelResult<Value> {
    serde_json::to_value(value).map_err(|e| {
        KennelError::from(StorageError::Encode {
            field: field.to_string(),
            reason: e.to_string(),
        })
    })
}

/// Decode one column of a row. Absent and null columns decode to the
/// field's default.
pub fn decode_column<T>(collection: Collection, row: &Row, column: &str) -> KennelResult<T>
where
    T: DeserializeOwned + Default,
{
    match row.get(column) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
            KennelError::from(StorageError::Decode {
                collection,
                column: column.to_string(),
                reason: e.to_string(),
            })
        }),
    }
}

/// Read the raw id column of a row without decoding the whole record.
pub fn row_id(row: &Row) -> Option<&str> {
    row.get(ID_COLUMN).and_then(Value::as_str)
}
