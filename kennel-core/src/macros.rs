//! Declaration macros for entity structs.

/// Declare an entity and its store field table in one place.
///
/// Generates the domain struct (camelCase JSON, unknown keys ignored), the
/// [`StoreRecord`](crate::StoreRecord) impl with an exhaustive `FIELD_MAP`,
/// and row encode/decode. `id`, `created_at` and `updated_at` are added to
/// every entity and managed by the store.
///
/// ```ignore
/// entity_schema! {
///     /// A breeding dog.
///     pub struct Dog {
///         id: DogId,
///         collection: Dogs,
///         fields {
///             name: String => "name",
///             heat_cycle_length: Option<u32> => "heat_cycle_days",
///         }
///     }
/// }
/// ```
macro_rules! entity_schema {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            id: $id:ty,
            collection: $collection:ident,
            fields {
                $( $(#[$fmeta:meta])* $field:ident : $ty:ty => $column:literal ),* $(,)?
            }
            $( references { $( $rfield:ident => $rcoll:ident ),* $(,)? } )?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $name {
            #[serde(skip_serializing_if = "Option::is_none")]
            pub id: Option<$id>,
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
            pub created_at: Option<$crate::Timestamp>,
            pub updated_at: Option<$crate::Timestamp>,
        }

        impl $crate::schema::StoreRecord for $name {
            type Id = $id;

            const COLLECTION: $crate::Collection = $crate::Collection::$collection;

            const FIELD_MAP: &'static [$crate::FieldMapping] = &[
                $crate::FieldMapping { field: "id", column: $crate::schema::ID_COLUMN },
                $( $crate::FieldMapping { field: stringify!($field), column: $column }, )*
                $crate::FieldMapping {
                    field: "created_at",
                    column: $crate::schema::CREATED_AT_COLUMN,
                },
                $crate::FieldMapping {
                    field: "updated_at",
                    column: $crate::schema::UPDATED_AT_COLUMN,
                },
            ];

            fn id(&self) -> Option<&$id> {
                self.id.as_ref()
            }

            fn to_row(&self) -> $crate::KennelResult<$crate::Row> {
                let mut row = $crate::Row::new();
                $(
                    row.insert(
                        $column.to_string(),
                        $crate::schema::encode_field(stringify!($field), &self.$field)?,
                    );
                )*
                Ok(row)
            }

            fn from_row(row: &$crate::Row) -> $crate::KennelResult<Self> {
                let collection = $crate::Collection::$collection;
                Ok(Self {
                    id: $crate::schema::decode_column(collection, row, $crate::schema::ID_COLUMN)?,
                    $(
                        $field: $crate::schema::decode_column(collection, row, $column)?,
                    )*
                    created_at: $crate::schema::decode_column(
                        collection,
                        row,
                        $crate::schema::CREATED_AT_COLUMN,
                    )?,
                    updated_at: $crate::schema::decode_column(
                        collection,
                        row,
                        $crate::schema::UPDATED_AT_COLUMN,
                    )?,
                })
            }

            #[allow(unused_mut)]
            fn references(&self) -> Vec<$crate::Reference> {
                let mut refs = Vec::new();
                $( $(
                    if let Some(target) = &self.$rfield {
                        refs.push($crate::Reference {
                            field: stringify!($rfield),
                            collection: $crate::Collection::$rcoll,
                            id: target.as_str().to_string(),
                        });
                    }
                )* )?
                refs
            }
        }
    };
}
