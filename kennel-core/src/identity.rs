//! Identity types for kennel entities
//!
//! Every entity kind gets its own id newtype so a `DogId` can never be passed
//! where a `CustomerId` is expected. The store assigns ids as opaque strings;
//! the wrappers never interpret them.

use chrono::{DateTime, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Common behaviour shared by all typed entity identifiers.
pub trait EntityIdType:
    Clone + Eq + std::hash::Hash + std::fmt::Debug + std::fmt::Display + Send + Sync + 'static
{
    /// Wrap a raw store-assigned id.
    fn new(raw: impl Into<String>) -> Self;

    /// Borrow the raw id string.
    fn as_str(&self) -> &str;
}

/// Declare a typed identifier wrapping the store's opaque string id.
///
/// ```ignore
/// define_id!(DogId);
/// let id = DogId::new("abc");
/// assert_eq!(id.as_str(), "abc");
/// ```
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $crate::identity::EntityIdType for $name {
            fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl $name {
            /// Wrap a raw store-assigned id.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the raw id string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

define_id!(
    /// Identifier of a [`crate::Dog`].
    DogId
);
define_id!(
    /// Identifier of a [`crate::Litter`].
    LitterId
);
define_id!(
    /// Identifier of a [`crate::Puppy`].
    PuppyId
);
define_id!(
    /// Identifier of a [`crate::Customer`].
    CustomerId
);
define_id!(
    /// Identifier of a [`crate::Purchase`].
    PurchaseId
);
define_id!(ExpenseId);
define_id!(VetRecordId);
define_id!(WaitlistEntryId);
define_id!(ReminderId);
define_id!(FileId);
define_id!(TestimonialId);
define_id!(GalleryItemId);
define_id!(FaqItemId);
define_id!(SettingsId);
