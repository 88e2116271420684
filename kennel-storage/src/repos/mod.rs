//! Entity-specific query surfaces.
//!
//! Plain collections get their queries as inherent methods on
//! [`Repository<E>`](crate::Repository). Collections whose writes trigger
//! side effects or guard fields (purchases, customers, puppies, testimonials)
//! are wrapped in their own repository type that overrides `save`/`delete`
//! and derefs to the generic one for everything else.

mod customers;
mod dogs;
mod expenses;
mod files;
mod litters;
mod purchases;
mod puppies;
mod reminders;
mod settings;
mod site;
mod vet_records;
mod waitlist;

pub use customers::CustomerRepository;
pub use purchases::PurchaseRepository;
pub use puppies::PuppyRepository;
pub use settings::SettingsRepository;
pub use site::TestimonialRepository;

use chrono::{NaiveDate, Utc};

/// Today's date in UTC.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Case-insensitive substring match over optional text fields. An empty
/// query matches everything.
pub(crate) fn text_matches<'a>(
    query: &str,
    fields: impl IntoIterator<Item = Option<&'a str>>,
) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}
