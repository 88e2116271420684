//! Derived computations over cached entities.
//!
//! Everything here is a pure function of its inputs and the supplied clock
//! reading. Callers pass cache snapshots; nothing is mutated.

mod birthdays;
mod expiration;
mod finance;
mod heat;
mod queue;

pub use birthdays::{upcoming_birthdays, BirthdayAlert, BirthdaySubject};
pub use expiration::{expiring_records, ExpirationAlert, ExpirationKind, ExpirationStatus};
pub use finance::{sum_amounts, totals_by_key};
pub use heat::{
    calculate_next_heat, days_until_heat, heat_predictions, HeatPrediction, DEFAULT_HEAT_CYCLE_DAYS,
};
pub use queue::{active_queue, queue_position};

use chrono::NaiveDate;

/// Whole calendar days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}
