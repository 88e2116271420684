//! Money aggregation.

use crate::Amount;
use std::collections::BTreeMap;

/// Sum of amounts. Missing or non-numeric amounts already decode as zero.
pub fn sum_amounts<T, F>(items: &[T], amount: F) -> Amount
where
    F: Fn(&T) -> Amount,
{
    items.iter().map(amount).sum()
}

/// Totals grouped by a string key, in key order.
pub fn totals_by_key<T, K, F>(items: &[T], key: K, amount: F) -> BTreeMap<String, Amount>
where
    K: Fn(&T) -> String,
    F: Fn(&T) -> Amount,
{
    let mut totals = BTreeMap::new();
    for item in items {
        *totals.entry(key(item)).or_insert(Amount::ZERO) += amount(item);
    }
    totals
}
