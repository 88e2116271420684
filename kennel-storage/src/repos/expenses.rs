use crate::Repository;
use chrono::NaiveDate;
use kennel_core::derived::{sum_amounts, totals_by_key};
use kennel_core::{Amount, DogId, Expense};
use std::collections::BTreeMap;

impl Repository<Expense> {
    pub fn get_by_dog(&self, dog_id: &DogId) -> Vec<Expense> {
        self.filter(|e| e.dog_id.as_ref() == Some(dog_id))
    }

    pub fn get_by_category(&self, category: &str) -> Vec<Expense> {
        self.filter(|e| e.category.eq_ignore_ascii_case(category))
    }

    /// Expenses dated within `[start, end]`. Undated expenses never match.
    pub fn get_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Expense> {
        self.filter(|e| e.date.is_some_and(|date| date >= start && date <= end))
    }

    pub fn total(&self) -> Amount {
        self.cache().read(|s| sum_amounts(&s.expenses, |e| e.amount))
    }

    pub fn totals_by_category(&self) -> BTreeMap<String, Amount> {
        self.cache()
            .read(|s| totals_by_key(&s.expenses, |e| e.category.clone(), |e| e.amount))
    }
}
