//! Upcoming birthday alerts for dogs and puppies.

use super::days_between;
use crate::{Dog, DogId, Puppy, PuppyId};
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthdaySubject {
    Dog(Option<DogId>),
    Puppy(Option<PuppyId>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BirthdayAlert {
    pub subject: BirthdaySubject,
    pub name: String,
    pub birthday: NaiveDate,
    pub next_birthday: NaiveDate,
    pub days_until: i64,
    /// Age in years reached on `next_birthday`.
    pub age: i32,
}

/// Birthdays falling within `window_days` of `today` (inclusive), soonest
/// first. A birthday already past this year rolls to next year. A Feb 29
/// birthday is observed on Feb 28 in common years.
pub fn upcoming_birthdays(
    dogs: &[Dog],
    puppies: &[Puppy],
    today: NaiveDate,
    window_days: i64,
) -> Vec<BirthdayAlert> {
    let dog_births = dogs
        .iter()
        .filter_map(|d| Some((BirthdaySubject::Dog(d.id.clone()), &d.name, d.birthday?)));
    let puppy_births = puppies
        .iter()
        .filter_map(|p| Some((BirthdaySubject::Puppy(p.id.clone()), &p.name, p.birthday?)));

    let mut alerts: Vec<BirthdayAlert> = dog_births
        .chain(puppy_births)
        .filter_map(|(subject, name, birthday)| {
            let next_birthday = next_occurrence(birthday, today)?;
            let days_until = days_between(today, next_birthday);
            if days_until > window_days {
                return None;
            }
            Some(BirthdayAlert {
                subject,
                name: name.clone(),
                birthday,
                next_birthday,
                days_until,
                age: next_birthday.year() - birthday.year(),
            })
        })
        .collect();

    alerts.sort_by_key(|a| a.days_until);
    alerts
}

fn next_occurrence(birthday: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = anniversary(birthday, today.year())?;
    if this_year < today {
        anniversary(birthday, today.year() + 1)
    } else {
        Some(this_year)
    }
}

fn anniversary(birthday: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day() - 1))
}
