//! Rabies and vaccination expiration alerts.

use super::days_between;
use crate::{Dog, VetRecord, VetRecordType};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Which records an expiration check looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationKind {
    /// Records of type rabies.
    Rabies,
    /// Any record that carries an expiration date.
    Vaccination,
}

impl ExpirationKind {
    fn matches(&self, record: &VetRecord) -> bool {
        match self {
            ExpirationKind::Rabies => record.record_type == VetRecordType::Rabies,
            ExpirationKind::Vaccination => record.expiration_date.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpirationStatus {
    /// The latest matching record expires within the window or already has.
    Dated {
        record: VetRecord,
        expiration_date: NaiveDate,
        days_until: i64,
        is_expired: bool,
    },
    /// The dog has no matching record at all.
    NoRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpirationAlert {
    pub dog: Dog,
    pub status: ExpirationStatus,
}

impl ExpirationAlert {
    pub fn days_until(&self) -> Option<i64> {
        match &self.status {
            ExpirationStatus::Dated { days_until, .. } => Some(*days_until),
            ExpirationStatus::NoRecord => None,
        }
    }

    pub fn is_no_record(&self) -> bool {
        self.status == ExpirationStatus::NoRecord
    }
}

/// Expiration alerts for dogs kept at home.
///
/// Per dog, the matching record with the latest visit date decides. It alerts
/// when its expiration date is at most `window_days` away, including dates
/// already passed. A latest record without an expiration date does not alert.
/// Results are sorted by days until expiry; `NoRecord` entries come last.
pub fn expiring_records(
    dogs: &[Dog],
    records: &[VetRecord],
    kind: ExpirationKind,
    window_days: i64,
    today: NaiveDate,
) -> Vec<ExpirationAlert> {
    let mut alerts: Vec<ExpirationAlert> = dogs
        .iter()
        .filter(|dog| dog.is_home())
        .filter_map(|dog| {
            let dog_id = dog.id.as_ref()?;
            let latest = records
                .iter()
                .filter(|r| r.dog_id.as_ref() == Some(dog_id) && kind.matches(r))
                .max_by(|a, b| compare_visits(a, b));

            let Some(record) = latest else {
                return Some(ExpirationAlert {
                    dog: dog.clone(),
                    status: ExpirationStatus::NoRecord,
                });
            };
            let expiration_date = record.expiration_date?;
            let days_until = days_between(today, expiration_date);
            if days_until > window_days {
                return None;
            }
            Some(ExpirationAlert {
                dog: dog.clone(),
                status: ExpirationStatus::Dated {
                    record: record.clone(),
                    expiration_date,
                    days_until,
                    is_expired: days_until < 0,
                },
            })
        })
        .collect();

    alerts.sort_by(|a, b| match (a.days_until(), b.days_until()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    alerts
}

// Records without a visit date rank below any dated one.
fn compare_visits(a: &VetRecord, b: &VetRecord) -> Ordering {
    a.visit_date.cmp(&b.visit_date)
}
