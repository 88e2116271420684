//! Daily alert digest.
//!
//! One pass over the loaded cache collecting everything an operator should
//! look at today, rendered as plain text.

use chrono::NaiveDate;
use kennel_core::derived::{
    BirthdayAlert, BirthdaySubject, ExpirationAlert, ExpirationKind, ExpirationStatus,
    HeatPrediction,
};
use kennel_core::{Collection, Reminder, Timestamp, WaitlistEntry};
use kennel_storage::Kennel;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    pub today: NaiveDate,
    pub failed_collections: Vec<Collection>,
    pub rabies: Vec<ExpirationAlert>,
    pub vaccinations: Vec<ExpirationAlert>,
    pub birthdays: Vec<BirthdayAlert>,
    pub heats: Vec<HeatPrediction>,
    pub upcoming_reminders: Vec<Reminder>,
    pub overdue_reminders: Vec<Reminder>,
    pub queue: Vec<WaitlistEntry>,
}

impl Digest {
    /// Collect the digest as of `now`, using the kennel's alert windows.
    pub fn collect(kennel: &Kennel, now: Timestamp) -> Self {
        let today = now.date_naive();
        let alerts = kennel.alerts();
        Self {
            today,
            failed_collections: kennel.failed_collections(),
            rabies: kennel.vet_records.get_expiring_on(
                ExpirationKind::Rabies,
                alerts.rabies_window_days,
                today,
            ),
            vaccinations: kennel.vet_records.get_expiring_on(
                ExpirationKind::Vaccination,
                alerts.vaccination_window_days,
                today,
            ),
            birthdays: kennel
                .dogs
                .get_upcoming_birthdays_on(alerts.birthday_window_days, today),
            heats: kennel
                .dogs
                .get_heat_predictions_at(alerts.default_heat_cycle_days, now),
            upcoming_reminders: kennel
                .reminders
                .get_upcoming_on(alerts.reminder_window_days, today),
            overdue_reminders: kennel.reminders.get_overdue_on(today),
            queue: kennel.waitlist.get_active_queue(),
        }
    }

    /// Number of actionable items across every section.
    pub fn item_count(&self) -> usize {
        self.rabies.len()
            + self.vaccinations.len()
            + self.birthdays.len()
            + self.heats.len()
            + self.upcoming_reminders.len()
            + self.overdue_reminders.len()
            + self.queue.len()
    }
}

fn in_days(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        d if d < 0 => format!("{} days ago", -d),
        d => format!("in {d} days"),
    }
}

fn write_expirations(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    alerts: &[ExpirationAlert],
) -> fmt::Result {
    writeln!(f, "{title} ({})", alerts.len())?;
    for alert in alerts {
        match &alert.status {
            ExpirationStatus::Dated {
                record,
                expiration_date,
                days_until,
                is_expired,
            } => {
                let verb = if *is_expired { "expired" } else { "expires" };
                writeln!(
                    f,
                    "  {}: {} {verb} {expiration_date} ({})",
                    alert.dog.name,
                    record.record_type,
                    in_days(*days_until)
                )?;
            }
            ExpirationStatus::NoRecord => writeln!(f, "  {}: no record on file", alert.dog.name)?,
        }
    }
    Ok(())
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Kennel digest for {}", self.today)?;
        if !self.failed_collections.is_empty() {
            let names: Vec<&str> = self.failed_collections.iter().map(Collection::as_str).collect();
            writeln!(f, "WARNING: not loaded, shown empty: {}", names.join(", "))?;
        }
        writeln!(f)?;

        write_expirations(f, "Rabies", &self.rabies)?;
        write_expirations(f, "Vaccinations", &self.vaccinations)?;

        writeln!(f, "Birthdays ({})", self.birthdays.len())?;
        for b in &self.birthdays {
            let kind = match b.subject {
                BirthdaySubject::Dog(_) => "dog",
                BirthdaySubject::Puppy(_) => "puppy",
            };
            writeln!(
                f,
                "  {} ({kind}) turns {} on {} ({})",
                b.name,
                b.age,
                b.next_birthday,
                in_days(b.days_until)
            )?;
        }

        writeln!(f, "Heat cycles ({})", self.heats.len())?;
        for h in &self.heats {
            writeln!(
                f,
                "  {}: next heat {} ({})",
                h.dog_name,
                h.next_heat_date,
                in_days(h.days_until)
            )?;
        }

        writeln!(f, "Overdue reminders ({})", self.overdue_reminders.len())?;
        for r in &self.overdue_reminders {
            writeln!(f, "  {} {}", date_or_dash(r.date), r.title)?;
        }
        writeln!(f, "Upcoming reminders ({})", self.upcoming_reminders.len())?;
        for r in &self.upcoming_reminders {
            writeln!(f, "  {} {}", date_or_dash(r.date), r.title)?;
        }

        writeln!(f, "Waitlist queue ({})", self.queue.len())?;
        for (index, entry) in self.queue.iter().enumerate() {
            let deposit = if entry.deposit_paid {
                "deposit paid"
            } else {
                "no deposit"
            };
            writeln!(f, "  {}. {} ({deposit})", index + 1, entry.full_name())?;
        }
        Ok(())
    }
}

fn date_or_dash(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use kennel_core::{Dog, VetRecordType, WaitlistStatus};
    use kennel_test_utils::fixtures::{self, date};

    #[tokio::test]
    async fn test_digest_collects_every_section() {
        let (_store, kennel) = fixtures::memory_kennel().await;
        let juniper = kennel
            .dogs
            .save(&Dog {
                birthday: Some(date(2020, 5, 10)),
                last_heat_date: Some(date(2024, 1, 1)),
                ..fixtures::breeding_female("Juniper")
            })
            .await
            .unwrap();
        kennel
            .vet_records
            .save(&fixtures::vet_record(
                juniper.id.as_ref().unwrap(),
                VetRecordType::Rabies,
                date(2021, 5, 1),
                Some(date(2024, 4, 28)),
            ))
            .await
            .unwrap();
        kennel
            .reminders
            .save(&fixtures::reminder("Order food", date(2024, 4, 30)))
            .await
            .unwrap();
        kennel
            .reminders
            .save(&fixtures::reminder("Puppy photos", date(2024, 5, 3)))
            .await
            .unwrap();
        kennel
            .waitlist
            .save(&fixtures::waitlist_entry("Ada", WaitlistStatus::Active, true))
            .await
            .unwrap();

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let digest = Digest::collect(&kennel, now);

        assert_eq!(digest.today, date(2024, 5, 1));
        assert_eq!(digest.rabies.len(), 1);
        assert_eq!(digest.vaccinations.len(), 1);
        assert_eq!(digest.birthdays.len(), 1);
        assert_eq!(digest.heats.len(), 1);
        assert_eq!(digest.overdue_reminders.len(), 1);
        assert_eq!(digest.upcoming_reminders.len(), 1);
        assert_eq!(digest.queue.len(), 1);
        assert_eq!(digest.item_count(), 7);

        let text = digest.to_string();
        assert!(text.starts_with("Kennel digest for 2024-05-01"));
        assert!(text.contains("  Juniper: rabies expired 2024-04-28 (3 days ago)"));
        assert!(text.contains("  Juniper (dog) turns 4 on 2024-05-10 (in 9 days)"));
        assert!(text.contains("  Juniper: next heat 2024-06-29 (in 59 days)"));
        assert!(text.contains("  2024-04-30 Order food"));
        assert!(text.contains("  1. Ada Family (deposit paid)"));
        assert!(!text.contains("WARNING"));
    }

    #[tokio::test]
    async fn test_empty_kennel_renders_empty_sections() {
        let (_store, kennel) = fixtures::memory_kennel().await;
        let digest = Digest::collect(&kennel, Utc::now());
        assert_eq!(digest.item_count(), 0);
        assert!(digest.to_string().contains("Waitlist queue (0)"));
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(in_days(0), "today");
        assert_eq!(in_days(1), "tomorrow");
        assert_eq!(in_days(5), "in 5 days");
        assert_eq!(in_days(-3), "3 days ago");
    }
}
