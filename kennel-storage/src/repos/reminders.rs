use super::today;
use crate::Repository;
use chrono::{Duration, NaiveDate, Utc};
use kennel_core::{KennelResult, LinkedEntityType, Reminder, ReminderId};

impl Repository<Reminder> {
    /// Open reminders dated from today through `days` ahead, by date.
    pub fn get_upcoming(&self, days: i64) -> Vec<Reminder> {
        self.get_upcoming_on(days, today())
    }

    pub fn get_upcoming_on(&self, days: i64, today: NaiveDate) -> Vec<Reminder> {
        let horizon = today + Duration::days(days);
        self.filter(|r| {
            !r.completed && r.date.is_some_and(|date| date >= today && date <= horizon)
        })
    }

    /// Open reminders dated before today.
    pub fn get_overdue(&self) -> Vec<Reminder> {
        self.get_overdue_on(today())
    }

    pub fn get_overdue_on(&self, today: NaiveDate) -> Vec<Reminder> {
        self.filter(|r| !r.completed && r.date.is_some_and(|date| date < today))
    }

    pub fn get_by_entity(&self, entity_type: LinkedEntityType, entity_id: &str) -> Vec<Reminder> {
        self.filter(|r| {
            r.entity_type == Some(entity_type) && r.entity_id.as_deref() == Some(entity_id)
        })
    }

    pub async fn complete(&self, id: &ReminderId) -> KennelResult<Reminder> {
        let mut reminder = self.fetch(id).await?;
        reminder.completed = true;
        reminder.completed_at = Some(Utc::now());
        self.save(&reminder).await
    }
}
