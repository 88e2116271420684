use super::today;
use crate::Repository;
use chrono::NaiveDate;
use kennel_core::{DogId, Litter, LitterStatus};

impl Repository<Litter> {
    /// Litters where the dog is the mother or the father.
    pub fn get_by_dog(&self, dog_id: &DogId) -> Vec<Litter> {
        self.filter(|l| {
            l.mother_id.as_ref() == Some(dog_id) || l.father_id.as_ref() == Some(dog_id)
        })
    }

    pub fn get_public(&self) -> Vec<Litter> {
        self.filter(|l| l.is_public)
    }

    pub fn get_by_status(&self, status: LitterStatus) -> Vec<Litter> {
        self.filter(|l| l.status == status)
    }

    /// Litters not yet born whose expected date is today or later.
    pub fn get_upcoming(&self) -> Vec<Litter> {
        self.get_upcoming_on(today())
    }

    pub fn get_upcoming_on(&self, today: NaiveDate) -> Vec<Litter> {
        self.filter(|l| {
            l.birth_date.is_none() && l.expected_date.is_some_and(|expected| expected >= today)
        })
    }
}
