use super::today;
use crate::Repository;
use chrono::NaiveDate;
use kennel_core::derived::{expiring_records, ExpirationAlert, ExpirationKind};
use kennel_core::{DogId, VetRecord, VetRecordType};

impl Repository<VetRecord> {
    pub fn get_by_dog(&self, dog_id: &DogId) -> Vec<VetRecord> {
        self.filter(|r| r.dog_id.as_ref() == Some(dog_id))
    }

    pub fn get_by_type(&self, record_type: &VetRecordType) -> Vec<VetRecord> {
        self.filter(|r| &r.record_type == record_type)
    }

    /// The dog's record of this type with the latest visit date.
    pub fn get_latest_by_type(
        &self,
        dog_id: &DogId,
        record_type: &VetRecordType,
    ) -> Option<VetRecord> {
        self.filter(|r| r.dog_id.as_ref() == Some(dog_id) && &r.record_type == record_type)
            .into_iter()
            .max_by_key(|r| r.visit_date)
    }

    /// Rabies alerts for home dogs within `days`, plus dogs with no rabies
    /// record at all (listed last).
    pub fn get_expiring_rabies(&self, days: i64) -> Vec<ExpirationAlert> {
        self.get_expiring_on(ExpirationKind::Rabies, days, today())
    }

    /// Alerts for any expiring record of home dogs within `days`.
    pub fn get_expiring_vaccinations(&self, days: i64) -> Vec<ExpirationAlert> {
        self.get_expiring_on(ExpirationKind::Vaccination, days, today())
    }

    pub fn get_expiring_on(
        &self,
        kind: ExpirationKind,
        days: i64,
        today: NaiveDate,
    ) -> Vec<ExpirationAlert> {
        self.cache()
            .read(|s| expiring_records(&s.dogs, &s.vet_records, kind, days, today))
    }
}
