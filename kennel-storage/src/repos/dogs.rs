use super::{text_matches, today};
use crate::Repository;
use chrono::{NaiveDate, Utc};
use kennel_core::derived::{self, BirthdayAlert, HeatPrediction, DEFAULT_HEAT_CYCLE_DAYS};
use kennel_core::{Dog, DogLocation, Gender, Timestamp};

impl Repository<Dog> {
    pub fn get_by_gender(&self, gender: Gender) -> Vec<Dog> {
        self.filter(|d| d.gender == Some(gender))
    }

    pub fn get_breeding(&self) -> Vec<Dog> {
        self.filter(|d| d.is_breeding)
    }

    pub fn get_public(&self) -> Vec<Dog> {
        self.filter(|d| d.is_public)
    }

    pub fn get_by_location(&self, location: DogLocation) -> Vec<Dog> {
        self.filter(|d| d.location == location)
    }

    pub fn get_guardian_dogs(&self) -> Vec<Dog> {
        self.get_by_location(DogLocation::Guardian)
    }

    /// Search name, breed, color, registration and microchip numbers.
    pub fn search(&self, query: &str) -> Vec<Dog> {
        self.filter(|d| {
            text_matches(
                query,
                [
                    Some(d.name.as_str()),
                    Some(d.breed.as_str()),
                    Some(d.color.as_str()),
                    d.registration_number.as_deref(),
                    d.microchip_number.as_deref(),
                ],
            )
        })
    }

    // ========================================================================
    // HEAT CYCLES
    // ========================================================================

    /// Next heat date; `cycle_length_days` falls back to 180.
    pub fn calculate_next_heat(
        &self,
        last_heat: NaiveDate,
        cycle_length_days: Option<u32>,
    ) -> NaiveDate {
        derived::calculate_next_heat(
            last_heat,
            cycle_length_days.unwrap_or(DEFAULT_HEAT_CYCLE_DAYS),
        )
    }

    /// Days until `next_heat`, rounded up; negative once passed.
    pub fn get_days_until_heat(&self, next_heat: NaiveDate) -> i64 {
        derived::days_until_heat(next_heat, Utc::now())
    }

    /// Heat predictions for breeding females, soonest first.
    pub fn get_heat_predictions(&self, default_cycle_days: u32) -> Vec<HeatPrediction> {
        self.get_heat_predictions_at(default_cycle_days, Utc::now())
    }

    pub fn get_heat_predictions_at(
        &self,
        default_cycle_days: u32,
        now: Timestamp,
    ) -> Vec<HeatPrediction> {
        self.cache()
            .read(|s| derived::heat_predictions(&s.dogs, default_cycle_days, now))
    }

    // ========================================================================
    // BIRTHDAYS
    // ========================================================================

    /// Dog and puppy birthdays within `days` from today.
    pub fn get_upcoming_birthdays(&self, days: i64) -> Vec<BirthdayAlert> {
        self.get_upcoming_birthdays_on(days, today())
    }

    pub fn get_upcoming_birthdays_on(&self, days: i64, today: NaiveDate) -> Vec<BirthdayAlert> {
        self.cache()
            .read(|s| derived::upcoming_birthdays(&s.dogs, &s.puppies, today, days))
    }
}
