//! Heat-cycle prediction.

use crate::{Dog, DogId, Timestamp};
use chrono::{Duration, NaiveDate};

/// Cycle length used when a dog has none recorded.
pub const DEFAULT_HEAT_CYCLE_DAYS: u32 = 180;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Predicted next heat for one breeding female.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatPrediction {
    pub dog_id: Option<DogId>,
    pub dog_name: String,
    pub last_heat_date: NaiveDate,
    pub cycle_length_days: u32,
    pub next_heat_date: NaiveDate,
    pub days_until: i64,
}

/// `last_heat + cycle_length_days`.
pub fn calculate_next_heat(last_heat: NaiveDate, cycle_length_days: u32) -> NaiveDate {
    last_heat + Duration::days(i64::from(cycle_length_days))
}

/// Days from `now` until the start of `next_heat` (UTC midnight), rounded up.
/// Negative once the date has passed.
pub fn days_until_heat(next_heat: NaiveDate, now: Timestamp) -> i64 {
    let target = next_heat.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
    match target {
        Some(target) => {
            let millis = (target - now).num_milliseconds() as f64;
            (millis / MILLIS_PER_DAY).ceil() as i64
        }
        None => 0,
    }
}

/// Predictions for breeding females with a recorded last heat, soonest first.
/// Dogs without their own cycle length use `default_cycle_days`.
pub fn heat_predictions<'a, I>(
    dogs: I,
    default_cycle_days: u32,
    now: Timestamp,
) -> Vec<HeatPrediction>
where
    I: IntoIterator<Item = &'a Dog>,
{
    let mut predictions: Vec<HeatPrediction> = dogs
        .into_iter()
        .filter(|dog| dog.is_breeding && dog.is_female())
        .filter_map(|dog| {
            let last_heat_date = dog.last_heat_date?;
            let cycle_length_days = dog
                .heat_cycle_length
                .filter(|days| *days > 0)
                .unwrap_or(default_cycle_days);
            let next_heat_date = calculate_next_heat(last_heat_date, cycle_length_days);
            Some(HeatPrediction {
                dog_id: dog.id.clone(),
                dog_name: dog.name.clone(),
                last_heat_date,
                cycle_length_days,
                next_heat_date,
                days_until: days_until_heat(next_heat_date, now),
            })
        })
        .collect();

    predictions.sort_by_key(|p| p.days_until);
    predictions
}
