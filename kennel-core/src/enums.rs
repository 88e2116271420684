//! Enum types for kennel entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// DOGS
// ============================================================================

/// Sex of a dog or puppy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Where a dog lives.
///
/// Guardian dogs live with an external family and are excluded from
/// facility-side expiration alerts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DogLocation {
    #[default]
    Home,
    Guardian,
}

// ============================================================================
// LITTERS & PUPPIES
// ============================================================================

/// Lifecycle of a litter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LitterStatus {
    #[default]
    Planned,
    Expected,
    Born,
    Weaned,
    Completed,
}

/// Sale status of a puppy. Transitions are driven by purchase mutations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuppyStatus {
    #[default]
    Available,
    Reserved,
    Sold,
}

// ============================================================================
// WAITLIST
// ============================================================================

/// Status of a waitlist entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitlistStatus {
    #[default]
    Pending,
    Active,
    Fulfilled,
    Cancelled,
}

// ============================================================================
// VET RECORDS
// ============================================================================

/// Kind of veterinary record. Unrecognised kinds are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum VetRecordType {
    Rabies,
    Vaccination,
    #[default]
    Checkup,
    Surgery,
    Other(String),
}

impl VetRecordType {
    pub fn as_str(&self) -> &str {
        match self {
            VetRecordType::Rabies => "rabies",
            VetRecordType::Vaccination => "vaccination",
            VetRecordType::Checkup => "checkup",
            VetRecordType::Surgery => "surgery",
            VetRecordType::Other(kind) => kind,
        }
    }
}

impl fmt::Display for VetRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VetRecordType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "rabies" => VetRecordType::Rabies,
            "vaccination" | "vaccine" => VetRecordType::Vaccination,
            "checkup" => VetRecordType::Checkup,
            "surgery" => VetRecordType::Surgery,
            _ => VetRecordType::Other(s.to_string()),
        })
    }
}

impl Serialize for VetRecordType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VetRecordType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.parse::<VetRecordType>() {
            Ok(kind) => Ok(kind),
            Err(never) => match never {},
        }
    }
}

// ============================================================================
// REMINDERS & FILES
// ============================================================================

/// Entity kind a reminder or file is attached to. The reference is untyped:
/// the id is not checked against any collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkedEntityType {
    Dog,
    Litter,
    Puppy,
    Customer,
    Purchase,
    Waitlist,
    General,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_value(PuppyStatus::Sold).unwrap(), "sold");
        assert_eq!(
            serde_json::to_value(WaitlistStatus::Cancelled).unwrap(),
            "cancelled"
        );
        assert_eq!(serde_json::to_value(DogLocation::Guardian).unwrap(), "guardian");
        assert_eq!(
            serde_json::to_value(LinkedEntityType::Waitlist).unwrap(),
            "waitlist"
        );
    }

    #[test]
    fn test_vet_record_type_keeps_unknown_kinds() {
        let kind: VetRecordType = serde_json::from_value(serde_json::json!("Dental")).unwrap();
        assert_eq!(kind, VetRecordType::Other("Dental".to_string()));
        assert_eq!(serde_json::to_value(&kind).unwrap(), "Dental");

        let rabies: VetRecordType = serde_json::from_value(serde_json::json!("Rabies")).unwrap();
        assert_eq!(rabies, VetRecordType::Rabies);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PuppyStatus::default(), PuppyStatus::Available);
        assert_eq!(WaitlistStatus::default(), WaitlistStatus::Pending);
        assert_eq!(DogLocation::default(), DogLocation::Home);
    }
}
