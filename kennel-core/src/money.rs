//! Monetary amounts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// A monetary amount as stored in the remote store.
///
/// Rows written by older clients sometimes carry amounts as strings or leave
/// them empty. Decoding never fails: anything that is not a finite number
/// (or a string holding one) reads as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    pub const ZERO: Amount = Amount(0.0);

    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Amount(value)
        } else {
            Amount::ZERO
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Lenient conversion from an arbitrary JSON value.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(Amount::new).unwrap_or_default(),
            serde_json::Value::String(s) => s
                .trim()
                .trim_start_matches('$')
                .replace(',', "")
                .parse::<f64>()
                .map(Amount::new)
                .unwrap_or_default(),
            _ => Amount::ZERO,
        }
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::new(value)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(Amount::from_json(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_decoding() {
        assert_eq!(Amount::from_json(&json!(1250.5)).value(), 1250.5);
        assert_eq!(Amount::from_json(&json!("300")).value(), 300.0);
        assert_eq!(Amount::from_json(&json!("$1,500.00")).value(), 1500.0);
        assert_eq!(Amount::from_json(&json!("n/a")), Amount::ZERO);
        assert_eq!(Amount::from_json(&json!(null)), Amount::ZERO);
        assert_eq!(Amount::from_json(&json!({"v": 1})), Amount::ZERO);
    }

    #[test]
    fn test_non_finite_is_zero() {
        assert_eq!(Amount::new(f64::NAN), Amount::ZERO);
        assert_eq!(Amount::new(f64::INFINITY), Amount::ZERO);
    }

    #[test]
    fn test_sum() {
        let amounts = [Amount::new(10.0), Amount::new(2.5), Amount::ZERO];
        let total: Amount = amounts.iter().sum();
        assert_eq!(total.value(), 12.5);
    }
}
