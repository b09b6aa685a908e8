//! Amount types.

use common_enums::Currency;
use serde::{Deserialize, Serialize};

/// An amount in the currency's smallest unit (cents for USD, yen for JPY).
#[derive(Default, Debug, Deserialize, Serialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MinorUnit(i64);

impl MinorUnit {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn get_amount_as_i64(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Major-unit decimal string, e.g. `1050` USD → `"10.50"`, `1050` JPY → `"1050"`.
    pub fn to_major_unit_as_string(self, currency: Currency) -> String {
        let digits = u32::from(currency.number_of_digits_after_decimal_point());
        if digits == 0 {
            return self.0.to_string();
        }
        let divisor = 10_i64.pow(digits);
        let sign = if self.0 < 0 { "-" } else { "" };
        let absolute = self.0.unsigned_abs();
        let divisor = divisor.unsigned_abs();
        format!(
            "{sign}{}.{:0width$}",
            absolute / divisor,
            absolute % divisor,
            width = digits as usize
        )
    }
}

impl std::fmt::Display for MinorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MinorUnit {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_unit_conversion_by_exponent() {
        assert_eq!(MinorUnit::new(1050).to_major_unit_as_string(Currency::USD), "10.50");
        assert_eq!(MinorUnit::new(5).to_major_unit_as_string(Currency::EUR), "0.05");
        assert_eq!(MinorUnit::new(1050).to_major_unit_as_string(Currency::JPY), "1050");
        assert_eq!(MinorUnit::new(1234).to_major_unit_as_string(Currency::KWD), "1.234");
        assert_eq!(MinorUnit::new(-250).to_major_unit_as_string(Currency::USD), "-2.50");
        assert_eq!(MinorUnit::zero().to_major_unit_as_string(Currency::USD), "0.00");
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&MinorUnit::new(100)).unwrap_or_default();
        assert_eq!(json, "100");
    }
}
