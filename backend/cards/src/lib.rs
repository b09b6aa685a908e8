mod brand;
mod validate;

use common_utils::{date_time, errors};
use error_stack::report;
use hyperswitch_masking::{PeekInterface, Secret, StrongSecret};
use serde::{Deserialize, Deserializer, Serialize};

pub use crate::{
    brand::get_card_network,
    validate::{CCValError, CardNumber, CardNumberStrategy},
};

#[derive(Clone, Debug, Serialize)]
pub struct CardSecurityCode(StrongSecret<String>);

impl CardSecurityCode {
    pub fn new(secret: String) -> errors::CustomResult<Self, errors::ValidationError> {
        if (3..=4).contains(&secret.len()) && secret.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(StrongSecret::new(secret)))
        } else {
            Err(report!(errors::ValidationError::InvalidValue {
                message: "invalid card security code".to_string()
            }))
        }
    }

    pub fn as_secret(&self) -> Secret<String> {
        Secret::new(self.0.peek().clone())
    }
}

impl PeekInterface<String> for CardSecurityCode {
    fn peek(&self) -> &String {
        self.0.peek()
    }
}

impl<'de> Deserialize<'de> for CardSecurityCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let csc = String::deserialize(deserializer)?;
        Self::new(csc).map_err(|err| serde::de::Error::custom(err.current_context().to_string()))
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CardExpirationMonth(StrongSecret<u8>);

impl CardExpirationMonth {
    pub fn new(month: u8) -> errors::CustomResult<Self, errors::ValidationError> {
        if (1..=12).contains(&month) {
            Ok(Self(StrongSecret::new(month)))
        } else {
            Err(report!(errors::ValidationError::InvalidValue {
                message: "invalid card expiration month".to_string()
            }))
        }
    }

    pub fn two_digits(&self) -> String {
        format!("{:02}", self.0.peek())
    }
}

impl PeekInterface<u8> for CardExpirationMonth {
    fn peek(&self) -> &u8 {
        self.0.peek()
    }
}

impl<'de> Deserialize<'de> for CardExpirationMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let month = u8::deserialize(deserializer)?;
        Self::new(month).map_err(|err| serde::de::Error::custom(err.current_context().to_string()))
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CardExpirationYear(StrongSecret<u16>);

impl CardExpirationYear {
    /// Accepts four-digit years and two-digit years (taken as 20xx).
    pub fn new(year: u16) -> errors::CustomResult<Self, errors::ValidationError> {
        let year = if year < 100 { year + 2000 } else { year };
        if (1997..=9999).contains(&year) {
            Ok(Self(StrongSecret::new(year)))
        } else {
            Err(report!(errors::ValidationError::InvalidValue {
                message: "invalid card expiration year".to_string()
            }))
        }
    }

    pub fn four_digits(&self) -> String {
        self.0.peek().to_string()
    }

    pub fn two_digits(&self) -> String {
        format!("{:02}", self.0.peek() % 100)
    }
}

impl PeekInterface<u16> for CardExpirationYear {
    fn peek(&self) -> &u16 {
        self.0.peek()
    }
}

impl<'de> Deserialize<'de> for CardExpirationYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let year = u16::deserialize(deserializer)?;
        Self::new(year).map_err(|err| serde::de::Error::custom(err.current_context().to_string()))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardExpiration {
    pub month: CardExpirationMonth,
    pub year: CardExpirationYear,
}

impl CardExpiration {
    pub fn new(month: u8, year: u16) -> errors::CustomResult<Self, errors::ValidationError> {
        Ok(Self {
            month: CardExpirationMonth::new(month)?,
            year: CardExpirationYear::new(year)?,
        })
    }

    /// A card stays valid through the last day of its expiration month.
    pub fn is_expired(&self) -> bool {
        let now = date_time::now();
        let (year, month) = (i32::from(*self.year.peek()), *self.month.peek());
        let current_month = u8::from(now.month());
        year < now.year() || (year == now.year() && month < current_month)
    }

    pub fn get_month(&self) -> &CardExpirationMonth {
        &self.month
    }

    pub fn get_year(&self) -> &CardExpirationYear {
        &self.year
    }

    /// `MM<delimiter>YY`
    pub fn mm_yy(&self, delimiter: &str) -> Secret<String> {
        Secret::new(format!(
            "{}{delimiter}{}",
            self.month.two_digits(),
            self.year.two_digits()
        ))
    }

    /// `YYYY<delimiter>MM`
    pub fn yyyy_mm(&self, delimiter: &str) -> Secret<String> {
        Secret::new(format!(
            "{}{delimiter}{}",
            self.year.four_digits(),
            self.month.two_digits()
        ))
    }
}
