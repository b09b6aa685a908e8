/// The three-letter ISO 4217 currency code (e.g., "USD", "EUR") of a payment amount.
#[allow(clippy::upper_case_acronyms)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::VariantNames,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    AED,
    ARS,
    AUD,
    BHD,
    BRL,
    CAD,
    CHF,
    CLF,
    CLP,
    CNY,
    COP,
    CZK,
    DKK,
    EUR,
    GBP,
    HKD,
    HUF,
    IDR,
    ILS,
    INR,
    JOD,
    JPY,
    KRW,
    KWD,
    MXN,
    MYR,
    NOK,
    NZD,
    OMR,
    PEN,
    PHP,
    PLN,
    SEK,
    SGD,
    THB,
    TND,
    TRY,
    #[default]
    USD,
    VND,
    XAF,
    XOF,
    ZAR,
}

impl Currency {
    pub fn is_zero_decimal_currency(self) -> bool {
        matches!(
            self,
            Self::CLP | Self::JPY | Self::KRW | Self::VND | Self::XAF | Self::XOF
        )
    }

    pub fn is_three_decimal_currency(self) -> bool {
        matches!(
            self,
            Self::BHD | Self::JOD | Self::KWD | Self::OMR | Self::TND
        )
    }

    pub fn is_four_decimal_currency(self) -> bool {
        matches!(self, Self::CLF)
    }

    pub fn number_of_digits_after_decimal_point(self) -> u8 {
        if self.is_zero_decimal_currency() {
            0
        } else if self.is_three_decimal_currency() {
            3
        } else if self.is_four_decimal_currency() {
            4
        } else {
            2
        }
    }
}

/// Indicates the card network.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::VariantNames,
    strum::EnumIter,
    strum::EnumString,
)]
pub enum CardNetwork {
    #[serde(alias = "VISA")]
    Visa,
    #[serde(alias = "MASTERCARD")]
    Mastercard,
    #[serde(alias = "AMERICANEXPRESS")]
    #[serde(alias = "AMEX")]
    AmericanExpress,
    JCB,
    #[serde(alias = "DINERSCLUB")]
    DinersClub,
    #[serde(alias = "DISCOVER")]
    Discover,
    #[serde(alias = "UNIONPAY")]
    UnionPay,
    #[serde(alias = "MAESTRO")]
    Maestro,
}

/// Who started a transaction that reuses stored card credentials.
///
/// `Customer` is a customer-initiated transaction (CIT), `Merchant` a
/// merchant-initiated transaction (MIT).
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentInitiator {
    Customer,
    Merchant,
}

/// Why stored credentials are being used.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StoredCredentialReason {
    Recurring,
    Installment,
    Unscheduled,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_currency_exponents() {
        assert_eq!(Currency::USD.number_of_digits_after_decimal_point(), 2);
        assert_eq!(Currency::JPY.number_of_digits_after_decimal_point(), 0);
        assert_eq!(Currency::KWD.number_of_digits_after_decimal_point(), 3);
        assert_eq!(Currency::CLF.number_of_digits_after_decimal_point(), 4);
    }

    #[test]
    fn test_currency_round_trips_through_strum_and_serde() {
        assert_eq!(Currency::from_str("BRL").ok(), Some(Currency::BRL));
        assert_eq!(Currency::EUR.to_string(), "EUR");
        assert_eq!(
            serde_json::to_string(&Currency::GBP).ok().as_deref(),
            Some("\"GBP\"")
        );
    }

    #[test]
    fn test_card_network_aliases() {
        let network: CardNetwork =
            serde_json::from_str("\"AMEX\"").expect("amex alias should deserialize");
        assert_eq!(network, CardNetwork::AmericanExpress);
    }
}
