use common_enums::CardNetwork;
use hyperswitch_masking::{ExposeInterface, PeekInterface, Secret};
use serde::{Deserialize, Serialize};

use crate::errors::ConnectorError;

#[derive(Eq, PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    pub card_number: cards::CardNumber,
    pub card_exp_month: Secret<String>,
    pub card_exp_year: Secret<String>,
    pub card_cvc: Secret<String>,
    pub card_holder_name: Option<Secret<String>>,
    /// Overrides the network detected from the card number
    pub card_network: Option<CardNetwork>,
}

impl Card {
    pub fn get_card_network(&self) -> Option<CardNetwork> {
        self.card_network
            .or_else(|| self.card_number.get_card_network())
    }

    pub fn get_last4(&self) -> String {
        self.card_number.get_last4()
    }

    pub fn get_card_expiry_year_2_digit(&self) -> Result<Secret<String>, ConnectorError> {
        let year = self.card_exp_year.peek();
        Ok(Secret::new(
            year.get(year.len().saturating_sub(2)..)
                .ok_or(ConnectorError::RequestEncodingFailed)?
                .to_string(),
        ))
    }

    pub fn get_expiry_year_4_digit(&self) -> Secret<String> {
        let mut year = self.card_exp_year.peek().clone();
        if year.len() == 2 {
            year = format!("20{year}");
        }
        Secret::new(year)
    }

    pub fn get_expiry_month_2_digit(&self) -> Secret<String> {
        Secret::new(format!("{:0>2}", self.card_exp_month.peek()))
    }

    pub fn get_expiry_date_as_mmyyyy(&self, delimiter: &str) -> Secret<String> {
        let year = self.get_expiry_year_4_digit();
        Secret::new(format!(
            "{}{}{}",
            self.get_expiry_month_2_digit().peek(),
            delimiter,
            year.peek()
        ))
    }

    pub fn get_expiry_date_as_mmyy(&self) -> Result<Secret<String>, ConnectorError> {
        let year = self.get_card_expiry_year_2_digit()?.expose();
        let month = self.get_expiry_month_2_digit().expose();
        Ok(Secret::new(format!("{month}{year}")))
    }

}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::str::FromStr;

    use super::*;

    fn card(year: &str) -> Card {
        Card {
            card_number: cards::CardNumber::from_str("4242424242424242").unwrap(),
            card_exp_month: Secret::new("3".to_string()),
            card_exp_year: Secret::new(year.to_string()),
            card_cvc: Secret::new("123".to_string()),
            card_holder_name: None,
            card_network: None,
        }
    }

    #[test]
    fn test_expiry_formats() {
        let card = card("2030");
        assert_eq!(card.get_expiry_date_as_mmyyyy("/").expose(), "03/2030");
        assert_eq!(card.get_expiry_date_as_mmyy().unwrap().expose(), "0330");
        assert_eq!(self::card("30").get_expiry_year_4_digit().expose(), "2030");
    }

    #[test]
    fn test_network_detection_and_override() {
        let mut card = card("2030");
        assert_eq!(card.get_card_network(), Some(CardNetwork::Visa));
        assert_eq!(card.get_last4(), "4242");
        card.card_network = Some(CardNetwork::Mastercard);
        assert_eq!(card.get_card_network(), Some(CardNetwork::Mastercard));
    }
}
