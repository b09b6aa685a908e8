//! Card brand detection from the issuer identification number.

use std::sync::LazyLock;

use common_enums::CardNetwork;
use regex::Regex;

// Order matters: Maestro and Discover ranges overlap with broader patterns.
static CARD_REGEX: LazyLock<Vec<(CardNetwork, Result<Regex, regex::Error>)>> =
    LazyLock::new(|| {
        vec![
            (
                CardNetwork::Maestro,
                Regex::new(r"^(5018|5020|5038|5893|6304|6759|6761|6762|6763)[0-9]{8,15}$"),
            ),
            (
                CardNetwork::Mastercard,
                Regex::new(r"^(5[1-5][0-9]{14}|2(22[1-9]|2[3-9][0-9]|[3-6][0-9]{2}|7[01][0-9]|720)[0-9]{12})$"),
            ),
            (CardNetwork::AmericanExpress, Regex::new(r"^3[47][0-9]{13}$")),
            (CardNetwork::Visa, Regex::new(r"^4[0-9]{12}(?:[0-9]{3}){0,2}$")),
            (
                CardNetwork::Discover,
                Regex::new(r"^(6011[0-9]{12}|64[4-9][0-9]{13}|65[0-9]{14})$"),
            ),
            (
                CardNetwork::DinersClub,
                Regex::new(r"^3(?:0[0-5]|[689][0-9])[0-9]{11,16}$"),
            ),
            (
                CardNetwork::JCB,
                Regex::new(r"^35(2[89]|[3-8][0-9])[0-9]{12,15}$"),
            ),
            (CardNetwork::UnionPay, Regex::new(r"^62[0-9]{14,17}$")),
        ]
    });

/// Detects the card network of an unformatted card number.
pub fn get_card_network(card_number: &str) -> Option<CardNetwork> {
    CARD_REGEX.iter().find_map(|(network, regex)| match regex {
        Ok(regex) if regex.is_match(card_number) => Some(*network),
        Ok(_) => None,
        Err(error) => {
            tracing::error!(?network, %error, "invalid card brand pattern");
            None
        }
    })
}
