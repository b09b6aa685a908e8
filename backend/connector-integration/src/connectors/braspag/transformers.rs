use common_enums::{CardNetwork, Currency};
use domain_types::{
    connector_types::PaymentsRequestData, errors::ConnectorError, payment_method_data::Card,
};
use hyperswitch_masking::{PeekInterface, Secret};
use serde::Serialize;

use crate::authorization;

/// `merchant_order_id|payment_id`; the order id may be empty.
pub const AUTHORIZATION_ARITY: usize = 2;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BraspagPaymentsRequest {
    merchant_order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer: Option<BraspagCustomer>,
    payment: BraspagPayment,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BraspagCustomer {
    name: Secret<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BraspagPayment {
    #[serde(rename = "Type")]
    payment_type: &'static str,
    amount: i64,
    currency: Currency,
    installments: u8,
    capture: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    soft_descriptor: Option<String>,
    credit_card: BraspagCard,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BraspagCard {
    card_number: cards::CardNumber,
    holder: Secret<String>,
    expiration_date: Secret<String>,
    security_code: Secret<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<&'static str>,
}

fn brand(network: CardNetwork) -> &'static str {
    match network {
        CardNetwork::Visa => "Visa",
        CardNetwork::Mastercard | CardNetwork::Maestro => "Master",
        CardNetwork::AmericanExpress => "Amex",
        CardNetwork::DinersClub => "Diners",
        CardNetwork::Discover => "Discover",
        CardNetwork::JCB => "JCB",
        CardNetwork::UnionPay => "UnionPay",
    }
}

impl From<&Card> for BraspagCard {
    fn from(card: &Card) -> Self {
        Self {
            card_number: card.card_number.clone(),
            holder: card.card_holder_name.clone().unwrap_or_default(),
            expiration_date: card.get_expiry_date_as_mmyyyy("/"),
            security_code: card.card_cvc.clone(),
            brand: card.get_card_network().map(brand),
        }
    }
}

impl BraspagPaymentsRequest {
    pub fn try_new(
        req: &PaymentsRequestData,
        capture: bool,
    ) -> Result<Self, error_stack::Report<ConnectorError>> {
        let card = req.get_card()?;
        Ok(Self {
            merchant_order_id: req.options.order_id.clone().unwrap_or_default(),
            customer: card
                .card_holder_name
                .as_ref()
                .filter(|name| !name.peek().is_empty())
                .map(|name| BraspagCustomer {
                    name: name.clone(),
                    email: req.options.email.clone(),
                }),
            payment: BraspagPayment {
                payment_type: "CreditCard",
                amount: req.amount.get_amount_as_i64(),
                currency: req.currency,
                installments: 1,
                capture,
                soft_descriptor: req.options.description.clone(),
                credit_card: BraspagCard::from(card),
            },
        })
    }
}

/// The payment id from a `merchant_order_id|payment_id` token.
pub fn payment_id(token: &str) -> Result<String, error_stack::Report<ConnectorError>> {
    let mut fields = authorization::decode_exact(token, AUTHORIZATION_ARITY)?;
    let payment_id = fields.swap_remove(1);
    if payment_id.is_empty() {
        Err(ConnectorError::InvalidAuthorizationField {
            field_name: "payment_id",
        })?
    } else {
        Ok(payment_id)
    }
}
