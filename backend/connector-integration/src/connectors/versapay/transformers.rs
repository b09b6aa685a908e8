use common_enums::{Currency, PaymentInitiator};
use domain_types::{
    connector_types::{PaymentsRequestData, StoredCredential},
    errors::ConnectorError,
    payment_method_data::Card,
};
use hyperswitch_masking::Secret;
use serde::Serialize;

use crate::authorization;

/// `token|transaction_id`
pub const AUTHORIZATION_ARITY: usize = 2;

#[derive(Debug, Serialize)]
pub struct VersapayCard {
    name: Option<Secret<String>>,
    card_number: cards::CardNumber,
    expiry_month: Secret<String>,
    expiry_year: Secret<String>,
    cvv: Secret<String>,
}

impl From<&Card> for VersapayCard {
    fn from(card: &Card) -> Self {
        Self {
            name: card.card_holder_name.clone(),
            card_number: card.card_number.clone(),
            expiry_month: card.get_expiry_month_2_digit(),
            expiry_year: card.get_expiry_year_4_digit(),
            cvv: card.card_cvc.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VersapayStoredCredential {
    initiated_by: &'static str,
    first_transaction: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    network_transaction_id: Option<String>,
}

impl From<&StoredCredential> for VersapayStoredCredential {
    fn from(stored_credential: &StoredCredential) -> Self {
        Self {
            initiated_by: match stored_credential.initiator {
                PaymentInitiator::Customer => "cardholder",
                PaymentInitiator::Merchant => "merchant",
            },
            first_transaction: stored_credential.is_initial(),
            network_transaction_id: stored_credential.network_transaction_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VersapayOrderRequest {
    amount_cents: i64,
    currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip_address: Option<String>,
    credit_card: VersapayCard,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored_credential: Option<VersapayStoredCredential>,
}

impl VersapayOrderRequest {
    pub fn try_new(req: &PaymentsRequestData) -> Result<Self, error_stack::Report<ConnectorError>> {
        Ok(Self {
            amount_cents: req.amount.get_amount_as_i64(),
            currency: req.currency,
            order_number: req.options.order_id.clone(),
            email: req.options.email.clone(),
            ip_address: req.options.ip_address.clone(),
            credit_card: VersapayCard::from(req.get_card()?),
            stored_credential: req
                .get_stored_credential()
                .map(VersapayStoredCredential::from),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct VersapayWalletRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    credit_card: VersapayCard,
}

impl VersapayWalletRequest {
    pub fn try_new(req: &PaymentsRequestData) -> Result<Self, error_stack::Report<ConnectorError>> {
        Ok(Self {
            email: req.options.email.clone(),
            credit_card: VersapayCard::from(req.get_card()?),
        })
    }
}

/// Body of capture, refund and void requests.
#[derive(Debug, Serialize)]
pub struct VersapayTransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    amount_cents: Option<i64>,
}

impl From<&PaymentsRequestData> for VersapayTransactionRequest {
    fn from(req: &PaymentsRequestData) -> Self {
        Self {
            amount_cents: (!req.amount.is_zero()).then(|| req.amount.get_amount_as_i64()),
        }
    }
}

/// The transaction id from a `token|transaction_id` token.
pub fn transaction_id(token: &str) -> Result<String, error_stack::Report<ConnectorError>> {
    let mut fields = authorization::decode_exact(token, AUTHORIZATION_ARITY)?;
    let transaction_id = fields.swap_remove(1);
    if transaction_id.is_empty() {
        Err(ConnectorError::InvalidAuthorizationField {
            field_name: "transaction_id",
        })?
    } else {
        Ok(transaction_id)
    }
}
